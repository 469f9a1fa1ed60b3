//! Error types for strand-kit operations.

use derive_more::{Display, Error};

/// Errors that can occur in strand-kit operations.
#[derive(Debug, Display, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A frame slice's length does not match the strip length the
    /// transmitter was constructed with.
    #[display("frame holds {actual} pixels but the strip expects {expected}")]
    FrameSizeMismatch {
        /// Pixel count the transmitter was constructed with.
        expected: usize,
        /// Pixel count of the offered frame.
        actual: usize,
    },
    /// Pixel storage could not be reserved in the requested backend.
    #[display("pixel storage exhausted")]
    StorageExhausted,
}

/// Result type alias using our [`Error`] type.
pub type Result<T, E = Error> = core::result::Result<T, E>;
