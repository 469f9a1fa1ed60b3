//! Serial RAM access and allocation for extended pixel storage.
//!
//! An off-chip serial RAM part extends the pixel store past working memory.
//! The part is byte addressed and reached only through streamed reads and
//! writes, never through a mapped pointer, so everything here trades in
//! granted byte offsets:
//!
//! - [`SramBus`] is the byte-stream contract a device adapter implements.
//! - [`SramAlloc`] hands out non-overlapping ranges of the arena, bump-style.
//! - [`SramAddr`] is the offset handle a grant produces.
//! - [`Spi23k256`] adapts 23K256-class parts over SPI.
//! - [`SramImage`] is an in-memory image for tests and chip-less setups.
//!
//! Grant all storage during single-threaded startup, then only read and
//! write through the granted offsets at runtime. The allocator never
//! reclaims, so there is no teardown to get wrong.

use embedded_hal::spi::{Operation, SpiDevice};

/// Capacity in bytes of the 23K256-class arena.
pub const SRAM_CAPACITY: usize = 32767;

/// Offset handle for a granted range of the serial RAM arena.
///
/// Offset zero is reserved as the "no allocation" sentinel and is never
/// granted, so a held `SramAddr` always points at live storage. Handles come
/// only from [`SramAlloc::alloc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SramAddr(u16);

impl SramAddr {
    /// Raw byte offset into the arena.
    #[must_use]
    pub const fn offset(self) -> u16 {
        self.0
    }

    /// Handle advanced by `bytes`, for addressing within a granted range.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "callers stay inside the granted range"
    )]
    pub(crate) fn byte_add(self, bytes: u16) -> Self {
        Self(self.0 + bytes)
    }
}

/// Byte-stream access to a serial RAM device.
///
/// Multi-byte operations stream sequentially from the start offset.
/// Implementations own their fault handling: a failed read must leave the
/// buffer zero filled, so storage built on top degrades to dark pixels
/// instead of erroring. Callers must stay inside ranges granted by
/// [`SramAlloc`].
pub trait SramBus {
    /// Fills `buf` from the device, starting at `addr`.
    fn read_stream(&mut self, addr: SramAddr, buf: &mut [u8]);

    /// Writes `bytes` to the device, starting at `addr`.
    fn write_stream(&mut self, addr: SramAddr, bytes: &[u8]);
}

impl<T: SramBus + ?Sized> SramBus for &mut T {
    fn read_stream(&mut self, addr: SramAddr, buf: &mut [u8]) {
        T::read_stream(self, addr, buf);
    }

    fn write_stream(&mut self, addr: SramAddr, bytes: &[u8]) {
        T::write_stream(self, addr, bytes);
    }
}

/// Bump allocator over a serial RAM arena.
///
/// The cursor starts at 1 (offset zero stays reserved as the null sentinel)
/// and only ever moves forward; grants never overlap and are never
/// reclaimed. Construct one allocator at startup, make every grant before
/// interrupt-driven code runs, and keep it out of interrupt context: the
/// cursor has no locking because initialization is single threaded.
///
/// # Example
///
/// ```
/// use strand_kit::sram::SramAlloc;
///
/// let mut alloc = SramAlloc::with_capacity(100);
/// let colors = alloc.alloc(64).unwrap();
/// assert_eq!(colors.offset(), 1);
/// // The arena cannot hold another 64 bytes; the cursor stays put.
/// assert!(alloc.alloc(64).is_none());
/// ```
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SramAlloc {
    cursor: u16,
    capacity: u16,
}

impl SramAlloc {
    /// Allocator over a full 23K256-class arena.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_capacity(SRAM_CAPACITY as u16)
    }

    /// Allocator over the first `capacity` bytes of an arena.
    #[must_use]
    pub const fn with_capacity(capacity: u16) -> Self {
        Self {
            cursor: 1,
            capacity,
        }
    }

    /// Grants `size` bytes and returns the handle, or `None` when the
    /// remaining arena cannot hold them.
    ///
    /// A refused grant leaves the cursor unchanged, so a smaller follow-up
    /// request can still succeed.
    pub fn alloc(&mut self, size: usize) -> Option<SramAddr> {
        let size = u16::try_from(size).ok()?;
        let candidate = self.cursor.checked_add(size)?;
        if candidate < self.capacity {
            let granted = self.cursor;
            self.cursor = candidate;
            Some(SramAddr(granted))
        } else {
            None
        }
    }

    /// Largest single grant that would still succeed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        usize::from(self.capacity).saturating_sub(usize::from(self.cursor).saturating_add(1))
    }
}

impl Default for SramAlloc {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory image of a serial RAM part.
///
/// Implements the same byte-stream contract as the real chip, so buffers
/// configured for extended storage run unchanged on the host or on hardware
/// with no part wired. `CAP` is the image size in bytes; pair it with
/// `SramAlloc::with_capacity(CAP as u16)` so grants stay inside the image.
pub struct SramImage<const CAP: usize> {
    bytes: [u8; CAP],
}

impl<const CAP: usize> SramImage<CAP> {
    /// Fresh image, zero filled.
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: [0; CAP] }
    }
}

impl<const CAP: usize> Default for SramImage<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> SramBus for SramImage<CAP> {
    #[expect(
        clippy::arithmetic_side_effects,
        clippy::indexing_slicing,
        reason = "the assert pins the range inside the image"
    )]
    fn read_stream(&mut self, addr: SramAddr, buf: &mut [u8]) {
        let start = usize::from(addr.offset());
        let end = start + buf.len();
        assert!(end <= CAP, "read of {start}..{end} runs past the image");
        buf.copy_from_slice(&self.bytes[start..end]);
    }

    #[expect(
        clippy::arithmetic_side_effects,
        clippy::indexing_slicing,
        reason = "the assert pins the range inside the image"
    )]
    fn write_stream(&mut self, addr: SramAddr, bytes: &[u8]) {
        let start = usize::from(addr.offset());
        let end = start + bytes.len();
        assert!(end <= CAP, "write of {start}..{end} runs past the image");
        self.bytes[start..end].copy_from_slice(bytes);
    }
}

const CMD_WRITE_MODE: u8 = 0x01;
const CMD_WRITE: u8 = 0x02;
const CMD_READ: u8 = 0x03;
/// Mode register value for sequential access (address auto-increment).
const MODE_SEQUENTIAL: u8 = 0x40;

/// Adapter for 23K256-class serial RAM parts over SPI.
///
/// Selects sequential mode at construction so a multi-byte stream runs as
/// one transaction. The first failed transfer latches the adapter into a
/// degraded state: reads zero-fill, writes are dropped, and pixel storage
/// built on top keeps running dark instead of wedging the strip mid-frame.
pub struct Spi23k256<SPI> {
    spi: SPI,
    faulted: bool,
}

impl<SPI: SpiDevice> Spi23k256<SPI> {
    /// Takes ownership of the SPI device and puts the part in sequential
    /// mode.
    pub fn new(spi: SPI) -> Self {
        let mut part = Self {
            spi,
            faulted: false,
        };
        if part.spi.write(&[CMD_WRITE_MODE, MODE_SEQUENTIAL]).is_err() {
            part.fault();
        }
        part
    }

    /// True once any transfer has failed; the part stays degraded until
    /// reconstruction.
    #[must_use]
    pub const fn is_faulted(&self) -> bool {
        self.faulted
    }

    fn fault(&mut self) {
        #[cfg(feature = "defmt")]
        if !self.faulted {
            defmt::warn!("serial RAM transfer failed; extended storage now reads as zeros");
        }
        self.faulted = true;
    }
}

/// Command header: opcode plus big-endian 16-bit address.
const fn command(opcode: u8, addr: SramAddr) -> [u8; 3] {
    let [hi, lo] = addr.offset().to_be_bytes();
    [opcode, hi, lo]
}

impl<SPI: SpiDevice> SramBus for Spi23k256<SPI> {
    fn read_stream(&mut self, addr: SramAddr, buf: &mut [u8]) {
        if self.faulted {
            buf.fill(0);
            return;
        }
        let header = command(CMD_READ, addr);
        let result = self.spi.transaction(&mut [
            Operation::Write(&header),
            Operation::Read(&mut *buf),
        ]);
        if result.is_err() {
            self.fault();
            buf.fill(0);
        }
    }

    fn write_stream(&mut self, addr: SramAddr, bytes: &[u8]) {
        if self.faulted {
            return;
        }
        let header = command(CMD_WRITE, addr);
        let result = self
            .spi
            .transaction(&mut [Operation::Write(&header), Operation::Write(bytes)]);
        if result.is_err() {
            self.fault();
        }
    }
}
