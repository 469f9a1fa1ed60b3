//! Drive WS2812-class LED strands with pixel buffers that can spill into
//! off-chip serial RAM.
//!
//! The library core is target neutral: buffers, allocation, and the wire
//! protocol's framing all build and test on the host. Board features add
//! the cycle-counted pulse line and the demo binaries for the Pico 1.
//!
//! # Glossary
//!
//! - **Frame:** one complete transmission of color values for all pixels,
//!   followed by a mandatory latch gap.
//! - **Latch gap:** the minimum low-signal hold after a frame that makes
//!   the strip apply (display) the received colors.
//! - **Dirty bitmap:** per-pixel changed-since-last-flush flags, packed
//!   8 per byte, used to skip work on pixels that did not move.
//! - **Extended memory:** off-chip byte-addressable storage reached only
//!   through stream reads and writes, for buffers too big for working
//!   memory.
//! - **Bump allocator:** hands out ranges by advancing a cursor, never
//!   reclaims.
#![no_std]

// Compile-time check: the cycle-counted line is Cortex-M only.
#[cfg(all(feature = "pico1", not(feature = "arm")))]
compile_error!("feature 'pico1' requires feature 'arm'");

pub mod color;
mod error;
pub mod pixel_buffer;
pub mod rain;
pub mod sram;
pub mod ws2812;

pub use crate::error::{Error, Result};
