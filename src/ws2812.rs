//! Bit-banged serial protocol for WS2812-class LED strips.
//!
//! One LED takes 24 bits on the wire: green, then red, then blue, each byte
//! most significant bit first. A bit is a two-phase square pulse whose
//! high-phase width says whether it is a 0 or a 1. Phase widths must land
//! within about ±150 ns of the chipset's nominal values or the strip
//! misreads the stream, so a frame (every pixel, back to back) runs inside
//! a critical section with interrupts masked and never resumes part way.
//!
//! [`Ws2812`] owns the framing (bit, byte, and channel order) and drives
//! any [`PulseLine`]: cycle-counted GPIO on hardware (`rp::CycleCountedLine`)
//! or the recording [`TraceLine`] for tests and simulation.

use heapless::Vec;

use crate::color::Color;
use crate::error::{Error, Result};

#[cfg(feature = "pico1")]
pub mod rp;

/// Pulse-phase widths for one LED chipset, in nanoseconds.
///
/// These are protocol parameters of the strip's driver chip, not of this
/// crate; take them from the chipset datasheet. Tolerance on each phase is
/// about ±150 ns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StripTimings {
    /// High phase of a 0 bit.
    pub t0h_ns: u32,
    /// Low phase of a 0 bit.
    pub t0l_ns: u32,
    /// High phase of a 1 bit.
    pub t1h_ns: u32,
    /// Low phase of a 1 bit.
    pub t1l_ns: u32,
    /// Post-frame low hold that latches the frame onto the strip.
    pub reset_ns: u32,
}

impl StripTimings {
    /// WS2812B values, conservative against the data sheet.
    pub const WS2812B: Self = Self {
        t0h_ns: 400,
        t0l_ns: 900,
        t1h_ns: 900,
        t1l_ns: 600,
        reset_ns: 6_000,
    };

    /// WS2812B pulses with the long latch hold some strip revisions need.
    pub const WS2812B_LONG_RESET: Self = Self {
        t0h_ns: 400,
        t0l_ns: 900,
        t1h_ns: 900,
        t1l_ns: 600,
        reset_ns: 600_000,
    };

    /// These pulses with a different latch hold.
    #[must_use]
    pub const fn with_reset_ns(mut self, reset_ns: u32) -> Self {
        self.reset_ns = reset_ns;
        self
    }
}

/// A line that can emit precisely timed two-phase pulses.
///
/// [`plan`](Self::plan) converts phase widths into whatever form makes
/// [`pulse`](Self::pulse) cheap to replay (cycle counts, on hardware), so
/// the per-bit path does no arithmetic. Implementations must hold each
/// phase within the chipset tolerance; callers keep interrupts masked
/// around whole frames.
pub trait PulseLine {
    /// Precompiled pulse, cheap to copy and replay.
    type Plan: Copy;

    /// Compiles a high/low phase pair into a replayable plan.
    fn plan(&self, high_ns: u32, low_ns: u32) -> Self::Plan;

    /// Drives the line high then low for the planned widths.
    fn pulse(&mut self, plan: Self::Plan);

    /// Holds the line low for at least `ns`.
    fn rest(&mut self, ns: u32);
}

/// Bit-banged transmitter for one WS2812-class strip.
///
/// Owns its data line exclusively; nothing else may drive the pin. The
/// constructor latches an all-black frame, so a freshly built transmitter
/// has already put the strip in a known dark state.
///
/// [`show_color`](Self::show_color) and [`send_frame`](Self::send_frame)
/// manage the non-preemptible frame region themselves. A caller driving
/// [`send_pixel`](Self::send_pixel) directly must wrap its whole pixel
/// sequence in `critical_section::with` and finish with
/// [`show`](Self::show); a frame, once started, runs to completion.
///
/// # Example
///
/// ```
/// # use critical_section as _; // host implementation for the frame region
/// use strand_kit::ws2812::{StripTimings, TraceLine, Ws2812};
///
/// let mut strip = Ws2812::new(TraceLine::new(), &StripTimings::WS2812B, 8);
/// strip.show_color(0, 0, 40); // whole strip dim blue
/// ```
pub struct Ws2812<L: PulseLine> {
    line: L,
    count: usize,
    zero: L::Plan,
    one: L::Plan,
    reset_ns: u32,
}

impl<L: PulseLine> Ws2812<L> {
    /// Takes exclusive ownership of `line` and latches an all-black frame
    /// onto the `count`-pixel strip.
    pub fn new(line: L, timings: &StripTimings, count: usize) -> Self {
        let zero = line.plan(timings.t0h_ns, timings.t0l_ns);
        let one = line.plan(timings.t1h_ns, timings.t1l_ns);
        let mut strip = Self {
            line,
            count,
            zero,
            one,
            reset_ns: timings.reset_ns,
        };
        strip.show_color(0, 0, 0);
        strip
    }

    /// Number of pixels in one frame.
    pub const fn len(&self) -> usize {
        self.count
    }

    /// True for a zero-pixel strip.
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The pulse line, for inspection.
    pub fn line(&self) -> &L {
        &self.line
    }

    /// The pulse line, mutable; this is how trace backends get cleared
    /// between frames.
    pub fn line_mut(&mut self) -> &mut L {
        &mut self.line
    }

    /// Transmits one pixel: green, red, blue, each most significant bit
    /// first.
    ///
    /// Call once per pixel, in strip order, inside an active frame. Work
    /// per bit is one plan copy and one pulse, so frame duration depends
    /// only on the bit pattern and the chipset timings.
    pub fn send_pixel(&mut self, r: u8, g: u8, b: u8) {
        self.send_byte(g);
        self.send_byte(r);
        self.send_byte(b);
    }

    /// Holds the line low for the latch gap; transmits nothing.
    ///
    /// The strip applies the received frame only after this gap. Runs
    /// outside the critical section; latch timing tolerates jitter in the
    /// long direction.
    pub fn show(&mut self) {
        self.line.rest(self.reset_ns);
    }

    /// Fills the whole strip with one color.
    ///
    /// Masks interrupts, transmits `len` identical pixels, unmasks, then
    /// latches.
    pub fn show_color(&mut self, r: u8, g: u8, b: u8) {
        critical_section::with(|_| {
            for _ in 0..self.count {
                self.send_pixel(r, g, b);
            }
        });
        self.show();
    }

    /// Transmits a full frame of per-pixel colors, then latches.
    ///
    /// # Errors
    ///
    /// [`Error::FrameSizeMismatch`] unless `frame` holds exactly
    /// [`len`](Self::len) colors; a mismatch is refused before a single
    /// bit goes out.
    pub fn send_frame(&mut self, frame: &[Color]) -> Result<()> {
        if frame.len() != self.count {
            return Err(Error::FrameSizeMismatch {
                expected: self.count,
                actual: frame.len(),
            });
        }
        critical_section::with(|_| {
            for color in frame {
                self.send_pixel(color.r, color.g, color.b);
            }
        });
        self.show();
        Ok(())
    }

    fn send_byte(&mut self, byte: u8) {
        let mut bits = byte;
        for _ in 0..8 {
            self.send_bit(bits & 0x80 != 0);
            bits <<= 1;
        }
    }

    fn send_bit(&mut self, one: bool) {
        let plan = if one { self.one } else { self.zero };
        self.line.pulse(plan);
    }
}

/// Most events a [`TraceLine`] stores before it starts dropping.
pub const TRACE_EVENTS: usize = 4096;

/// One thing a [`TraceLine`] saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEvent {
    /// Two-phase pulse with the planned widths.
    Pulse {
        /// High phase width in nanoseconds.
        high_ns: u32,
        /// Low phase width in nanoseconds.
        low_ns: u32,
    },
    /// Low hold of at least the given width.
    Rest {
        /// Hold width in nanoseconds.
        ns: u32,
    },
}

/// Recording pulse line for tests and simulation.
///
/// Stores every pulse and rest with its requested widths, oldest first.
/// Past [`TRACE_EVENTS`] entries the log stops growing and marks itself
/// [`truncated`](Self::truncated).
#[derive(Default)]
pub struct TraceLine {
    events: Vec<LineEvent, TRACE_EVENTS>,
    truncated: bool,
}

impl TraceLine {
    /// Empty trace.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            events: Vec::new(),
            truncated: false,
        }
    }

    /// Everything recorded so far, oldest first.
    pub fn events(&self) -> &[LineEvent] {
        &self.events
    }

    /// The pulses recorded so far as `(high_ns, low_ns)` pairs, skipping
    /// rests.
    pub fn pulses(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.events.iter().filter_map(|event| match event {
            LineEvent::Pulse { high_ns, low_ns } => Some((*high_ns, *low_ns)),
            LineEvent::Rest { .. } => None,
        })
    }

    /// True once the log filled and events were dropped.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Forgets everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
        self.truncated = false;
    }

    fn record(&mut self, event: LineEvent) {
        if self.events.push(event).is_err() {
            self.truncated = true;
        }
    }
}

impl PulseLine for TraceLine {
    type Plan = (u32, u32);

    fn plan(&self, high_ns: u32, low_ns: u32) -> Self::Plan {
        (high_ns, low_ns)
    }

    fn pulse(&mut self, plan: Self::Plan) {
        let (high_ns, low_ns) = plan;
        self.record(LineEvent::Pulse { high_ns, low_ns });
    }

    fn rest(&mut self, ns: u32) {
        self.record(LineEvent::Rest { ns });
    }
}
