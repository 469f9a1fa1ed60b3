//! Random-walk palette shift over a pixel buffer.
//!
//! A 3-bit hue mask picks which channels participate. Masked channels
//! stagger ±1 per frame inside the open interval (0, 255); unmasked
//! channels drain toward zero a step at a time. Once no unmasked channel is
//! lit anywhere the strip has settled into its hue, and the mask gets a
//! small per-frame chance to re-roll, shifting the palette. The effect only
//! ever talks to [`PixelBuffer`], so it runs unchanged over local or
//! extended storage.

use crate::color::Channel;
use crate::pixel_buffer::PixelBuffer;
use crate::sram::SramBus;

/// Default 1-in-n odds, per settled frame, of re-rolling the hue mask.
pub const DEFAULT_SHIFT_ODDS: u32 = 1000;

/// Linear congruential generator, numerical-recipes constants. Draws use
/// the high half only; the low bits of this generator cycle fast.
struct Lcg {
    state: u32,
}

impl Lcg {
    const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Draws from `0..bound`. A bound of zero draws zero.
    fn below(&mut self, bound: u32) -> u32 {
        self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (self.state >> 16).checked_rem(bound).unwrap_or(0)
    }
}

/// Random-walk color diffusion, deterministic per seed.
///
/// Call [`step`](Self::step) once per frame, then hand the buffer to the
/// transmitter however the application likes.
pub struct Rain {
    hue_mask: u8,
    shift_odds: u32,
    rng: Lcg,
}

impl Rain {
    /// Effect with a freshly rolled hue mask; equal seeds give equal runs.
    pub fn new(seed: u32) -> Self {
        let mut rain = Self {
            hue_mask: 0,
            shift_odds: DEFAULT_SHIFT_ODDS,
            rng: Lcg::new(seed),
        };
        rain.hue_mask = rain.pick_hue_mask();
        rain
    }

    /// Re-roll odds of 1 in `odds` per settled frame, instead of
    /// [`DEFAULT_SHIFT_ODDS`]. Zero odds re-roll on every settled frame.
    #[must_use]
    pub fn with_shift_odds(mut self, odds: u32) -> Self {
        self.shift_odds = odds;
        self
    }

    /// Channels currently walking, low three bits = red, green, blue.
    pub fn hue_mask(&self) -> u8 {
        self.hue_mask & 0b111
    }

    /// One frame step.
    ///
    /// Walks masked channels, drains unmasked ones, and once the strip has
    /// fully settled into the mask, maybe re-rolls it.
    pub fn step<B: SramBus>(&mut self, pixels: &mut PixelBuffer<B>) {
        if !self.walk_pixels(pixels) && self.rng.below(self.shift_odds) == 0 {
            self.hue_mask = self.pick_hue_mask();
        }
    }

    /// Rolls a new mask: 2..=6 keeps out black, white, and lone red.
    /// Complementing with 1-in-10 odds is what makes pure red possible at
    /// all, and only from cyan.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::arithmetic_side_effects,
        reason = "draws land in 2..=6, well inside u8"
    )]
    fn pick_hue_mask(&mut self) -> u8 {
        let mut cbits = (self.rng.below(5) + 2) as u8;
        if self.rng.below(10) == 0 {
            cbits = !cbits;
        }
        cbits
    }

    /// Walks every pixel once. Returns true while some unmasked channel is
    /// still lit, meaning the previous palette is still draining.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::arithmetic_side_effects,
        reason = "channel math stays inside the checked 0..=255 interval"
    )]
    fn walk_pixels<B: SramBus>(&mut self, pixels: &mut PixelBuffer<B>) -> bool {
        let mut draining = false;
        for index in 0..pixels.len() {
            for (bit, channel) in Channel::ALL.into_iter().enumerate() {
                if self.hue_mask >> bit & 1 == 1 {
                    let delta = self.rng.below(3) as i16 - 1;
                    let value = i16::from(pixels.get(index).channel(channel)) + delta;
                    if value > 0 && value < 255 {
                        pixels.set_channel(index, channel, value as u8);
                    }
                } else {
                    let lit = pixels.get(index).channel(channel);
                    if lit > 0 {
                        draining = true;
                        if self.rng.below(6) == 0 {
                            let mut color = pixels.get(index);
                            color.set_channel(channel, lit - 1);
                            pixels.set(index, color);
                        }
                    }
                }
            }
        }
        draining
    }
}
