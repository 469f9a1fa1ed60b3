//! RP2040 pulse line: SIO pin writes spaced by cycle-counted busy waits.

use cortex_m::asm;
use embassy_rp::Peri;
use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::gpio::{Level, Output, Pin};
use embassy_time::{Duration, block_for};

use super::PulseLine;

/// Cycles eaten by the pin writes and loop bookkeeping around each spin,
/// trimmed off every planned phase.
const PHASE_OVERHEAD_CYCLES: u32 = 6;

/// Cycle counts for one two-phase pulse.
#[derive(Debug, Clone, Copy)]
pub struct PulseCycles {
    high: u32,
    low: u32,
}

/// GPIO pulse line driven by cycle-counted busy waits.
///
/// Phase widths convert to system-clock cycles once, at plan time, from the
/// live `clk_sys` frequency. A pulse is then two SIO writes and two
/// [`asm::delay`] spins; at the stock 125 MHz that holds each phase inside
/// the chipset tolerance provided the caller keeps interrupts masked.
pub struct CycleCountedLine<'d> {
    pin: Output<'d>,
}

impl<'d> CycleCountedLine<'d> {
    /// Claims `pin` as a driven output and idles it low.
    pub fn new<P: Pin>(pin: Peri<'d, P>) -> Self {
        Self {
            pin: Output::new(pin, Level::Low),
        }
    }
}

impl PulseLine for CycleCountedLine<'_> {
    type Plan = PulseCycles;

    fn plan(&self, high_ns: u32, low_ns: u32) -> Self::Plan {
        PulseCycles {
            high: cycles(high_ns),
            low: cycles(low_ns),
        }
    }

    fn pulse(&mut self, plan: Self::Plan) {
        self.pin.set_high();
        asm::delay(plan.high);
        self.pin.set_low();
        asm::delay(plan.low);
    }

    fn rest(&mut self, ns: u32) {
        self.pin.set_low();
        block_for(Duration::from_micros(u64::from(ns.div_ceil(1_000))));
    }
}

/// Spin length for one phase: the width in `clk_sys` cycles, rounded up,
/// minus the fixed overhead.
#[expect(
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    reason = "phase widths keep the product inside u64 and the cycle count inside u32"
)]
fn cycles(ns: u32) -> u32 {
    let ticks = (u64::from(ns) * u64::from(clk_sys_freq())).div_ceil(1_000_000_000);
    (ticks as u32).saturating_sub(PHASE_OVERHEAD_CYCLES)
}
