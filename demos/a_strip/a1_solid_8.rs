#![allow(missing_docs)]
#![no_std]
#![no_main]
#![cfg(feature = "embedded")]

use core::{convert::Infallible, panic};

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use strand_kit::{
    Result,
    ws2812::{StripTimings, Ws2812, rp::CycleCountedLine},
};
use {defmt_rtt as _, panic_probe as _};

// Two "mains" let the real one use Results.
#[embassy_executor::main]
async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(_spawner: Spawner) -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    // Constructing the transmitter latches an all-black frame, so the
    // strip starts dark no matter what it showed before reset.
    let mut strip = Ws2812::new(CycleCountedLine::new(p.PIN_0), &StripTimings::WS2812B, 8);

    // Walk the primaries so a miswired strip is easy to spot: the order
    // seen should be red, green, blue.
    loop {
        for (r, g, b) in [(40, 0, 0), (0, 40, 0), (0, 0, 40)] {
            strip.show_color(r, g, b);
            Timer::after(Duration::from_millis(500)).await;
        }
    }
}
