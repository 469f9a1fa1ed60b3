#![allow(missing_docs)]
#![no_std]
#![no_main]
#![cfg(feature = "embedded")]

use core::{convert::Infallible, panic};

use embassy_executor::Spawner;
use embassy_time::{Duration, Instant, Timer};
use strand_kit::{
    Result,
    color::Color,
    pixel_buffer::PixelBuffer,
    rain::Rain,
    ws2812::{StripTimings, Ws2812, rp::CycleCountedLine},
};
use {defmt_rtt as _, panic_probe as _};

const STRIP_LEN: usize = 16;

#[embassy_executor::main]
async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(_spawner: Spawner) -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    let mut strip = Ws2812::new(
        CycleCountedLine::new(p.PIN_0),
        &StripTimings::WS2812B,
        STRIP_LEN,
    );

    // A strip this short fits in working memory; dirty tracking on so
    // frames with no visible change cost nothing on the wire.
    let mut pixels = PixelBuffer::local(STRIP_LEN, true);
    let mut frame = [Color::BLACK; STRIP_LEN];

    // Random pattern seeded by boot time.
    let seed = (Instant::now().as_millis() ^ 0x9e37_79b9) as u32;
    let mut rain = Rain::new(seed);

    loop {
        rain.step(&mut pixels);
        if pixels.sync_into(&mut frame) > 0 {
            strip.send_frame(&frame)?;
        }
        pixels.clear_dirty();
        Timer::after(Duration::from_millis(30)).await;
    }
}
