#![allow(missing_docs)]
#![no_std]
#![no_main]
#![cfg(feature = "embedded")]

use core::{convert::Infallible, panic};

use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::spi::{self, Spi};
use embassy_time::{Duration, Instant, Timer};
use embedded_hal_bus::spi::ExclusiveDevice;
use strand_kit::{
    Error, Result,
    color::Color,
    pixel_buffer::{Backend, BufferLayout, PixelBuffer},
    rain::Rain,
    sram::{Spi23k256, SramAlloc},
    ws2812::{StripTimings, Ws2812, rp::CycleCountedLine},
};
use {defmt_rtt as _, panic_probe as _};

// 256 pixels is the most the local backend will hold; this demo pushes the
// colors and the dirty bitmap out to a 23K256 on SPI0 instead, leaving
// working memory for the mirror frame alone.
const STRIP_LEN: usize = 256;

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

    // 23K256 wiring on the standard SPI0 pins: SCK=GP18, MOSI=GP19,
    // MISO=GP16, CS=GP17.
    let mut config = spi::Config::default();
    config.frequency = 8_000_000;
    let bus = Spi::new_blocking(p.SPI0, p.PIN_18, p.PIN_19, p.PIN_16, config);
    let cs = Output::new(p.PIN_17, Level::High);
    let device = ExclusiveDevice::new_no_delay(bus, cs).expect("chip select is infallible");
    let sram = Spi23k256::new(device);

    // Grant all extended storage up front; nothing allocates after this.
    let mut alloc = SramAlloc::new();
    let mut pixels = PixelBuffer::new(
        sram,
        &mut alloc,
        STRIP_LEN,
        BufferLayout {
            colors: Backend::Extended,
            dirty: Some(Backend::Extended),
        },
    );
    if pixels.is_disabled() {
        return Err(Error::StorageExhausted);
    }
    defmt::info!(
        "serial RAM arena: {} bytes left after reservations",
        alloc.remaining()
    );

    // The dirty bitmap keeps the mirror refresh cheap: only 8-pixel groups
    // that rain touched are re-read over SPI each step.
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
