#![allow(missing_docs)]
//! Host tests for WS2812 framing and pulse timing, over the trace line.

use strand_kit::Error;
use strand_kit::color::Color;
use strand_kit::ws2812::{LineEvent, StripTimings, TRACE_EVENTS, TraceLine, Ws2812};

const TIMINGS: StripTimings = StripTimings::WS2812B;

#[test]
fn construction_latches_an_all_black_frame() {
    let strip = Ws2812::new(TraceLine::new(), &TIMINGS, 8);

    let pulses: Vec<(u32, u32)> = strip.line().pulses().collect();
    assert_eq!(pulses.len(), 8 * 24);
    assert!(
        pulses
            .iter()
            .all(|&(high, low)| high == TIMINGS.t0h_ns && low == TIMINGS.t0l_ns)
    );
    match strip.line().events().last() {
        Some(LineEvent::Rest { ns }) => assert!(*ns >= 6_000),
        other => panic!("expected a latch rest, got {other:?}"),
    }
}

#[test]
fn pixel_bits_go_out_green_red_blue_msb_first() {
    let mut strip = Ws2812::new(TraceLine::new(), &TIMINGS, 1);
    strip.line_mut().clear();
    strip
        .send_frame(&[Color::new(0b1010_0001, 0b1100_0011, 0b0111_1110)])
        .unwrap();

    let mut expected = Vec::new();
    for byte in [0b1100_0011u8, 0b1010_0001, 0b0111_1110] {
        for shift in 0..8 {
            let one = byte << shift & 0x80 != 0;
            expected.push(if one { TIMINGS.t1h_ns } else { TIMINGS.t0h_ns });
        }
    }
    let highs: Vec<u32> = strip.line().pulses().map(|(high, _)| high).collect();
    assert_eq!(highs, expected);
}

#[test]
fn show_color_covers_every_pixel() {
    let mut strip = Ws2812::new(TraceLine::new(), &TIMINGS, 8);
    strip.line_mut().clear();
    strip.show_color(0x80, 0, 0);

    let highs: Vec<u32> = strip.line().pulses().map(|(high, _)| high).collect();
    assert_eq!(highs.len(), 8 * 24);
    let ones = highs.iter().filter(|&&high| high == TIMINGS.t1h_ns).count();
    assert_eq!(ones, 8);
    // The single 1 bit leads the red byte, so it follows the 8 green bits.
    assert_eq!(highs[8], TIMINGS.t1h_ns);
}

#[test]
fn a_frame_ends_with_the_latch_hold() {
    let mut strip = Ws2812::new(TraceLine::new(), &TIMINGS, 4);
    strip.line_mut().clear();
    strip.send_frame(&[Color::new(1, 2, 3); 4]).unwrap();

    let events = strip.line().events();
    assert!(matches!(
        events.last(),
        Some(LineEvent::Rest { ns }) if *ns == TIMINGS.reset_ns
    ));
    // Everything before the latch is pulses; the rest comes last.
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, LineEvent::Rest { .. }))
            .count(),
        1
    );
}

#[test]
fn wrong_frame_length_is_refused_before_any_pulse() {
    let mut strip = Ws2812::new(TraceLine::new(), &TIMINGS, 8);
    strip.line_mut().clear();

    let err = strip.send_frame(&[Color::BLACK; 7]).unwrap_err();
    assert!(matches!(
        err,
        Error::FrameSizeMismatch {
            expected: 8,
            actual: 7
        }
    ));
    assert!(strip.line().events().is_empty());
}

#[test]
fn manual_pixel_sequence_matches_show_color() {
    let mut strip = Ws2812::new(TraceLine::new(), &TIMINGS, 2);
    strip.line_mut().clear();
    strip.show_color(10, 20, 30);
    let auto: Vec<LineEvent> = strip.line().events().to_vec();

    strip.line_mut().clear();
    critical_section::with(|_| {
        strip.send_pixel(10, 20, 30);
        strip.send_pixel(10, 20, 30);
    });
    strip.show();

    assert_eq!(strip.line().events(), auto.as_slice());
}

#[test]
fn equal_bit_periods_give_content_independent_frame_time() {
    // Both bit shapes span 1250 ns here, so frame duration depends only
    // on length, never on the colors in it.
    let timings = StripTimings {
        t0h_ns: 400,
        t0l_ns: 850,
        t1h_ns: 800,
        t1l_ns: 450,
        reset_ns: 6_000,
    };
    let mut strip = Ws2812::new(TraceLine::new(), &timings, 4);

    strip.line_mut().clear();
    strip.send_frame(&[Color::BLACK; 4]).unwrap();
    let dark: u64 = strip
        .line()
        .pulses()
        .map(|(high, low)| u64::from(high) + u64::from(low))
        .sum();

    strip.line_mut().clear();
    strip.send_frame(&[Color::new(255, 255, 255); 4]).unwrap();
    let bright: u64 = strip
        .line()
        .pulses()
        .map(|(high, low)| u64::from(high) + u64::from(low))
        .sum();

    assert_eq!(dark, bright);
}

#[test]
fn long_reset_variant_changes_only_the_latch() {
    let short = StripTimings::WS2812B;
    let long = StripTimings::WS2812B_LONG_RESET;
    assert_eq!(long.t0h_ns, short.t0h_ns);
    assert_eq!(long.t0l_ns, short.t0l_ns);
    assert_eq!(long.t1h_ns, short.t1h_ns);
    assert_eq!(long.t1l_ns, short.t1l_ns);
    assert_eq!(long.reset_ns, 600_000);

    assert_eq!(short.with_reset_ns(250_000).reset_ns, 250_000);
}

#[test]
fn overfull_trace_marks_itself_truncated() {
    // 200 pixels want 4800 pulses; the trace caps out and says so rather
    // than silently dropping the tail.
    let strip = Ws2812::new(TraceLine::new(), &TIMINGS, 200);
    assert!(strip.line().truncated());
    assert_eq!(strip.line().events().len(), TRACE_EVENTS);
}
