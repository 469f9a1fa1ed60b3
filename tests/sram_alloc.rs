#![allow(missing_docs)]
//! Host tests for the serial RAM bump allocator.

use strand_kit::sram::{SRAM_CAPACITY, SramAlloc};

#[test]
fn first_grant_skips_the_null_offset() {
    let mut alloc = SramAlloc::new();
    let grant = alloc.alloc(16).unwrap();
    assert_eq!(grant.offset(), 1);
}

#[test]
fn grants_are_adjacent_and_non_overlapping() {
    let mut alloc = SramAlloc::new();
    let first = alloc.alloc(100).unwrap();
    let second = alloc.alloc(50).unwrap();
    let third = alloc.alloc(1).unwrap();
    assert_eq!(first.offset(), 1);
    assert_eq!(second.offset(), 101);
    assert_eq!(third.offset(), 151);
}

#[test]
fn refused_grant_leaves_the_cursor_for_smaller_requests() {
    let mut alloc = SramAlloc::with_capacity(100);
    let first = alloc.alloc(89).unwrap();
    assert_eq!(first.offset(), 1);

    // The cursor sits at 90 now; 20 more bytes would run past the arena.
    assert!(alloc.alloc(20).is_none());

    // The refusal moved nothing, so a 9-byte grant still fits.
    let second = alloc.alloc(9).unwrap();
    assert_eq!(second.offset(), 90);

    // Cursor 99 against capacity 100: even one more byte is refused.
    assert!(alloc.alloc(1).is_none());
}

#[test]
fn whole_arena_request_is_refused() {
    // Offset 0 is reserved, so the full capacity can never fit.
    let mut alloc = SramAlloc::new();
    assert!(alloc.alloc(SRAM_CAPACITY).is_none());
}

#[test]
fn request_past_u16_range_is_refused() {
    let mut alloc = SramAlloc::new();
    assert!(alloc.alloc(usize::MAX).is_none());
    assert!(alloc.alloc(1 << 17).is_none());
    // The refusals left the arena untouched.
    assert_eq!(alloc.alloc(8).unwrap().offset(), 1);
}

#[test]
fn remaining_is_the_largest_grant_that_still_succeeds() {
    let mut alloc = SramAlloc::with_capacity(100);
    assert_eq!(alloc.remaining(), 98);

    alloc.alloc(50).unwrap();
    assert_eq!(alloc.remaining(), 48);

    // Exactly `remaining` bytes fit; one more does not.
    assert!(alloc.alloc(48).is_some());
    assert_eq!(alloc.remaining(), 0);
    assert!(alloc.alloc(1).is_none());
}
