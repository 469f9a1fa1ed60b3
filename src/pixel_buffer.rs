//! The canonical pixel store, spanning local and serial-RAM backends.
//!
//! [`PixelBuffer`] owns the color of every pixel on the strip plus an
//! optional dirty bitmap recording which pixels changed since the last
//! flush. Either can live in working memory or in a serial RAM arena
//! ([`crate::sram`]); the buffer reads and writes identically over both, so
//! animation code never knows where its bytes are.

use heapless::Vec;

use crate::color::{COLOR_BYTES, Channel, Color};
use crate::sram::{SramAddr, SramAlloc, SramBus, SramImage};

/// Most pixels a buffer will keep in working memory.
///
/// Counts above this belong in extended storage; working memory on the
/// reference board cannot spare more than a KiB for colors.
pub const LOCAL_PIXEL_CAPACITY: usize = 256;

/// Most dirty-bitmap bytes kept in working memory, sized to cover
/// [`LOCAL_PIXEL_CAPACITY`] pixels.
pub const LOCAL_FLAG_CAPACITY: usize = LOCAL_PIXEL_CAPACITY / 8;

/// Storage backend for color bytes or dirty-bitmap bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Backend {
    /// Directly addressable working memory.
    Local,
    /// Serial RAM arena, reached through streamed reads and writes.
    Extended,
}

/// Where a buffer keeps its colors and its optional dirty bitmap.
///
/// Chosen once at construction. The two choices are independent: a large
/// extended color buffer can still keep its (much smaller) bitmap local.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufferLayout {
    /// Backend for the `count * 4` color bytes.
    pub colors: Backend,
    /// Backend for the `ceil(count / 8)` bitmap bytes; `None` turns dirty
    /// tracking off.
    pub dirty: Option<Backend>,
}

enum ColorStore {
    Local(Vec<Color, LOCAL_PIXEL_CAPACITY>),
    Extended(SramAddr),
    Disabled,
}

enum FlagStore {
    Local(Vec<u8, LOCAL_FLAG_CAPACITY>),
    Extended(SramAddr),
    Disabled,
}

/// Single-slot write-combining cache for the most recently touched flag
/// byte. Holds the authoritative value of its group while occupied.
struct FlagCache {
    group: Option<usize>,
    byte: u8,
}

impl FlagCache {
    const fn empty() -> Self {
        Self {
            group: None,
            byte: 0,
        }
    }
}

/// Arena address of pixel `index` within a granted color range.
#[expect(
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    reason = "the allocator bounded the granted range to u16"
)]
fn color_addr(base: SramAddr, index: usize) -> SramAddr {
    base.byte_add((index * COLOR_BYTES) as u16)
}

/// Arena address of flag byte `group` within a granted bitmap range.
#[expect(
    clippy::cast_possible_truncation,
    reason = "the allocator bounded the granted range to u16"
)]
fn flag_addr(base: SramAddr, group: usize) -> SramAddr {
    base.byte_add(group as u16)
}

/// The canonical color of every pixel on one strip.
///
/// Holds exactly `count` colors, fixed at construction, plus an optional
/// one-bit-per-pixel dirty bitmap. A fresh buffer reads black everywhere.
///
/// Storage that fails to allocate degrades instead of aborting: a buffer
/// whose color bytes could not be reserved is *disabled* (reads return
/// black, writes do nothing), and a bitmap that could not be reserved
/// silently turns tracking off while colors keep working. Out-of-range
/// indices never touch storage; reads return black and writes are dropped.
///
/// # Example
///
/// ```
/// use strand_kit::color::Color;
/// use strand_kit::pixel_buffer::{Backend, BufferLayout, PixelBuffer};
/// use strand_kit::sram::{SRAM_CAPACITY, SramAlloc, SramImage};
///
/// let mut alloc = SramAlloc::new();
/// let mut buffer = PixelBuffer::new(
///     SramImage::<SRAM_CAPACITY>::new(),
///     &mut alloc,
///     256,
///     BufferLayout {
///         colors: Backend::Extended,
///         dirty: Some(Backend::Extended),
///     },
/// );
///
/// buffer.set(5, Color::new(10, 20, 30));
/// assert_eq!(buffer.get(5), Color::new(10, 20, 30));
/// assert_eq!(buffer.dirty_flags(5), 1 << 5);
///
/// buffer.clear_dirty();
/// assert_eq!(buffer.dirty_flags(5), 0);
/// assert_eq!(buffer.get(5), Color::new(10, 20, 30));
/// ```
pub struct PixelBuffer<B: SramBus = SramImage<0>> {
    bus: B,
    colors: ColorStore,
    flags: FlagStore,
    cache: FlagCache,
    count: usize,
}

impl PixelBuffer<SramImage<0>> {
    /// Buffer with every byte in working memory.
    ///
    /// Holds at most [`LOCAL_PIXEL_CAPACITY`] pixels; a larger `count`
    /// leaves the buffer disabled, the same degraded state as any failed
    /// reservation.
    pub fn local(count: usize, dirty_tracking: bool) -> Self {
        let layout = BufferLayout {
            colors: Backend::Local,
            dirty: dirty_tracking.then_some(Backend::Local),
        };
        let mut no_arena = SramAlloc::with_capacity(0);
        Self::new(SramImage::new(), &mut no_arena, count, layout)
    }
}

impl<B: SramBus> PixelBuffer<B> {
    /// Buffer with storage reserved per `layout`.
    ///
    /// Extended ranges are granted by `alloc` and must be reachable through
    /// `bus`; keep one allocator per arena so grants stay disjoint. Granted
    /// ranges are zero filled here, so never-written pixels read black. If
    /// the color reservation fails the buffer comes back disabled; if only
    /// the bitmap reservation fails, tracking is off and
    /// [`dirty_flags`](Self::dirty_flags) reads all-ones.
    pub fn new(bus: B, alloc: &mut SramAlloc, count: usize, layout: BufferLayout) -> Self {
        let mut buffer = Self {
            bus,
            colors: ColorStore::Disabled,
            flags: FlagStore::Disabled,
            cache: FlagCache::empty(),
            count,
        };
        buffer.colors = buffer.reserve_colors(alloc, layout.colors);
        if matches!(buffer.colors, ColorStore::Disabled) {
            return buffer;
        }
        if let Some(backend) = layout.dirty {
            buffer.flags = buffer.reserve_flags(alloc, backend);
        }
        buffer
    }

    /// Number of pixels, fixed at construction.
    pub const fn len(&self) -> usize {
        self.count
    }

    /// True for a zero-pixel buffer.
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// True when color storage failed to reserve and the buffer degraded to
    /// read-black / drop-writes.
    pub fn is_disabled(&self) -> bool {
        matches!(self.colors, ColorStore::Disabled)
    }

    /// True while writes are being recorded into the dirty bitmap.
    pub fn tracking_active(&self) -> bool {
        !matches!(self.flags, FlagStore::Disabled)
    }

    /// Stored color at `index`.
    ///
    /// Out of range, or on a disabled buffer, this returns black without
    /// touching storage.
    pub fn get(&mut self, index: usize) -> Color {
        if index >= self.count {
            return Color::BLACK;
        }
        let base = match &self.colors {
            ColorStore::Local(colors) => {
                return colors.get(index).copied().unwrap_or(Color::BLACK);
            }
            ColorStore::Extended(base) => *base,
            ColorStore::Disabled => return Color::BLACK,
        };
        let mut bytes = [0u8; COLOR_BYTES];
        self.bus.read_stream(color_addr(base, index), &mut bytes);
        Color::from_bytes(bytes)
    }

    /// Writes the full color at `index`, then marks it dirty.
    ///
    /// Out of range, or on a disabled buffer, nothing is written and
    /// nothing is marked.
    pub fn set(&mut self, index: usize, color: Color) {
        if index >= self.count {
            return;
        }
        match &mut self.colors {
            ColorStore::Local(colors) => {
                if let Some(slot) = colors.get_mut(index) {
                    *slot = color;
                }
            }
            ColorStore::Extended(base) => {
                let addr = color_addr(*base, index);
                self.bus.write_stream(addr, &color.to_bytes());
            }
            ColorStore::Disabled => return,
        }
        self.mark_dirty(index);
    }

    /// Composes a color from its channels and writes it at `index`.
    pub fn set_rgb(&mut self, index: usize, r: u8, g: u8, b: u8) {
        self.set(index, Color::new(r, g, b));
    }

    /// Rewrites one channel at `index`, leaving the others as stored.
    ///
    /// The stored color is read, patched, and written back whole; extended
    /// storage pays two stream operations per call.
    pub fn set_channel(&mut self, index: usize, channel: Channel, value: u8) {
        if index >= self.count {
            return;
        }
        let mut color = self.get(index);
        color.set_channel(channel, value);
        self.set(index, color);
    }

    /// The 8-pixel group byte holding `index`'s dirty bit.
    ///
    /// Callers mask out the bit they care about. With tracking off (by
    /// layout, by failed reservation, or because the whole buffer is
    /// disabled) every group reads `0xFF`, "treat everything as dirty". A
    /// group past the end of the bitmap reads 0.
    pub fn dirty_flags(&mut self, index: usize) -> u8 {
        if !self.tracking_active() {
            return 0xFF;
        }
        let group = index / 8;
        if group >= self.flag_len() {
            return 0;
        }
        if self.cache.group == Some(group) {
            return self.cache.byte;
        }
        self.read_flag_byte(group)
    }

    /// True when `index` changed since the last [`clear_dirty`](Self::clear_dirty)
    /// (or when tracking is off and everything counts as dirty).
    pub fn is_dirty(&mut self, index: usize) -> bool {
        self.dirty_flags(index) & (1 << (index % 8)) != 0
    }

    /// Zeroes the whole dirty bitmap and empties the cache slot.
    ///
    /// Call once per frame after consuming the flags. An extended bitmap is
    /// cleared byte by byte; the stream contract has no bulk clear.
    pub fn clear_dirty(&mut self) {
        self.cache.group = None;
        let flag_len = self.flag_len();
        match &mut self.flags {
            FlagStore::Local(flags) => flags.fill(0),
            FlagStore::Extended(base) => {
                let base = *base;
                for group in 0..flag_len {
                    self.bus.write_stream(flag_addr(base, group), &[0]);
                }
            }
            FlagStore::Disabled => {}
        }
    }

    /// Refreshes `frame` from the buffer, skipping clean 8-pixel groups,
    /// and returns how many pixels were copied.
    ///
    /// This is the renderer side of the dirty bitmap: keep a local mirror
    /// frame, refresh it here, hand the mirror to the transmitter, then
    /// call [`clear_dirty`](Self::clear_dirty). With tracking off every
    /// group reads dirty and the whole frame is refreshed.
    #[expect(
        clippy::arithmetic_side_effects,
        clippy::indexing_slicing,
        reason = "index stays below count, which is capped to the frame length"
    )]
    pub fn sync_into(&mut self, frame: &mut [Color]) -> usize {
        let count = self.count.min(frame.len());
        let mut copied = 0;
        let mut index = 0;
        while index < count {
            let flags = self.dirty_flags(index);
            if flags == 0 {
                index = (index / 8 + 1) * 8;
                continue;
            }
            let group_end = ((index / 8 + 1) * 8).min(count);
            while index < group_end {
                if flags & (1 << (index % 8)) != 0 {
                    frame[index] = self.get(index);
                    copied += 1;
                }
                index += 1;
            }
        }
        copied
    }

    fn reserve_colors(&mut self, alloc: &mut SramAlloc, backend: Backend) -> ColorStore {
        match backend {
            Backend::Local => {
                if self.count > LOCAL_PIXEL_CAPACITY {
                    return ColorStore::Disabled;
                }
                let mut colors = Vec::new();
                colors
                    .resize(self.count, Color::BLACK)
                    .expect("count checked against local capacity");
                ColorStore::Local(colors)
            }
            Backend::Extended => {
                let Some(bytes) = self.count.checked_mul(COLOR_BYTES) else {
                    return ColorStore::Disabled;
                };
                match alloc.alloc(bytes) {
                    Some(base) => {
                        self.zero_extended(base, bytes);
                        ColorStore::Extended(base)
                    }
                    None => ColorStore::Disabled,
                }
            }
        }
    }

    fn reserve_flags(&mut self, alloc: &mut SramAlloc, backend: Backend) -> FlagStore {
        let bytes = self.flag_len();
        match backend {
            Backend::Local => {
                if bytes > LOCAL_FLAG_CAPACITY {
                    return FlagStore::Disabled;
                }
                let mut flags = Vec::new();
                flags
                    .resize(bytes, 0)
                    .expect("length checked against local capacity");
                FlagStore::Local(flags)
            }
            Backend::Extended => match alloc.alloc(bytes) {
                Some(base) => {
                    self.zero_extended(base, bytes);
                    FlagStore::Extended(base)
                }
                None => FlagStore::Disabled,
            },
        }
    }

    /// Zero-fills a granted range so fresh storage reads as black.
    #[expect(
        clippy::arithmetic_side_effects,
        clippy::cast_possible_truncation,
        clippy::indexing_slicing,
        reason = "written stays below len, which the allocator bounded to u16"
    )]
    fn zero_extended(&mut self, base: SramAddr, len: usize) {
        const CHUNK: usize = 16;
        let zeros = [0u8; CHUNK];
        let mut written = 0;
        while written < len {
            let step = (len - written).min(CHUNK);
            self.bus
                .write_stream(base.byte_add(written as u16), &zeros[..step]);
            written += step;
        }
    }

    /// Sets `index`'s bit through the write-combining cache.
    ///
    /// Consecutive writes within one 8-pixel group update the cached byte
    /// only; the byte goes back to storage when a different group is
    /// touched or the bitmap is cleared. This is what keeps per-pixel cost
    /// down when the bitmap lives in extended storage, where every byte is
    /// a stream round-trip.
    fn mark_dirty(&mut self, index: usize) {
        if matches!(self.flags, FlagStore::Disabled) {
            return;
        }
        let group = index / 8;
        let bit = 1u8 << (index % 8);
        if self.cache.group == Some(group) {
            self.cache.byte |= bit;
            return;
        }
        self.flush_cache();
        let byte = self.read_flag_byte(group) | bit;
        self.cache = FlagCache {
            group: Some(group),
            byte,
        };
    }

    /// Writes the cached flag byte back to its group, if one is held.
    fn flush_cache(&mut self) {
        let Some(group) = self.cache.group else {
            return;
        };
        let byte = self.cache.byte;
        match &mut self.flags {
            FlagStore::Local(flags) => {
                if let Some(slot) = flags.get_mut(group) {
                    *slot = byte;
                }
            }
            FlagStore::Extended(base) => {
                let addr = flag_addr(*base, group);
                self.bus.write_stream(addr, &[byte]);
            }
            FlagStore::Disabled => {}
        }
        self.cache.group = None;
    }

    fn read_flag_byte(&mut self, group: usize) -> u8 {
        let base = match &self.flags {
            FlagStore::Local(flags) => return flags.get(group).copied().unwrap_or(0),
            FlagStore::Extended(base) => *base,
            FlagStore::Disabled => return 0,
        };
        let mut byte = [0u8];
        self.bus.read_stream(flag_addr(base, group), &mut byte);
        byte[0]
    }

    /// Bitmap length in bytes.
    fn flag_len(&self) -> usize {
        self.count.div_ceil(8)
    }
}
