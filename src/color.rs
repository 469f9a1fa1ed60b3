//! Color values as stored by [`PixelBuffer`](crate::pixel_buffer::PixelBuffer).
//!
//! A stored color carries its three channels plus one padding byte, so a
//! pixel occupies a fixed [`COLOR_BYTES`]-wide slot in either storage
//! backend and whole-value comparison covers every channel at once.

pub use smart_leds::RGB8;

/// Width in bytes of one stored [`Color`], padding included.
pub const COLOR_BYTES: usize = 4;

/// One of the three color channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Red channel.
    Red,
    /// Green channel.
    Green,
    /// Blue channel.
    Blue,
}

impl Channel {
    /// All channels, in storage order.
    pub const ALL: [Self; 3] = [Self::Red, Self::Green, Self::Blue];
}

/// An RGB color padded to four bytes.
///
/// The padding byte always reads zero, so two colors are equal exactly when
/// their channels are. Channels are independent; no invariant couples them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(C)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    pad: u8,
}

impl Color {
    /// All channels zero, the "strip off" color.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Creates a color from its three channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, pad: 0 }
    }

    /// Returns the value of one channel.
    #[must_use]
    pub const fn channel(&self, channel: Channel) -> u8 {
        match channel {
            Channel::Red => self.r,
            Channel::Green => self.g,
            Channel::Blue => self.b,
        }
    }

    /// Replaces the value of one channel.
    pub const fn set_channel(&mut self, channel: Channel, value: u8) {
        match channel {
            Channel::Red => self.r = value,
            Channel::Green => self.g = value,
            Channel::Blue => self.b = value,
        }
    }

    /// Storage representation: `[r, g, b, 0]`.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; COLOR_BYTES] {
        [self.r, self.g, self.b, 0]
    }

    /// Rebuilds a color from its storage representation.
    ///
    /// The padding byte is discarded, so bytes read back from storage that
    /// was never written still produce a well-formed color.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; COLOR_BYTES]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }
}

impl From<RGB8> for Color {
    fn from(rgb: RGB8) -> Self {
        Self::new(rgb.r, rgb.g, rgb.b)
    }
}

impl From<Color> for RGB8 {
    fn from(color: Color) -> Self {
        Self::new(color.r, color.g, color.b)
    }
}
