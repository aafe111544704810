//! Packed RGBA8 pixel type and colorspace tags.
//!
//! Every bitmap in pixcl stores one [`Rgba`] per pixel. In memory a pixel
//! is four bytes in the order red, green, blue, alpha, which is exactly a
//! little-endian 32-bit word with red in the lowest byte. Accelerator
//! kernels operate on those words directly.
//!
//! ```text
//! byte:   0    1    2    3
//!       +----+----+----+----+
//!       | R  | G  | B  | A  |     word = R | G << 8 | B << 16 | A << 24
//!       +----+----+----+----+
//! ```

use bytemuck::{Pod, Zeroable};

/// Rec.709 luminance coefficient for red channel.
pub const REC709_LUMA_R: f32 = 0.2126;

/// Rec.709 luminance coefficient for green channel.
pub const REC709_LUMA_G: f32 = 0.7152;

/// Rec.709 luminance coefficient for blue channel.
pub const REC709_LUMA_B: f32 = 0.0722;

/// Number of bytes in one packed pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// One 8-bit RGBA pixel.
///
/// `#[repr(C)]` with four `u8` fields, so slices of `Rgba` can be cast to
/// and from byte slices with [`bytemuck`].
///
/// # Example
///
/// ```rust
/// use pixcl_core::Rgba;
///
/// let px = Rgba::new(0x11, 0x22, 0x33, 0x44);
/// assert_eq!(px.to_word(), 0x4433_2211);
/// assert_eq!(Rgba::from_word(0x4433_2211), px);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Rgba {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Rgba {
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Creates a pixel from its four channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque pixel (alpha = 255).
    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Packs the pixel into a little-endian 32-bit word.
    #[inline]
    pub const fn to_word(self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, self.a])
    }

    /// Unpacks a little-endian 32-bit word.
    #[inline]
    pub const fn from_word(word: u32) -> Self {
        let [r, g, b, a] = word.to_le_bytes();
        Self { r, g, b, a }
    }

    /// Returns the channels as an array `[r, g, b, a]`.
    #[inline]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Largest per-channel absolute difference between two pixels.
    ///
    /// Used when comparing accelerated output against the CPU path.
    #[inline]
    pub fn max_channel_diff(self, other: Self) -> u8 {
        self.to_array()
            .iter()
            .zip(other.to_array().iter())
            .map(|(a, b)| a.abs_diff(*b))
            .max()
            .unwrap_or(0)
    }
}

impl From<[u8; 4]> for Rgba {
    #[inline]
    fn from(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<Rgba> for [u8; 4] {
    #[inline]
    fn from(px: Rgba) -> Self {
        px.to_array()
    }
}

/// Channel layout of an encoded image on disk.
///
/// In memory everything is RGBA; the colorspace only matters when reading
/// from or writing to a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Colorspace {
    /// Three channels, no alpha.
    Rgb,
    /// Four channels with alpha.
    #[default]
    Rgba,
}

impl Colorspace {
    /// Number of 8-bit components per pixel.
    #[inline]
    pub const fn components(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    /// Short lowercase name, as used on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rgb => "rgb",
            Self::Rgba => "rgba",
        }
    }
}

impl std::fmt::Display for Colorspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
