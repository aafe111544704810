//! In-memory raster image.
//!
//! A [`Bitmap`] is a row-major array of packed [`Rgba`] pixels with no row
//! padding: row `y` starts at byte `y * width * 4`. This is the layout the
//! accelerator kernels consume, so a bitmap's bytes can be uploaded to the
//! device without conversion.
//!
//! # Usage
//!
//! ```rust
//! use pixcl_core::{Bitmap, Rgba};
//!
//! let mut bmp = Bitmap::new(4, 2)?;
//! bmp.set_pixel(1, 1, Rgba::opaque(255, 0, 0))?;
//! assert_eq!(bmp.pixel(1, 1)?, Rgba::opaque(255, 0, 0));
//! assert_eq!(bmp.as_bytes().len(), 4 * 2 * 4);
//! # Ok::<(), pixcl_core::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::pixel::{BYTES_PER_PIXEL, Colorspace, Rgba};
use crate::rect::Size;

/// Packed RGBA8 raster image.
///
/// # Invariants
///
/// - `width > 0` and `height > 0`
/// - `pixels.len() == width * height`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

/// Computes `width * height` as `usize`, rejecting zero or overflowing sizes.
fn pixel_count(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .filter(|n| n.checked_mul(BYTES_PER_PIXEL).is_some())
        .ok_or(Error::InvalidDimensions { width, height })
}

impl Bitmap {
    /// Allocates a zeroed (transparent black) bitmap.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let count = pixel_count(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; count],
        })
    }

    /// Allocates a bitmap filled with one color.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Result<Self> {
        let count = pixel_count(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![color; count],
        })
    }

    /// Wraps existing pixels.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba>) -> Result<Self> {
        let count = pixel_count(width, height)?;
        if pixels.len() != count {
            return Err(Error::BufferSizeMismatch {
                expected: count * BYTES_PER_PIXEL,
                actual: pixels.len() * BYTES_PER_PIXEL,
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Builds a bitmap from interleaved RGBA bytes.
    pub fn from_rgba(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        Self::from_components(width, height, data, Colorspace::Rgba)
    }

    /// Builds a bitmap from interleaved RGB bytes; alpha is set to 255.
    pub fn from_rgb(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        Self::from_components(width, height, data, Colorspace::Rgb)
    }

    /// Builds a bitmap from interleaved bytes in the given colorspace.
    pub fn from_components(
        width: u32,
        height: u32,
        data: &[u8],
        colorspace: Colorspace,
    ) -> Result<Self> {
        let count = pixel_count(width, height)?;
        let channels = colorspace.components();
        let expected = count * channels;
        if data.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        let pixels = match colorspace {
            Colorspace::Rgba => bytemuck::cast_slice::<u8, Rgba>(data).to_vec(),
            Colorspace::Rgb => data
                .chunks_exact(3)
                .map(|c| Rgba::opaque(c[0], c[1], c[2]))
                .collect(),
        };

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions as a [`Size`].
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// Returns the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Result<Rgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Overwrites the pixel at `(x, y)`.
    pub fn set_pixel(&mut self, x: u32, y: u32, px: Rgba) -> Result<()> {
        let i = self.index(x, y)?;
        self.pixels[i] = px;
        Ok(())
    }

    /// All pixels, row-major.
    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Mutable access to all pixels, row-major.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.pixels
    }

    /// One row of pixels. Panics if `y` is out of range.
    #[inline]
    pub fn row(&self, y: u32) -> &[Rgba] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.pixels[start..start + w]
    }

    /// Packed bytes, `width * height * 4` long.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Mutable packed bytes.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.pixels)
    }

    /// Deep copy. Equivalent to `clone`, named for symmetry with the
    /// allocation helpers.
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    /// Interleaved bytes in the requested colorspace.
    ///
    /// Dropping alpha maps fully transparent pixels to white, so areas the
    /// source treated as "nothing" don't turn black.
    pub fn to_components(&self, colorspace: Colorspace) -> Vec<u8> {
        match colorspace {
            Colorspace::Rgba => self.as_bytes().to_vec(),
            Colorspace::Rgb => {
                let mut out = Vec::with_capacity(self.pixels.len() * 3);
                for px in &self.pixels {
                    if px.a == 0 {
                        out.extend_from_slice(&[255, 255, 255]);
                    } else {
                        out.extend_from_slice(&[px.r, px.g, px.b]);
                    }
                }
                out
            }
        }
    }

    fn index(&self, x: u32, y: u32) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(Error::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.width as usize + x as usize)
    }
}
