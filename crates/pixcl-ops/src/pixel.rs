//! Per-pixel arithmetic shared by every grayscale/sepia implementation.
//!
//! The accelerator kernels perform exactly these operations in OpenCL C;
//! these functions are the reference they are tested against.

use pixcl_core::{REC709_LUMA_B, REC709_LUMA_G, REC709_LUMA_R, Rgba};

/// Sepia matrix, one row per output channel (r, g, b).
pub const SEPIA_MATRIX: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Rec.709 luma of an 8-bit color, rounded to nearest and clamped.
///
/// ```rust
/// use pixcl_ops::pixel::luminance;
///
/// assert_eq!(luminance(255, 0, 0), 54);
/// assert_eq!(luminance(0, 255, 0), 182);
/// assert_eq!(luminance(0, 0, 255), 18);
/// assert_eq!(luminance(255, 255, 255), 255);
/// ```
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let y = r as f32 * REC709_LUMA_R + g as f32 * REC709_LUMA_G + b as f32 * REC709_LUMA_B;
    (y + 0.5).clamp(0.0, 255.0) as u8
}

/// Replaces the color channels with their luma, keeping alpha.
#[inline]
pub fn grayscale_pixel(px: Rgba) -> Rgba {
    let y = luminance(px.r, px.g, px.b);
    Rgba::new(y, y, y, px.a)
}

/// Applies the sepia matrix, keeping alpha.
///
/// Each weighted sum is clamped to 255 and truncated toward zero.
#[inline]
pub fn sepia_pixel(px: Rgba) -> Rgba {
    let (r, g, b) = (px.r as f32, px.g as f32, px.b as f32);
    let channel = |row: [f32; 3]| (r * row[0] + g * row[1] + b * row[2]).min(255.0) as u8;
    Rgba::new(
        channel(SEPIA_MATRIX[0]),
        channel(SEPIA_MATRIX[1]),
        channel(SEPIA_MATRIX[2]),
        px.a,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grayscale_keeps_alpha() {
        let out = grayscale_pixel(Rgba::new(255, 0, 0, 7));
        assert_eq!(out, Rgba::new(54, 54, 54, 7));
    }

    #[test]
    fn sepia_saturates() {
        assert_eq!(sepia_pixel(Rgba::WHITE), Rgba::new(255, 255, 238, 255));
        assert_eq!(sepia_pixel(Rgba::new(0, 0, 0, 3)), Rgba::new(0, 0, 0, 3));
    }

    #[test]
    fn sepia_truncates() {
        // 100 * (0.393 + 0.769 + 0.189) = 135.1
        // 100 * (0.349 + 0.686 + 0.168) = 120.3
        // 100 * (0.272 + 0.534 + 0.131) = 93.7
        let out = sepia_pixel(Rgba::opaque(100, 100, 100));
        assert_eq!(out, Rgba::opaque(135, 120, 93));
    }
}
