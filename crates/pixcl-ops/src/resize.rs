//! Resampling: nearest-neighbor and bilinear.
//!
//! Output dimensions come from the destination bitmap; source and
//! destination sizes are independent.

use crate::OpsResult;
use pixcl_core::{Bitmap, Rgba};
use tracing::trace;

/// Source coordinate for nearest-neighbor sampling.
///
/// Exact integer form of `floor(dst * src_len / dst_len)`.
#[inline]
pub fn nearest_source(dst: u32, src_len: u32, dst_len: u32) -> u32 {
    (dst as u64 * src_len as u64 / dst_len as u64) as u32
}

/// Step between source samples for bilinear scaling: `(in - 1) / out`.
#[inline]
pub fn bilinear_ratio(src_len: u32, dst_len: u32) -> f32 {
    (src_len - 1) as f32 / dst_len as f32
}

/// Nearest-neighbor scale of `input` into `output`.
///
/// ```rust
/// use pixcl_core::{Bitmap, Rgba};
/// use pixcl_ops::resize::scale_nearest;
///
/// let src = Bitmap::filled(4, 4, Rgba::WHITE)?;
/// let mut dst = Bitmap::new(2, 2)?;
/// scale_nearest(&src, &mut dst)?;
/// assert_eq!(dst.pixel(1, 1)?, Rgba::WHITE);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn scale_nearest(input: &Bitmap, output: &mut Bitmap) -> OpsResult<()> {
    let (in_w, in_h) = (input.width(), input.height());
    let (out_w, out_h) = (output.width(), output.height());
    trace!(from = %input.size(), to = %output.size(), "nearest");

    for y in 0..out_h {
        let sy = nearest_source(y, in_h, out_h);
        let src_row = input.row(sy);
        let start = y as usize * out_w as usize;
        let dst_row = &mut output.pixels_mut()[start..start + out_w as usize];
        for (x, px) in dst_row.iter_mut().enumerate() {
            *px = src_row[nearest_source(x as u32, in_w, out_w) as usize];
        }
    }
    Ok(())
}

/// Blends the four source pixels around `(gx, gy)`.
///
/// Right and bottom neighbors are clamped to the image edge.
#[inline]
pub fn bilinear_sample(input: &Bitmap, gx: f32, gy: f32) -> Rgba {
    let max_x = input.width() - 1;
    let max_y = input.height() - 1;
    let i = (gx as u32).min(max_x);
    let j = (gy as u32).min(max_y);
    let dx = gx - i as f32;
    let dy = gy - j as f32;
    let i1 = (i + 1).min(max_x);
    let j1 = (j + 1).min(max_y);

    let w = input.width() as usize;
    let px = input.pixels();
    let a = px[j as usize * w + i as usize].to_array();
    let b = px[j as usize * w + i1 as usize].to_array();
    let c = px[j1 as usize * w + i as usize].to_array();
    let d = px[j1 as usize * w + i1 as usize].to_array();

    let wa = (1.0 - dx) * (1.0 - dy);
    let wb = dx * (1.0 - dy);
    let wc = dy * (1.0 - dx);
    let wd = dx * dy;

    let mut out = [0u8; 4];
    for ch in 0..4 {
        let v = a[ch] as f32 * wa + b[ch] as f32 * wb + c[ch] as f32 * wc + d[ch] as f32 * wd;
        out[ch] = v.round().clamp(0.0, 255.0) as u8;
    }
    Rgba::from(out)
}

/// Bilinear scale of `input` into `output`.
pub fn scale_bilinear(input: &Bitmap, output: &mut Bitmap) -> OpsResult<()> {
    let x_ratio = bilinear_ratio(input.width(), output.width());
    let y_ratio = bilinear_ratio(input.height(), output.height());
    let out_w = output.width() as usize;
    trace!(from = %input.size(), to = %output.size(), x_ratio, y_ratio, "bilinear");

    for y in 0..output.height() as usize {
        let gy = y as f32 * y_ratio;
        for x in 0..out_w {
            output.pixels_mut()[y * out_w + x] = bilinear_sample(input, x as f32 * x_ratio, gy);
        }
    }
    Ok(())
}
