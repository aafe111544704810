//! Row-parallel versions of the filters using Rayon.
//!
//! Same arithmetic as the sequential functions, split across output rows.
//! Results are bit-identical to the sequential path.
//!
//! # Example
//!
//! ```rust
//! use pixcl_core::{Bitmap, Rgba};
//! use pixcl_ops::parallel;
//!
//! let src = Bitmap::filled(64, 64, Rgba::opaque(10, 20, 30))?;
//! let mut dst = Bitmap::new(64, 64)?;
//! parallel::sepia(&src, &mut dst)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::OpsResult;
use crate::color::ensure_same_size;
use crate::pixel::{grayscale_pixel, sepia_pixel};
use crate::resize::{bilinear_ratio, bilinear_sample, nearest_source};
use pixcl_core::{Bitmap, Rgba};
use rayon::prelude::*;

/// Parallel grayscale.
pub fn grayscale(input: &Bitmap, output: &mut Bitmap) -> OpsResult<()> {
    map_pixels(input, output, grayscale_pixel)
}

/// Parallel sepia.
pub fn sepia(input: &Bitmap, output: &mut Bitmap) -> OpsResult<()> {
    map_pixels(input, output, sepia_pixel)
}

fn map_pixels(
    input: &Bitmap,
    output: &mut Bitmap,
    f: impl Fn(Rgba) -> Rgba + Sync,
) -> OpsResult<()> {
    ensure_same_size(input, output)?;

    let width = input.width() as usize;
    output
        .pixels_mut()
        .par_chunks_mut(width)
        .zip(input.pixels().par_chunks(width))
        .for_each(|(dst, src)| {
            for (d, s) in dst.iter_mut().zip(src) {
                *d = f(*s);
            }
        });
    Ok(())
}

/// Parallel nearest-neighbor scale.
pub fn scale_nearest(input: &Bitmap, output: &mut Bitmap) -> OpsResult<()> {
    let (in_w, in_h) = (input.width(), input.height());
    let (out_w, out_h) = (output.width(), output.height());

    output
        .pixels_mut()
        .par_chunks_mut(out_w as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let src_row = input.row(nearest_source(y as u32, in_h, out_h));
            for (x, px) in row.iter_mut().enumerate() {
                *px = src_row[nearest_source(x as u32, in_w, out_w) as usize];
            }
        });
    Ok(())
}

/// Parallel bilinear scale.
pub fn scale_bilinear(input: &Bitmap, output: &mut Bitmap) -> OpsResult<()> {
    let x_ratio = bilinear_ratio(input.width(), output.width());
    let y_ratio = bilinear_ratio(input.height(), output.height());
    let out_w = output.width() as usize;

    output
        .pixels_mut()
        .par_chunks_mut(out_w)
        .enumerate()
        .for_each(|(y, row)| {
            let gy = y as f32 * y_ratio;
            for (x, px) in row.iter_mut().enumerate() {
                *px = bilinear_sample(input, x as f32 * x_ratio, gy);
            }
        });
    Ok(())
}
