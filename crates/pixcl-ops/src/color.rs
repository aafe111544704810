//! Per-pixel color filters: grayscale and sepia.
//!
//! Both take a source and a destination of identical dimensions and walk
//! them in a plain nested loop. This is the sequential path the
//! accelerated kernels are checked against.
//!
//! # Example
//!
//! ```rust
//! use pixcl_core::{Bitmap, Rgba};
//! use pixcl_ops::color::grayscale;
//!
//! let src = Bitmap::filled(2, 2, Rgba::opaque(0, 255, 0))?;
//! let mut dst = Bitmap::new(2, 2)?;
//! grayscale(&src, &mut dst)?;
//! assert_eq!(dst.pixel(1, 1)?, Rgba::opaque(182, 182, 182));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::pixel::{grayscale_pixel, sepia_pixel};
use crate::{OpsError, OpsResult};
use pixcl_core::{Bitmap, Rgba};
use tracing::debug;

/// Converts `input` to luma grayscale into `output`.
pub fn grayscale(input: &Bitmap, output: &mut Bitmap) -> OpsResult<()> {
    map_pixels(input, output, grayscale_pixel)
}

/// Applies sepia toning from `input` into `output`.
pub fn sepia(input: &Bitmap, output: &mut Bitmap) -> OpsResult<()> {
    map_pixels(input, output, sepia_pixel)
}

pub(crate) fn ensure_same_size(input: &Bitmap, output: &Bitmap) -> OpsResult<()> {
    if input.size() != output.size() {
        debug!(input = %input.size(), output = %output.size(), "size mismatch");
        return Err(OpsError::SizeMismatch(format!(
            "input is {}, output is {}",
            input.size(),
            output.size()
        )));
    }
    Ok(())
}

fn map_pixels(input: &Bitmap, output: &mut Bitmap, f: impl Fn(Rgba) -> Rgba) -> OpsResult<()> {
    ensure_same_size(input, output)?;

    let width = input.width() as usize;
    let src = input.pixels();
    let dst = output.pixels_mut();
    for y in 0..input.height() as usize {
        for x in 0..width {
            let i = y * width + x;
            dst[i] = f(src[i]);
        }
    }
    Ok(())
}
