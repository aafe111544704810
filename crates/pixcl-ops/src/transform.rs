//! Geometric copy operations.

use crate::{OpsError, OpsResult};
use pixcl_core::{Bitmap, Rect};
use tracing::{debug, trace};

/// Copies the region `rect` of `input` into `output`.
///
/// Fails without touching `output` when the region falls outside `input`
/// or its size differs from `output`'s.
///
/// # Example
///
/// ```rust
/// use pixcl_core::{Bitmap, Rect, Rgba};
/// use pixcl_ops::transform::crop;
///
/// let src = Bitmap::filled(8, 8, Rgba::WHITE)?;
/// let mut dst = Bitmap::new(2, 3)?;
/// crop(&src, Rect::new(6, 5, 2, 3), &mut dst)?;
/// assert!(crop(&src, Rect::new(7, 5, 2, 3), &mut dst).is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn crop(input: &Bitmap, rect: Rect, output: &mut Bitmap) -> OpsResult<()> {
    if !rect.fits_within(input.size()) {
        debug!(?rect, src = %input.size(), "crop region outside source");
        return Err(OpsError::CropOutOfBounds {
            x: rect.origin.x,
            y: rect.origin.y,
            width: rect.size.width,
            height: rect.size.height,
            src_width: input.width(),
            src_height: input.height(),
        });
    }
    if rect.size != output.size() {
        return Err(OpsError::SizeMismatch(format!(
            "crop region is {}, output is {}",
            rect.size,
            output.size()
        )));
    }

    trace!(?rect, src = %input.size(), "crop");
    let x = rect.origin.x as usize;
    let w = rect.size.width as usize;
    for row in 0..rect.size.height {
        let src = &input.row(rect.origin.y + row)[x..x + w];
        let start = row as usize * w;
        output.pixels_mut()[start..start + w].copy_from_slice(src);
    }
    Ok(())
}

/// Allocates a new bitmap holding the region `rect` of `input`.
pub fn cropped(input: &Bitmap, rect: Rect) -> OpsResult<Bitmap> {
    let mut out = Bitmap::new(rect.size.width, rect.size.height)?;
    crop(input, rect, &mut out)?;
    Ok(out)
}
