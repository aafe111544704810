//! Scale command
//!
//! Nearest-neighbor runs on the accelerator when one is active; bilinear
//! always runs on the CPU.

use crate::{ScaleArgs, ScaleFilter};
use anyhow::{Result, bail};
use pixcl_compute::ProcessorConfig;
use std::time::Instant;
use tracing::{debug, info};

/// Resolves the target size from the width/height/ratio flags.
pub(crate) fn target_size(
    src_w: u32,
    src_h: u32,
    width: Option<u32>,
    height: Option<u32>,
    ratio: Option<f32>,
) -> Result<(u32, u32)> {
    let scaled = |v: u32, f: f32| (v as f32 * f).round() as u32;
    let (w, h) = match (width, height, ratio) {
        (Some(w), Some(h), _) => (w, h),
        (Some(w), None, _) => (w, scaled(src_h, w as f32 / src_w as f32)),
        (None, Some(h), _) => (scaled(src_w, h as f32 / src_h as f32), h),
        (None, None, Some(r)) if r > 0.0 && r.is_finite() => (scaled(src_w, r), scaled(src_h, r)),
        (None, None, Some(r)) => bail!("Invalid scale ratio: {r}"),
        (None, None, None) => bail!("Specify --width, --height, or --ratio"),
    };
    if w == 0 || h == 0 {
        bail!("Target size {w}x{h} is empty");
    }
    Ok((w, h))
}

pub fn run(args: ScaleArgs, config: &ProcessorConfig) -> Result<()> {
    let image = super::load_image(&args.input)?;
    let (dst_w, dst_h) = target_size(
        image.width(),
        image.height(),
        args.width,
        args.height,
        args.ratio,
    )?;
    debug!(
        "scaling {} -> {dst_w}x{dst_h} ({:?})",
        image.size(),
        args.filter
    );

    let proc = super::processor(config)?;
    let start = Instant::now();
    let output = match args.filter {
        ScaleFilter::Nearest => proc.scale_nearest(&image, dst_w, dst_h)?,
        ScaleFilter::Bilinear => proc.scale_bilinear(&image, dst_w, dst_h)?,
    };
    let backend = match args.filter {
        ScaleFilter::Nearest => proc.backend_name(),
        ScaleFilter::Bilinear => "cpu",
    };
    info!(
        "scaled {} -> {} on {backend} in {:.2?}",
        image.size(),
        output.size(),
        start.elapsed()
    );

    super::save_image(&args.output, &output)
}
