//! Crop command

use crate::CropArgs;
use anyhow::Result;
use pixcl_compute::ProcessorConfig;
use pixcl_core::Rect;
use tracing::debug;

pub fn run(args: CropArgs, config: &ProcessorConfig) -> Result<()> {
    let image = super::load_image(&args.input)?;
    let rect = Rect::new(args.x, args.y, args.w, args.h);
    debug!("cropping {}x{} @ ({},{}) from {}", args.w, args.h, args.x, args.y, image.size());

    let output = super::processor(config)?.crop(&image, rect)?;
    super::save_image(&args.output, &output)
}
