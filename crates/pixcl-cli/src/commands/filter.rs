//! Grayscale and sepia commands

use crate::FilterArgs;
use anyhow::Result;
use pixcl_compute::{ComputeResult, Processor, ProcessorConfig};
use pixcl_core::Bitmap;
use std::time::Instant;
use tracing::info;

pub fn grayscale(args: FilterArgs, config: &ProcessorConfig) -> Result<()> {
    apply(args, config, "grayscale", |proc, image| proc.grayscale(image))
}

pub fn sepia(args: FilterArgs, config: &ProcessorConfig) -> Result<()> {
    apply(args, config, "sepia", |proc, image| proc.sepia(image))
}

fn apply<F>(args: FilterArgs, config: &ProcessorConfig, name: &str, op: F) -> Result<()>
where
    F: FnOnce(&Processor, &Bitmap) -> ComputeResult<Bitmap>,
{
    let image = super::load_image(&args.input)?;
    let proc = super::processor(config)?;

    let start = Instant::now();
    let output = op(&proc, &image)?;
    info!(
        "{name} {} on {} in {:.2?}",
        image.size(),
        proc.backend_name(),
        start.elapsed()
    );

    super::save_image(&args.output, &output)
}
