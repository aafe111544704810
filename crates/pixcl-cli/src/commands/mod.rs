//! CLI command implementations

pub mod bench;
pub mod crop;
pub mod filter;
pub mod info;
pub mod scale;

use crate::OutputArgs;
use anyhow::{Context, Result};
use pixcl_compute::{Processor, ProcessorConfig};
use pixcl_core::{Bitmap, Colorspace};
use pixcl_io::Format;
use std::path::Path;
use tracing::debug;

/// Load image from path
pub fn load_image(path: &Path) -> Result<Bitmap> {
    pixcl_io::read(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save image as the output flags ask.
pub fn save_image(out: &OutputArgs, bitmap: &Bitmap) -> Result<()> {
    let format = out
        .format
        .map(Format::from)
        .unwrap_or_else(|| Format::from_extension(&out.output));
    let colorspace = out
        .colorspace
        .map(Colorspace::from)
        .unwrap_or_else(|| default_colorspace(format));

    debug!(format = format.name(), %colorspace, "saving");
    pixcl_io::write_as(&out.output, bitmap, format, colorspace)
        .with_context(|| format!("Failed to save: {}", out.output.display()))
}

/// JPEG has no alpha channel.
fn default_colorspace(format: Format) -> Colorspace {
    match format {
        Format::Jpeg => Colorspace::Rgb,
        _ => Colorspace::Rgba,
    }
}

/// Build the processor the global flags describe.
pub fn processor(config: &ProcessorConfig) -> Result<Processor> {
    Processor::with_config(config.clone()).context("Failed to start processor")
}

/// Format file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
