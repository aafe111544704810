//! Info command
//!
//! Lists compute backends, OpenCL platforms and, for each given file, its
//! format and dimensions.

use crate::InfoArgs;
use anyhow::Result;
use pixcl_compute::{
    ComputeDriver, DefaultDriver, FilterKind, ProcessorConfig, describe_backends,
};
use pixcl_io::Format;
use std::path::Path;
use tracing::warn;

pub fn run(args: InfoArgs, config: &ProcessorConfig) -> Result<()> {
    if args.input.is_empty() {
        print_backends(config)
    } else {
        for path in &args.input {
            print_image(path)?;
        }
        Ok(())
    }
}

fn print_backends(config: &ProcessorConfig) -> Result<()> {
    println!("Backends:");
    for line in describe_backends().lines() {
        println!("  {line}");
    }

    let driver = DefaultDriver::default();
    match driver.platforms() {
        Ok(platforms) if platforms.is_empty() => println!("\nNo {} platforms", driver.name()),
        Ok(platforms) => {
            println!("\nPlatforms ({}):", driver.name());
            for (i, p) in platforms.iter().enumerate() {
                println!("  [{i}] {} ({})", p.name, p.vendor);
                println!("      {} / {}", p.version, p.profile);
            }
        }
        Err(e) => warn!("platform query failed: {e}"),
    }

    let proc = super::processor(config)?;
    println!("\nActive backend: {}", proc.backend_name());
    if let Some(accel) = proc.accelerator() {
        let env = accel.environment();
        if let Ok(name) = env.device_name() {
            println!("  Device:           {name}");
        }
        if let Ok(caps) = env.capabilities() {
            println!("  Int vector width: {}", caps.preferred_vector_width_int);
            println!("  Flt vector width: {}", caps.preferred_vector_width_float);
        }
        let filters = [
            FilterKind::Grayscale,
            FilterKind::Sepia,
            FilterKind::SepiaImage,
            FilterKind::ScaleNearest,
        ];
        for filter in filters {
            if let Ok(variant) = accel.variant_for(filter) {
                println!("  {:<16}  {}", filter.name(), variant.entry_point());
            }
        }
    }
    Ok(())
}

fn print_image(path: &Path) -> Result<()> {
    let format = Format::detect(path).unwrap_or(Format::Unknown);
    let image = super::load_image(path)?;
    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

    println!("{}", path.display());
    println!("  Format:     {}", format.name());
    println!("  Dimensions: {}", image.size());
    println!("  Pixels:     {}", image.pixel_count());
    println!("  File size:  {}", super::format_size(size));
    let opaque = image.pixels().iter().all(|p| p.a == 255);
    println!("  Alpha:      {}", if opaque { "opaque" } else { "varies" });
    Ok(())
}
