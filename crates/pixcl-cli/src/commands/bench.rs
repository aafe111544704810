//! Bench command
//!
//! Runs one filter repeatedly on the configured backend and reports
//! wall-clock statistics. Program build and buffer staging are part of
//! every accelerated run, so they are included in the numbers.

use crate::{BenchArgs, BenchFilter};
use anyhow::{Result, bail};
use pixcl_compute::{Backend, ComputeResult, Processor, ProcessorConfig};
use pixcl_core::Bitmap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Timing summary over all iterations.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Stats {
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
}

impl Stats {
    pub(crate) fn from_samples(samples: &[Duration]) -> Option<Self> {
        let min = *samples.iter().min()?;
        let max = *samples.iter().max()?;
        let total: Duration = samples.iter().sum();
        Some(Self {
            min,
            max,
            mean: total / samples.len() as u32,
        })
    }

    /// Megapixels per second at the mean time.
    pub(crate) fn throughput(&self, pixels: usize) -> f64 {
        let secs = self.mean.as_secs_f64();
        if secs == 0.0 {
            return f64::INFINITY;
        }
        pixels as f64 / secs / 1e6
    }
}

pub fn run(args: BenchArgs, config: &ProcessorConfig) -> Result<()> {
    if args.iterations == 0 {
        bail!("--iterations must be at least 1");
    }
    let image = super::load_image(&args.input)?;

    let proc = super::processor(config)?;
    let stats = measure(&proc, &image, &args)?;
    report(proc.backend_name(), &args, &image, &stats);

    if args.compare && proc.is_accelerated() {
        let cpu = super::processor(&ProcessorConfig {
            backend: Backend::Cpu,
            ..config.clone()
        })?;
        let cpu_stats = measure(&cpu, &image, &args)?;
        report(cpu.backend_name(), &args, &image, &cpu_stats);
        let speedup = cpu_stats.mean.as_secs_f64() / stats.mean.as_secs_f64().max(f64::EPSILON);
        println!("speedup: {speedup:.2}x");
    }
    Ok(())
}

fn measure(proc: &Processor, image: &Bitmap, args: &BenchArgs) -> Result<Stats> {
    let (w, h) = if args.filter.resamples() {
        super::scale::target_size(image.width(), image.height(), None, None, Some(args.ratio))?
    } else {
        (image.width(), image.height())
    };
    let op = |image: &Bitmap| -> ComputeResult<Bitmap> {
        match args.filter {
            BenchFilter::Grayscale => proc.grayscale(image),
            BenchFilter::Sepia => proc.sepia(image),
            BenchFilter::SepiaImage => proc.sepia_image(image),
            BenchFilter::Nearest => proc.scale_nearest(image, w, h),
            BenchFilter::Bilinear => proc.scale_bilinear(image, w, h),
        }
    };

    // warm-up: first run pays for device and thread-pool startup
    op(image)?;

    let mut samples = Vec::with_capacity(args.iterations as usize);
    for i in 0..args.iterations {
        let start = Instant::now();
        op(image)?;
        let elapsed = start.elapsed();
        debug!(iteration = i, ?elapsed);
        samples.push(elapsed);
    }

    match Stats::from_samples(&samples) {
        Some(stats) => Ok(stats),
        None => bail!("no samples"),
    }
}

fn report(backend: &str, args: &BenchArgs, image: &Bitmap, stats: &Stats) {
    println!(
        "{:?} {} on {backend}: {} runs, mean {:.2?}, min {:.2?}, max {:.2?}, {:.1} Mpix/s",
        args.filter,
        image.size(),
        args.iterations,
        stats.mean,
        stats.min,
        stats.max,
        stats.throughput(image.pixel_count()),
    );
}
