//! pixcl - image filters on an OpenCL device, with CPU fallback
//!
//! Loads PNG/JPEG/TGA, runs grayscale, sepia, scale or crop, writes the
//! result.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pixcl_compute::{Backend, ProcessorConfig};
use pixcl_core::Colorspace;
use pixcl_io::Format;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

mod commands;

#[derive(Parser)]
#[command(name = "pixcl")]
#[command(author, version, about = "Image filters on the GPU via OpenCL, with CPU fallback")]
#[command(long_about = "
Runs simple image filters on the first OpenCL GPU, falling back to
multi-threaded CPU code when no device is usable.

Examples:
  pixcl info                                   # Backends and platforms
  pixcl info photo.jpg                         # Image details
  pixcl grayscale photo.jpg -o gray.png
  pixcl sepia photo.png -o old.jpg --colorspace rgb
  pixcl scale photo.png -o half.png --ratio 0.5
  pixcl scale photo.png -o thumb.tga -w 256 --filter bilinear
  pixcl crop photo.png -o face.png -x 120 -y 40 -w 200 -H 240
  pixcl --backend cpu bench photo.png --filter sepia -n 50
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Number of CPU threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Compute backend
    #[arg(long, global = true, value_enum, default_value = "auto")]
    backend: BackendArg,

    /// Fail instead of rerunning a failed GPU job on the CPU
    #[arg(long, global = true)]
    no_fallback: bool,

    /// Extra options for the OpenCL compiler
    #[arg(long, global = true, default_value = "")]
    build_options: String,

    /// Kernel vector width in lanes (default: device preference)
    #[arg(long, global = true)]
    vector_width: Option<u32>,
}

impl Cli {
    fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig {
            backend: self.backend.into(),
            fallback_to_cpu: !self.no_fallback,
            build_options: self.build_options.clone(),
            vector_width: self.vector_width,
            ..ProcessorConfig::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show backends, platforms and image details
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Convert to grayscale (Rec.709 luma)
    #[command(visible_alias = "gray")]
    Grayscale(FilterArgs),

    /// Apply a sepia tone
    Sepia(FilterArgs),

    /// Resize with nearest-neighbor or bilinear sampling
    #[command(visible_alias = "resize")]
    Scale(ScaleArgs),

    /// Cut out a rectangle
    Crop(CropArgs),

    /// Time a filter over repeated runs
    Bench(BenchArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendArg {
    Auto,
    Cpu,
    Opencl,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Auto => Backend::Auto,
            BackendArg::Cpu => Backend::Cpu,
            BackendArg::Opencl => Backend::OpenCl,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Png,
    #[value(alias = "jpg")]
    Jpeg,
    Tga,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => Format::Png,
            FormatArg::Jpeg => Format::Jpeg,
            FormatArg::Tga => Format::Tga,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ColorspaceArg {
    Rgb,
    Rgba,
}

impl From<ColorspaceArg> for Colorspace {
    fn from(arg: ColorspaceArg) -> Self {
        match arg {
            ColorspaceArg::Rgb => Colorspace::Rgb,
            ColorspaceArg::Rgba => Colorspace::Rgba,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ScaleFilter {
    Nearest,
    #[value(alias = "linear")]
    Bilinear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum BenchFilter {
    Grayscale,
    Sepia,
    /// Sepia through image objects
    SepiaImage,
    Nearest,
    Bilinear,
}

impl BenchFilter {
    /// Whether the filter uses `--ratio`.
    fn resamples(self) -> bool {
        matches!(self, Self::Nearest | Self::Bilinear)
    }
}

/// Where and how to write the result.
#[derive(Args)]
struct OutputArgs {
    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Output format (default: from the extension)
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Output colorspace (default: rgb for JPEG, rgba otherwise)
    #[arg(long, value_enum)]
    colorspace: Option<ColorspaceArg>,
}

#[derive(Args)]
struct InfoArgs {
    /// Images to describe
    input: Vec<PathBuf>,
}

#[derive(Args)]
struct FilterArgs {
    /// Input image
    input: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct ScaleArgs {
    /// Input image
    input: PathBuf,

    #[command(flatten)]
    output: OutputArgs,

    /// Target width (height follows the aspect ratio if omitted)
    #[arg(short, long)]
    width: Option<u32>,

    /// Target height (width follows the aspect ratio if omitted)
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Uniform scale factor, e.g. 0.5
    #[arg(short, long, conflicts_with_all = ["width", "height"])]
    ratio: Option<f32>,

    /// Sampling filter
    #[arg(short, long, value_enum, default_value = "nearest")]
    filter: ScaleFilter,
}

#[derive(Args)]
struct CropArgs {
    /// Input image
    input: PathBuf,

    #[command(flatten)]
    output: OutputArgs,

    /// Left edge
    #[arg(short, long)]
    x: u32,

    /// Top edge
    #[arg(short, long)]
    y: u32,

    /// Crop width
    #[arg(short, long)]
    w: u32,

    /// Crop height
    #[arg(short = 'H', long)]
    h: u32,
}

#[derive(Args)]
struct BenchArgs {
    /// Input image
    input: PathBuf,

    /// Filter to time
    #[arg(short, long, value_enum, default_value = "grayscale")]
    filter: BenchFilter,

    /// Timed iterations
    #[arg(short = 'n', long, default_value = "10")]
    iterations: u32,

    /// Scale factor for nearest and bilinear; ignored by the others
    #[arg(short, long, default_value = "0.5")]
    ratio: f32,

    /// Also time the CPU path and report the speedup
    #[arg(long)]
    compare: bool,
}

/// Installs the stderr subscriber, plus a file writer with `--log`.
///
/// The returned guard flushes the file writer when dropped.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = || {
        EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy()
    };

    let stderr_layer = fmt::layer()
        .compact()
        .without_time()
        .with_writer(std::io::stderr)
        .with_filter(filter());

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            let name = path
                .file_name()
                .with_context(|| format!("Invalid log path: {}", path.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install log subscriber")?;
    Ok(guard)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log.as_deref())?;

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let config = cli.processor_config();
    match cli.command {
        Commands::Info(args) => commands::info::run(args, &config),
        Commands::Grayscale(args) => commands::filter::grayscale(args, &config),
        Commands::Sepia(args) => commands::filter::sepia(args, &config),
        Commands::Scale(args) => commands::scale::run(args, &config),
        Commands::Crop(args) => commands::crop::run(args, &config),
        Commands::Bench(args) => commands::bench::run(args, &config),
    }
}
