//! Bitmap-level filter API with accelerator selection and CPU fallback.
//!
//! # Configuration
//!
//! Use [`ProcessorBuilder`] for fine-grained control:
//!
//! ```ignore
//! use pixcl_compute::{Backend, ProcessorBuilder};
//!
//! let proc = ProcessorBuilder::new()
//!     .backend(Backend::OpenCl)
//!     .fallback_to_cpu(false)
//!     .build_options("-cl-fast-relaxed-math")
//!     .build()?;
//! ```
//!
//! # Fallback
//!
//! - `Backend::Cpu` never touches the accelerator.
//! - `Backend::OpenCl` fails construction if the accelerator can't start.
//! - `Backend::Auto` tries the accelerator and runs on the CPU otherwise.
//!
//! Once running, a failed accelerated job is retried on the CPU when
//! [`ProcessorConfig::fallback_to_cpu`] is set.

use crate::accelerator::Accelerator;
use crate::driver::{ComputeDriver, DefaultDriver};
use crate::job::{FilterJob, PixelBuffer, PixelBufferMut};
use crate::variants::FilterKind;
use crate::{ComputeError, ComputeResult};
use pixcl_core::{Bitmap, Rect};
use pixcl_ops::OpsResult;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

// ============================================================================
// Backend
// ============================================================================

/// Where filters run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Backend {
    /// Accelerator when one initializes, CPU otherwise.
    #[default]
    Auto,
    /// CPU reference filters only.
    Cpu,
    /// OpenCL device, required.
    OpenCl,
}

impl Backend {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Cpu => "cpu",
            Self::OpenCl => "opencl",
        }
    }

    /// Check if this backend can run in the current build and machine.
    pub fn is_available(self) -> bool {
        match self {
            Self::Auto | Self::Cpu => true,
            Self::OpenCl => DefaultDriver::default().is_available(),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "opencl" | "cl" | "gpu" => Ok(Self::OpenCl),
            other => Err(ComputeError::BackendNotAvailable(format!(
                "unknown backend '{other}'"
            ))),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Processing configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorConfig {
    /// Requested backend.
    pub backend: Backend,
    /// Rerun failed accelerated jobs on the CPU.
    pub fallback_to_cpu: bool,
    /// Options passed to the kernel compiler.
    pub build_options: String,
    /// Dump platform properties at `debug` level during initialization.
    pub log_platforms: bool,
    /// Kernel vector width override, in lanes. `None` uses the device's
    /// preferred int width.
    pub vector_width: Option<u32>,
    /// Use the rayon CPU filters (feature `parallel`).
    pub parallel: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Auto,
            fallback_to_cpu: true,
            build_options: String::new(),
            log_platforms: true,
            vector_width: None,
            parallel: true,
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`Processor`].
#[derive(Debug, Clone, Default)]
pub struct ProcessorBuilder {
    config: ProcessorConfig,
}

impl ProcessorBuilder {
    /// Create new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn fallback_to_cpu(mut self, enabled: bool) -> Self {
        self.config.fallback_to_cpu = enabled;
        self
    }

    pub fn build_options(mut self, options: impl Into<String>) -> Self {
        self.config.build_options = options.into();
        self
    }

    pub fn log_platforms(mut self, enabled: bool) -> Self {
        self.config.log_platforms = enabled;
        self
    }

    pub fn vector_width(mut self, lanes: Option<u32>) -> Self {
        self.config.vector_width = lanes;
        self
    }

    /// Row-parallel CPU filters. Ignored without the `parallel` feature.
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.config.parallel = enabled;
        self
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Build with the default driver for this build.
    pub fn build(self) -> ComputeResult<Processor> {
        Processor::new(DefaultDriver::default(), self.config)
    }

    /// Build on a specific driver.
    pub fn build_with<D: ComputeDriver>(self, driver: D) -> ComputeResult<Processor<D>> {
        Processor::new(driver, self.config)
    }
}

// ============================================================================
// Processor
// ============================================================================

/// Filter front end.
///
/// # Example
/// ```ignore
/// use pixcl_compute::Processor;
///
/// let proc = Processor::auto()?;
/// let sepia = proc.sepia(&bitmap)?;
/// let thumb = proc.scale_bilinear(&sepia, 128, 128)?;
/// ```
#[derive(Debug)]
pub struct Processor<D: ComputeDriver = DefaultDriver> {
    accel: Option<Accelerator<D>>,
    config: ProcessorConfig,
}

impl Processor {
    /// Accelerator if available, CPU otherwise.
    pub fn auto() -> ComputeResult<Self> {
        Self::with_config(ProcessorConfig::default())
    }

    /// CPU reference filters only.
    pub fn cpu() -> ComputeResult<Self> {
        Self::with_config(ProcessorConfig {
            backend: Backend::Cpu,
            ..ProcessorConfig::default()
        })
    }

    pub fn with_config(config: ProcessorConfig) -> ComputeResult<Self> {
        Self::new(DefaultDriver::default(), config)
    }

    pub fn builder() -> ProcessorBuilder {
        ProcessorBuilder::new()
    }
}

impl<D: ComputeDriver> Processor<D> {
    /// Creates a processor on `driver`, initializing the accelerator as
    /// `config.backend` requires.
    pub fn new(driver: D, config: ProcessorConfig) -> ComputeResult<Self> {
        let accel = match config.backend {
            Backend::Cpu => None,
            Backend::OpenCl => Some(Self::start(driver, &config)?),
            Backend::Auto => match Self::start(driver, &config) {
                Ok(accel) => Some(accel),
                Err(e) => {
                    warn!("accelerator unavailable, using CPU: {e}");
                    None
                }
            },
        };

        let proc = Self { accel, config };
        info!(backend = proc.backend_name(), "processor ready");
        Ok(proc)
    }

    fn start(driver: D, config: &ProcessorConfig) -> ComputeResult<Accelerator<D>> {
        let mut accel = Accelerator::new(driver)
            .build_options(config.build_options.as_str())
            .log_platforms(config.log_platforms)
            .force_width(config.vector_width);
        accel.initialize()?;
        Ok(accel)
    }

    // =========================================================================
    // Info
    // =========================================================================

    /// "opencl" when filters run on the accelerator, "cpu" otherwise.
    pub fn backend_name(&self) -> &'static str {
        if self.accel.is_some() {
            Backend::OpenCl.name()
        } else {
            Backend::Cpu.name()
        }
    }

    pub fn is_accelerated(&self) -> bool {
        self.accel.is_some()
    }

    pub fn accelerator(&self) -> Option<&Accelerator<D>> {
        self.accel.as_ref()
    }

    /// Accelerator device name, if one is in use.
    pub fn device_name(&self) -> Option<&str> {
        self.accel
            .as_ref()
            .and_then(|a| a.environment().device_name().ok())
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    // =========================================================================
    // Filters
    // =========================================================================

    pub fn grayscale(&self, input: &Bitmap) -> ComputeResult<Bitmap> {
        self.filter(FilterKind::Grayscale, input, input.width(), input.height())
    }

    pub fn sepia(&self, input: &Bitmap) -> ComputeResult<Bitmap> {
        self.filter(FilterKind::Sepia, input, input.width(), input.height())
    }

    /// Sepia through the image-object kernel; same result as [`Self::sepia`].
    pub fn sepia_image(&self, input: &Bitmap) -> ComputeResult<Bitmap> {
        self.filter(FilterKind::SepiaImage, input, input.width(), input.height())
    }

    /// Nearest-neighbor resample to `width` x `height`.
    pub fn scale_nearest(&self, input: &Bitmap, width: u32, height: u32) -> ComputeResult<Bitmap> {
        self.filter(FilterKind::ScaleNearest, input, width, height)
    }

    /// Bilinear resample to `width` x `height`. CPU only.
    pub fn scale_bilinear(&self, input: &Bitmap, width: u32, height: u32) -> ComputeResult<Bitmap> {
        let mut output = Bitmap::new(width, height)?;
        cpu_bilinear(self.config.parallel, input, &mut output)?;
        Ok(output)
    }

    /// Copies `rect` out of `input`. CPU only.
    pub fn crop(&self, input: &Bitmap, rect: Rect) -> ComputeResult<Bitmap> {
        Ok(pixcl_ops::cropped(input, rect)?)
    }

    fn filter(
        &self,
        filter: FilterKind,
        input: &Bitmap,
        width: u32,
        height: u32,
    ) -> ComputeResult<Bitmap> {
        let mut output = Bitmap::new(width, height)?;

        if let Some(accel) = &self.accel {
            let result = FilterJob::new(
                filter,
                PixelBuffer::from_bitmap(input),
                PixelBufferMut::from_bitmap(&mut output),
            )
            .and_then(|job| accel.run(job));

            match result {
                Ok(geometry) => {
                    debug!(%filter, ?geometry, "accelerated");
                    return Ok(output);
                }
                Err(e) if self.config.fallback_to_cpu => {
                    warn!(%filter, "accelerated job failed, running on CPU: {e}");
                }
                Err(e) => return Err(e),
            }
        }

        cpu_filter(self.config.parallel, filter, input, &mut output)?;
        Ok(output)
    }
}

fn sequential_filter(filter: FilterKind, input: &Bitmap, output: &mut Bitmap) -> OpsResult<()> {
    match filter {
        FilterKind::Grayscale => pixcl_ops::grayscale(input, output),
        FilterKind::Sepia | FilterKind::SepiaImage => pixcl_ops::sepia(input, output),
        FilterKind::ScaleNearest => pixcl_ops::scale_nearest(input, output),
    }
}

#[cfg(feature = "parallel")]
fn cpu_filter(
    parallel: bool,
    filter: FilterKind,
    input: &Bitmap,
    output: &mut Bitmap,
) -> OpsResult<()> {
    use pixcl_ops::parallel as par;

    if !parallel {
        return sequential_filter(filter, input, output);
    }
    match filter {
        FilterKind::Grayscale => par::grayscale(input, output),
        FilterKind::Sepia | FilterKind::SepiaImage => par::sepia(input, output),
        FilterKind::ScaleNearest => par::scale_nearest(input, output),
    }
}

#[cfg(not(feature = "parallel"))]
fn cpu_filter(
    _parallel: bool,
    filter: FilterKind,
    input: &Bitmap,
    output: &mut Bitmap,
) -> OpsResult<()> {
    sequential_filter(filter, input, output)
}

#[cfg(feature = "parallel")]
fn cpu_bilinear(parallel: bool, input: &Bitmap, output: &mut Bitmap) -> OpsResult<()> {
    if parallel {
        pixcl_ops::parallel::scale_bilinear(input, output)
    } else {
        pixcl_ops::scale_bilinear(input, output)
    }
}

#[cfg(not(feature = "parallel"))]
fn cpu_bilinear(_parallel: bool, input: &Bitmap, output: &mut Bitmap) -> OpsResult<()> {
    pixcl_ops::scale_bilinear(input, output)
}
