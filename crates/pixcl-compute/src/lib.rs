//! Accelerator dispatch layer for pixcl filters.
//!
//! Runs per-pixel filters on an OpenCL device, picking a kernel variant
//! whose vector width matches what the device prefers, and falls back to
//! the CPU filters in `pixcl-ops` when no device is usable.
//!
//! # Architecture
//!
//! ```text
//! Processor (Bitmap API, CPU fallback)
//!     +-- Accelerator<D: ComputeDriver>   one job at a time
//!             +-- ComputeEnvironment      device / context / queue
//!             +-- KernelVariantTable      filter x width -> source
//!             +-- ProgramBuilder          program + kernel per job
//!             +-- BufferStager            device buffers per job
//!             +-- DispatchEngine          args, work-group sizing, finish
//! ```
//!
//! Every device object is owned by a driver handle that releases it on
//! drop, so a job that fails half-way leaves nothing behind.
//!
//! # Example
//!
//! ```ignore
//! use pixcl_compute::Processor;
//!
//! let proc = Processor::auto()?;
//! let gray = proc.grayscale(&bitmap)?;
//! println!("ran on {}", proc.backend_name());
//! ```
//!
//! # Feature Flags
//!
//! - `opencl` - real OpenCL driver via `opencl3`. Without it only the CPU
//!   path is available.
//! - `parallel` (default) - rayon row-parallel CPU path.

pub mod accelerator;
pub mod detect;
pub mod dispatch;
pub mod driver;
pub mod environment;
pub mod job;
mod kernels;
pub mod processor;
pub mod program;
pub mod staging;
pub mod variants;

pub use accelerator::Accelerator;
pub use detect::{BackendInfo, describe_backends, detect_backends, detect_with};
pub use dispatch::{DispatchEngine, LaunchGeometry, WorkSize, padded_global_size};
pub use driver::{
    ComputeDriver, DefaultDriver, KernelArg, MemAccess, NoDriver, PlatformInfo, ScalarType,
};
#[cfg(feature = "opencl")]
pub use driver::OpenClDriver;
pub use environment::{Capabilities, ComputeEnvironment};
pub use job::{FilterJob, JobParams, PixelBuffer, PixelBufferMut};
pub use processor::{Backend, Processor, ProcessorBuilder, ProcessorConfig};
pub use program::{BuiltKernel, MAX_BUILD_LOG, ProgramBuilder};
pub use staging::{BufferLayout, BufferStager, DeviceBuffer};
pub use variants::{FilterKind, KernelVariant, KernelVariantTable, VectorWidth};

use thiserror::Error;

/// Errors from the dispatch layer.
///
/// Discovery, context and queue failures invalidate the whole environment;
/// everything else is scoped to the job that raised it.
#[derive(Error, Debug)]
pub enum ComputeError {
    #[error("device discovery failed: {0}")]
    DeviceDiscoveryFailure(String),

    #[error("context creation failed: {0}")]
    ContextCreationFailure(String),

    #[error("command queue creation failed: {0}")]
    QueueCreationFailure(String),

    #[error("program build failed:\n{log}")]
    ProgramBuildFailure { log: String },

    #[error("kernel creation failed: {0}")]
    KernelCreationFailure(String),

    #[error("buffer allocation failed: {0}")]
    BufferAllocationFailure(String),

    #[error("upload failed: {0}")]
    UploadFailure(String),

    #[error("kernel argument binding failed: {0}")]
    ArgumentBindingFailure(String),

    #[error("work-group size query failed: {0}")]
    WorkGroupQueryFailure(String),

    #[error("kernel execution failed: {0}")]
    ExecutionFailure(String),

    #[error("readback failed: {0}")]
    ReadbackFailure(String),

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("null input: {0}")]
    NullInput(String),

    #[error("compute environment is not initialized")]
    NotInitialized,

    #[error("backend not available: {0}")]
    BackendNotAvailable(String),

    #[error(transparent)]
    Ops(#[from] pixcl_ops::OpsError),

    #[error(transparent)]
    Core(#[from] pixcl_core::Error),
}

impl ComputeError {
    /// `true` for failures that leave no usable environment behind.
    pub fn is_environment_failure(&self) -> bool {
        matches!(
            self,
            Self::DeviceDiscoveryFailure(_)
                | Self::ContextCreationFailure(_)
                | Self::QueueCreationFailure(_)
        )
    }
}

pub type ComputeResult<T> = Result<T, ComputeError>;
