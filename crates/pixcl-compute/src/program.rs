//! Per-job program compilation.
//!
//! Nothing is cached: every job compiles its variant, uses the kernel once
//! and drops both objects.

use crate::driver::ComputeDriver;
use crate::environment::ComputeEnvironment;
use crate::variants::{KernelVariant, VectorWidth};
use crate::{ComputeError, ComputeResult};
use std::fmt;
use tracing::{debug, error};

/// Longest build log carried in [`ComputeError::ProgramBuildFailure`].
pub const MAX_BUILD_LOG: usize = 2048;

/// A compiled program and the kernel extracted from it.
pub struct BuiltKernel<D: ComputeDriver> {
    // kernel must be released before its program
    kernel: D::Kernel,
    program: D::Program,
    entry_point: String,
    vector_width: VectorWidth,
}

impl<D: ComputeDriver> BuiltKernel<D> {
    pub fn kernel(&self) -> &D::Kernel {
        &self.kernel
    }

    pub fn kernel_mut(&mut self) -> &mut D::Kernel {
        &mut self.kernel
    }

    pub fn program(&self) -> &D::Program {
        &self.program
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn vector_width(&self) -> VectorWidth {
        self.vector_width
    }
}

impl<D: ComputeDriver> fmt::Debug for BuiltKernel<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltKernel")
            .field("entry_point", &self.entry_point)
            .field("vector_width", &self.vector_width)
            .finish_non_exhaustive()
    }
}

/// Truncates `log` to at most [`MAX_BUILD_LOG`] bytes on a char boundary.
pub fn truncate_log(mut log: String) -> String {
    if log.len() > MAX_BUILD_LOG {
        let mut end = MAX_BUILD_LOG;
        while !log.is_char_boundary(end) {
            end -= 1;
        }
        log.truncate(end);
    }
    log
}

/// Compiles kernel variants for the environment's device.
pub struct ProgramBuilder<'env, D: ComputeDriver> {
    env: &'env ComputeEnvironment<D>,
    options: String,
}

impl<'env, D: ComputeDriver> ProgramBuilder<'env, D> {
    pub fn new(env: &'env ComputeEnvironment<D>) -> Self {
        Self {
            env,
            options: String::new(),
        }
    }

    /// Compiler options passed to the device compiler.
    pub fn options(mut self, options: impl Into<String>) -> Self {
        self.options = options.into();
        self
    }

    /// Compiles `variant` and extracts its entry point.
    pub fn build(&self, variant: &KernelVariant) -> ComputeResult<BuiltKernel<D>> {
        let driver = self.env.driver();
        let context = self.env.context()?;
        let device = self.env.device()?;

        let program = driver
            .build_program(context, device, variant.source(), &self.options)
            .map_err(|e| match e {
                ComputeError::ProgramBuildFailure { log } => {
                    let log = truncate_log(log);
                    error!(entry = variant.entry_point(), "kernel build failed:\n{log}");
                    ComputeError::ProgramBuildFailure { log }
                }
                other => other,
            })?;
        let kernel = driver.create_kernel(&program, variant.entry_point())?;

        debug!(
            entry = variant.entry_point(),
            width = %variant.vector_width(),
            "kernel built"
        );
        Ok(BuiltKernel {
            kernel,
            program,
            entry_point: variant.entry_point().to_string(),
            vector_width: variant.vector_width(),
        })
    }
}
