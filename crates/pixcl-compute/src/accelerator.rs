//! Job orchestration on one compute environment.
//!
//! A job runs validate -> select -> build -> stage -> dispatch -> download.
//! Program, kernel and buffers are locals of [`Accelerator::run`], so any
//! early return releases them before the error reaches the caller.

use crate::dispatch::{DispatchEngine, LaunchGeometry, WorkSize};
use crate::driver::{ComputeDriver, KernelArg, MemAccess};
use crate::environment::ComputeEnvironment;
use crate::job::{FilterJob, JobParams, PixelBuffer, PixelBufferMut};
use crate::program::ProgramBuilder;
use crate::staging::{BufferLayout, BufferStager};
use crate::variants::{FilterKind, KernelVariant, KernelVariantTable};
use crate::{ComputeError, ComputeResult};
use tracing::debug;

/// Runs accelerated filters. Owns the environment and the variant table.
#[derive(Debug)]
pub struct Accelerator<D: ComputeDriver> {
    env: ComputeEnvironment<D>,
    table: KernelVariantTable,
    build_options: String,
    forced_width: Option<u32>,
}

impl<D: ComputeDriver> Accelerator<D> {
    /// Uninitialized accelerator with the built-in kernels.
    pub fn new(driver: D) -> Self {
        Self::with_table(driver, KernelVariantTable::builtin())
    }

    pub fn with_table(driver: D, table: KernelVariantTable) -> Self {
        Self {
            env: ComputeEnvironment::new(driver),
            table,
            build_options: String::new(),
            forced_width: None,
        }
    }

    /// Options handed to the device compiler for every job.
    pub fn build_options(mut self, options: impl Into<String>) -> Self {
        self.build_options = options.into();
        self
    }

    /// Selects variants for `lanes` instead of the device's preferred int
    /// width. `None` restores the device preference.
    pub fn force_width(mut self, lanes: Option<u32>) -> Self {
        self.forced_width = lanes;
        self
    }

    pub fn log_platforms(mut self, enabled: bool) -> Self {
        self.env.set_log_platforms(enabled);
        self
    }

    pub fn initialize(&mut self) -> ComputeResult<()> {
        self.env.initialize()
    }

    pub fn teardown(&mut self) {
        self.env.teardown();
    }

    pub fn environment(&self) -> &ComputeEnvironment<D> {
        &self.env
    }

    pub fn table(&self) -> &KernelVariantTable {
        &self.table
    }

    /// Variant a job for `filter` would run with on this device.
    pub fn variant_for(&self, filter: FilterKind) -> ComputeResult<&KernelVariant> {
        let caps = self.env.capabilities()?;
        let lanes = self.forced_width.unwrap_or(caps.preferred_vector_width_int);
        self.table
            .select(filter, lanes)
            .ok_or_else(|| {
                ComputeError::KernelCreationFailure(format!("no kernel variant for {filter}"))
            })
    }

    pub fn grayscale(
        &self,
        input: PixelBuffer<'_>,
        output: PixelBufferMut<'_>,
    ) -> ComputeResult<LaunchGeometry> {
        self.run(FilterJob::new(FilterKind::Grayscale, input, output)?)
    }

    pub fn sepia(
        &self,
        input: PixelBuffer<'_>,
        output: PixelBufferMut<'_>,
    ) -> ComputeResult<LaunchGeometry> {
        self.run(FilterJob::new(FilterKind::Sepia, input, output)?)
    }

    /// Sepia through image objects: a 2D launch, one work item per pixel.
    pub fn sepia_image(
        &self,
        input: PixelBuffer<'_>,
        output: PixelBufferMut<'_>,
    ) -> ComputeResult<LaunchGeometry> {
        self.run(FilterJob::new(FilterKind::SepiaImage, input, output)?)
    }

    /// Nearest-neighbor resample; the output size is the target size.
    pub fn scale_nearest(
        &self,
        input: PixelBuffer<'_>,
        output: PixelBufferMut<'_>,
    ) -> ComputeResult<LaunchGeometry> {
        self.run(FilterJob::new(FilterKind::ScaleNearest, input, output)?)
    }

    /// Executes a validated job and writes the result into its output.
    pub fn run(&self, mut job: FilterJob<'_>) -> ComputeResult<LaunchGeometry> {
        let variant = self.variant_for(job.filter())?;
        debug!(
            filter = %job.filter(),
            entry = variant.entry_point(),
            width = job.input().width(),
            height = job.input().height(),
            "running job"
        );

        let mut kernel = ProgramBuilder::new(&self.env)
            .options(self.build_options.as_str())
            .build(variant)?;

        let stager = BufferStager::new(&self.env);
        let input = *job.input();
        let (out_w, out_h) = (job.output().width(), job.output().height());
        let (mut src, dst) = match variant.layout() {
            BufferLayout::Packed => (
                stager.allocate(input.bytes().len(), MemAccess::ReadOnly)?,
                stager.allocate(job.output().bytes().len(), MemAccess::WriteOnly)?,
            ),
            BufferLayout::Image2d => (
                stager.allocate_image(input.width(), input.height(), MemAccess::ReadOnly)?,
                stager.allocate_image(out_w, out_h, MemAccess::WriteOnly)?,
            ),
        };
        stager.upload(&mut src, input.bytes())?;

        let engine = DispatchEngine::new(&self.env);
        let geometry = match (variant.layout(), job.params()) {
            (BufferLayout::Packed, _) => {
                let count = input.pixel_count();
                let count_arg = u32::try_from(count).map_err(|_| {
                    ComputeError::DimensionMismatch(format!("{count} pixels exceed a uint count"))
                })?;
                let lanes = variant.vector_width().lanes() as usize;
                engine.run(
                    &mut kernel,
                    &[
                        KernelArg::Mem(src.handle()),
                        KernelArg::Mem(dst.handle()),
                        KernelArg::U32(count_arg),
                    ],
                    WorkSize::Linear(count.div_ceil(lanes)),
                )?
            }
            (BufferLayout::Image2d, params) => {
                let mut args = vec![
                    KernelArg::Mem(src.handle()),
                    KernelArg::Mem(dst.handle()),
                    KernelArg::U32(out_w),
                    KernelArg::U32(out_h),
                ];
                if let JobParams::SourceSize { width, height } = params {
                    args.extend([KernelArg::U32(width), KernelArg::U32(height)]);
                }
                engine.run(
                    &mut kernel,
                    &args,
                    WorkSize::Grid {
                        width: out_w as usize,
                        height: out_h as usize,
                    },
                )?
            }
        };

        stager.download(&dst, job.output_mut().bytes_mut())?;
        Ok(geometry)
    }
}
