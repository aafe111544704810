//! Kernel argument binding, launch sizing and synchronous execution.
//!
//! The launch size is padded up to a multiple of the kernel's work-group
//! size, so every kernel bound-checks against the real item count.

use crate::driver::{ComputeDriver, KernelArg};
use crate::environment::ComputeEnvironment;
use crate::program::BuiltKernel;
use crate::{ComputeError, ComputeResult};
use tracing::trace;

/// Amount of work for one launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkSize {
    /// 1D launch over `n` work items.
    Linear(usize),
    /// 2D launch over a `width` x `height` grid.
    Grid { width: usize, height: usize },
}

impl WorkSize {
    /// Total work items before padding.
    pub fn items(&self) -> usize {
        match *self {
            Self::Linear(n) => n,
            Self::Grid { width, height } => width * height,
        }
    }
}

/// Sizes actually passed to the device for a launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LaunchGeometry {
    /// Dimensions used (1 or 2). 0 for an empty launch.
    pub dims: u32,
    pub global: [usize; 2],
    pub local: [usize; 2],
}

/// Smallest multiple of `local` that is `>= items`.
///
/// ```rust
/// use pixcl_compute::padded_global_size;
///
/// assert_eq!(padded_global_size(1000, 256).unwrap(), 1024);
/// assert_eq!(padded_global_size(1024, 256).unwrap(), 1024);
/// assert!(padded_global_size(10, 0).is_err());
/// ```
pub fn padded_global_size(items: usize, local: usize) -> ComputeResult<usize> {
    if local == 0 {
        return Err(ComputeError::WorkGroupQueryFailure(
            "device reported a work-group size of 0".into(),
        ));
    }
    items
        .div_ceil(local)
        .checked_mul(local)
        .ok_or_else(|| ComputeError::ExecutionFailure(format!("{items} work items overflow")))
}

/// Runs built kernels on the environment's queue.
pub struct DispatchEngine<'env, D: ComputeDriver> {
    env: &'env ComputeEnvironment<D>,
}

impl<'env, D: ComputeDriver> DispatchEngine<'env, D> {
    pub fn new(env: &'env ComputeEnvironment<D>) -> Self {
        Self { env }
    }

    /// Binds `args` in order, sizes the launch, enqueues it and blocks
    /// until the queue drains.
    ///
    /// An empty `work` is a no-op.
    pub fn run(
        &self,
        kernel: &mut BuiltKernel<D>,
        args: &[KernelArg<'_, D::Buffer>],
        work: WorkSize,
    ) -> ComputeResult<LaunchGeometry> {
        if work.items() == 0 {
            return Ok(LaunchGeometry::default());
        }

        let driver = self.env.driver();
        let queue = self.env.queue()?;
        let device = self.env.device()?;

        for (index, arg) in args.iter().enumerate() {
            driver.set_arg(kernel.kernel_mut(), index as u32, *arg)?;
        }

        let max_local = driver.work_group_size(kernel.kernel(), device)?;
        let geometry = match work {
            WorkSize::Linear(n) => LaunchGeometry {
                dims: 1,
                global: [padded_global_size(n, max_local)?, 1],
                local: [max_local, 1],
            },
            WorkSize::Grid { width, height } => LaunchGeometry {
                dims: 2,
                global: [padded_global_size(width, max_local)?, height],
                local: [max_local, 1],
            },
        };

        let dims = geometry.dims as usize;
        trace!(
            entry = kernel.entry_point(),
            global = ?&geometry.global[..dims],
            local = ?&geometry.local[..dims],
            "enqueue"
        );
        driver.enqueue(
            queue,
            kernel.kernel(),
            &geometry.global[..dims],
            &geometry.local[..dims],
        )?;
        driver.finish(queue)?;

        Ok(geometry)
    }
}
