//! Device, context and command queue for one accelerator.
//!
//! The environment is created uninitialized and brought up with
//! [`ComputeEnvironment::initialize`]. Jobs borrow it immutably; only
//! `initialize` and `teardown` take `&mut self`, so the borrow checker
//! keeps teardown from running while any job resource is alive.

use crate::driver::{ComputeDriver, ScalarType};
use crate::{ComputeError, ComputeResult};
use std::fmt;
use tracing::{debug, info, warn};

/// Capabilities probed after queue creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Preferred native vector width for 32-bit integers, in lanes.
    pub preferred_vector_width_int: u32,
    /// Preferred native vector width for 32-bit floats, in lanes.
    pub preferred_vector_width_float: u32,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            preferred_vector_width_int: 1,
            preferred_vector_width_float: 1,
        }
    }
}

// Fields drop in declaration order: queue, then context.
struct Handles<D: ComputeDriver> {
    queue: D::Queue,
    context: D::Context,
    device: D::Device,
    device_name: String,
    capabilities: Capabilities,
}

/// One accelerator connection: device, context, in-order queue.
pub struct ComputeEnvironment<D: ComputeDriver> {
    driver: D,
    handles: Option<Handles<D>>,
    log_platforms: bool,
}

impl<D: ComputeDriver> ComputeEnvironment<D> {
    /// Creates an uninitialized environment.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            handles: None,
            log_platforms: true,
        }
    }

    /// Enables or disables the `debug` dump of platform properties during
    /// [`initialize`](Self::initialize).
    pub fn set_log_platforms(&mut self, enabled: bool) {
        self.log_platforms = enabled;
    }

    /// Discovers a GPU and creates its context and queue.
    ///
    /// Calling this again while initialized does nothing. On failure every
    /// handle created so far is released and the environment stays
    /// uninitialized, so the call can be retried.
    pub fn initialize(&mut self) -> ComputeResult<()> {
        if self.handles.is_some() {
            debug!("compute environment already initialized");
            return Ok(());
        }

        if self.log_platforms {
            self.dump_platforms();
        }

        let device = self.driver.gpu_device()?;
        let device_name = self.driver.device_name(&device);
        let context = self.driver.create_context(&device)?;
        let queue = match self.driver.create_queue(&context, &device) {
            Ok(queue) => queue,
            Err(e) => {
                drop(context);
                return Err(e);
            }
        };

        let capabilities = Capabilities {
            preferred_vector_width_int: self.probe_width(&device, ScalarType::Int),
            preferred_vector_width_float: self.probe_width(&device, ScalarType::Float),
        };

        info!(
            driver = self.driver.name(),
            device = %device_name,
            int_width = capabilities.preferred_vector_width_int,
            float_width = capabilities.preferred_vector_width_float,
            "compute environment ready"
        );

        self.handles = Some(Handles {
            queue,
            context,
            device,
            device_name,
            capabilities,
        });
        Ok(())
    }

    /// Releases the queue, then the context. No-op when uninitialized.
    pub fn teardown(&mut self) {
        if let Some(handles) = self.handles.take() {
            let Handles {
                queue,
                context,
                device_name,
                ..
            } = handles;
            drop(queue);
            drop(context);
            debug!(device = %device_name, "compute environment released");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.handles.is_some()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn device(&self) -> ComputeResult<&D::Device> {
        self.handles().map(|h| &h.device)
    }

    pub fn context(&self) -> ComputeResult<&D::Context> {
        self.handles().map(|h| &h.context)
    }

    pub fn queue(&self) -> ComputeResult<&D::Queue> {
        self.handles().map(|h| &h.queue)
    }

    pub fn capabilities(&self) -> ComputeResult<Capabilities> {
        self.handles().map(|h| h.capabilities)
    }

    pub fn device_name(&self) -> ComputeResult<&str> {
        self.handles().map(|h| h.device_name.as_str())
    }

    fn handles(&self) -> ComputeResult<&Handles<D>> {
        self.handles.as_ref().ok_or(ComputeError::NotInitialized)
    }

    fn dump_platforms(&self) {
        match self.driver.platforms() {
            Ok(platforms) => {
                for (i, p) in platforms.iter().enumerate() {
                    debug!(
                        index = i,
                        name = %p.name,
                        vendor = %p.vendor,
                        version = %p.version,
                        profile = %p.profile,
                        extensions = %p.extensions,
                        "compute platform"
                    );
                }
            }
            Err(e) => debug!("platform enumeration failed: {e}"),
        }
    }

    fn probe_width(&self, device: &D::Device, scalar: ScalarType) -> u32 {
        match self.driver.preferred_vector_width(device, scalar) {
            Ok(0) => 1,
            Ok(width) => width,
            Err(e) => {
                warn!("{scalar:?} vector width unavailable, assuming scalar: {e}");
                1
            }
        }
    }
}

impl<D: ComputeDriver> Drop for ComputeEnvironment<D> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<D: ComputeDriver> fmt::Debug for ComputeEnvironment<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ComputeEnvironment");
        s.field("driver", &self.driver.name());
        match &self.handles {
            Some(h) => s
                .field("device", &h.device_name)
                .field("capabilities", &h.capabilities),
            None => s.field("initialized", &false),
        };
        s.finish_non_exhaustive()
    }
}
