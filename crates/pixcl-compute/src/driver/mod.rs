//! Accelerator API abstraction.
//!
//! [`ComputeDriver`] is the seam between the dispatch layer and the device
//! runtime. Every handle is an associated type that releases its device
//! object when dropped, so resource lifetime follows Rust scopes.
//!
//! ```text
//! ComputeDriver
//!     +-- OpenClDriver (feature "opencl", opencl3)
//!     +-- NoDriver     (discovery always fails, CPU-only builds)
//! ```

#[cfg(feature = "opencl")]
mod opencl;

#[cfg(feature = "opencl")]
pub use opencl::OpenClDriver;

use crate::{ComputeError, ComputeResult};
use std::convert::Infallible;

/// Driver used by [`crate::Processor::auto`].
#[cfg(feature = "opencl")]
pub type DefaultDriver = OpenClDriver;

/// Driver used by [`crate::Processor::auto`].
#[cfg(not(feature = "opencl"))]
pub type DefaultDriver = NoDriver;

/// Properties of one compute platform, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformInfo {
    pub name: String,
    pub vendor: String,
    pub version: String,
    pub profile: String,
    pub extensions: String,
}

/// Primitive type for capability queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    /// 32-bit integer
    Int,
    /// 32-bit float
    Float,
}

/// Device-side access mode of a memory object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemAccess {
    ReadOnly,
    WriteOnly,
}

/// One positional kernel argument.
#[derive(Debug)]
pub enum KernelArg<'a, B> {
    /// Buffer or image object.
    Mem(&'a B),
    /// `uint` scalar.
    U32(u32),
}

impl<B> Clone for KernelArg<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B> Copy for KernelArg<'_, B> {}

/// Device runtime operations used by the dispatch layer.
///
/// Methods report failures with the matching [`ComputeError`] variant
/// (e.g. `create_queue` returns `QueueCreationFailure`), so callers can
/// propagate with `?` without remapping.
pub trait ComputeDriver {
    /// Device identifier. Not independently released.
    type Device;
    /// Context bound to one device.
    type Context;
    /// In-order command queue.
    type Queue;
    /// Compiled program.
    type Program;
    /// Kernel extracted from a program.
    type Kernel;
    /// Buffer or 2D image object.
    type Buffer;

    /// Short runtime name, e.g. "opencl".
    fn name(&self) -> &'static str;

    /// Enumerates platforms for logging. An empty list is not an error.
    fn platforms(&self) -> ComputeResult<Vec<PlatformInfo>>;

    /// Selects the first GPU-class device.
    fn gpu_device(&self) -> ComputeResult<Self::Device>;

    /// Human-readable device name.
    fn device_name(&self, device: &Self::Device) -> String;

    fn create_context(&self, device: &Self::Device) -> ComputeResult<Self::Context>;

    fn create_queue(
        &self,
        context: &Self::Context,
        device: &Self::Device,
    ) -> ComputeResult<Self::Queue>;

    /// Preferred native vector width for `scalar`, in lanes.
    fn preferred_vector_width(&self, device: &Self::Device, scalar: ScalarType)
    -> ComputeResult<u32>;

    /// Compiles `source`. On failure returns `ProgramBuildFailure` carrying
    /// the device build log.
    fn build_program(
        &self,
        context: &Self::Context,
        device: &Self::Device,
        source: &str,
        options: &str,
    ) -> ComputeResult<Self::Program>;

    fn create_kernel(&self, program: &Self::Program, entry_point: &str)
    -> ComputeResult<Self::Kernel>;

    /// Allocates a linear buffer of `size` bytes.
    fn create_buffer(
        &self,
        context: &Self::Context,
        access: MemAccess,
        size: usize,
    ) -> ComputeResult<Self::Buffer>;

    /// Allocates an RGBA8 2D image.
    fn create_image(
        &self,
        context: &Self::Context,
        access: MemAccess,
        width: usize,
        height: usize,
    ) -> ComputeResult<Self::Buffer>;

    /// Blocking host-to-device copy of the whole object.
    fn write(&self, queue: &Self::Queue, buffer: &mut Self::Buffer, data: &[u8])
    -> ComputeResult<()>;

    /// Blocking device-to-host copy of the whole object.
    fn read(&self, queue: &Self::Queue, buffer: &Self::Buffer, out: &mut [u8])
    -> ComputeResult<()>;

    fn set_arg(
        &self,
        kernel: &mut Self::Kernel,
        index: u32,
        arg: KernelArg<'_, Self::Buffer>,
    ) -> ComputeResult<()>;

    /// Maximum work-group size of `kernel` on `device`.
    fn work_group_size(&self, kernel: &Self::Kernel, device: &Self::Device)
    -> ComputeResult<usize>;

    /// Enqueues an ND-range launch. `global` and `local` have equal length.
    fn enqueue(
        &self,
        queue: &Self::Queue,
        kernel: &Self::Kernel,
        global: &[usize],
        local: &[usize],
    ) -> ComputeResult<()>;

    /// Blocks until every command on `queue` has completed.
    fn finish(&self, queue: &Self::Queue) -> ComputeResult<()>;

    /// `true` if a GPU device can be found.
    fn is_available(&self) -> bool {
        self.gpu_device().is_ok()
    }
}

/// Driver for builds without an accelerator runtime.
///
/// Discovery always fails, and since no device can exist every other
/// method is unreachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDriver;

impl ComputeDriver for NoDriver {
    type Device = Infallible;
    type Context = Infallible;
    type Queue = Infallible;
    type Program = Infallible;
    type Kernel = Infallible;
    type Buffer = Infallible;

    fn name(&self) -> &'static str {
        "none"
    }

    fn platforms(&self) -> ComputeResult<Vec<PlatformInfo>> {
        Ok(Vec::new())
    }

    fn gpu_device(&self) -> ComputeResult<Infallible> {
        Err(ComputeError::DeviceDiscoveryFailure(
            "built without an accelerator backend (enable the `opencl` feature)".into(),
        ))
    }

    fn device_name(&self, device: &Infallible) -> String {
        match *device {}
    }

    fn create_context(&self, device: &Infallible) -> ComputeResult<Infallible> {
        match *device {}
    }

    fn create_queue(&self, context: &Infallible, _: &Infallible) -> ComputeResult<Infallible> {
        match *context {}
    }

    fn preferred_vector_width(&self, device: &Infallible, _: ScalarType) -> ComputeResult<u32> {
        match *device {}
    }

    fn build_program(
        &self,
        context: &Infallible,
        _: &Infallible,
        _: &str,
        _: &str,
    ) -> ComputeResult<Infallible> {
        match *context {}
    }

    fn create_kernel(&self, program: &Infallible, _: &str) -> ComputeResult<Infallible> {
        match *program {}
    }

    fn create_buffer(
        &self,
        context: &Infallible,
        _: MemAccess,
        _: usize,
    ) -> ComputeResult<Infallible> {
        match *context {}
    }

    fn create_image(
        &self,
        context: &Infallible,
        _: MemAccess,
        _: usize,
        _: usize,
    ) -> ComputeResult<Infallible> {
        match *context {}
    }

    fn write(&self, queue: &Infallible, _: &mut Infallible, _: &[u8]) -> ComputeResult<()> {
        match *queue {}
    }

    fn read(&self, queue: &Infallible, _: &Infallible, _: &mut [u8]) -> ComputeResult<()> {
        match *queue {}
    }

    fn set_arg(
        &self,
        kernel: &mut Infallible,
        _: u32,
        _: KernelArg<'_, Infallible>,
    ) -> ComputeResult<()> {
        match *kernel {}
    }

    fn work_group_size(&self, kernel: &Infallible, _: &Infallible) -> ComputeResult<usize> {
        match *kernel {}
    }

    fn enqueue(
        &self,
        queue: &Infallible,
        _: &Infallible,
        _: &[usize],
        _: &[usize],
    ) -> ComputeResult<()> {
        match *queue {}
    }

    fn finish(&self, queue: &Infallible) -> ComputeResult<()> {
        match *queue {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_driver_never_finds_a_device() {
        let driver = NoDriver;
        assert!(!driver.is_available());
        assert!(matches!(
            driver.gpu_device(),
            Err(ComputeError::DeviceDiscoveryFailure(_))
        ));
        assert!(driver.platforms().unwrap().is_empty());
    }
}
