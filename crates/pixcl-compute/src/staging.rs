//! Device buffers for a single job.
//!
//! Buffers are sized to the exact pixel payload and copied synchronously.
//! A [`DeviceBuffer`] releases its device memory when dropped.

use crate::driver::{ComputeDriver, MemAccess};
use crate::environment::ComputeEnvironment;
use crate::{ComputeError, ComputeResult};
use pixcl_core::BYTES_PER_PIXEL;
use std::fmt;
use tracing::trace;

/// How pixels are laid out on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferLayout {
    /// Linear array of 32-bit RGBA words.
    Packed,
    /// RGBA8 2D image object.
    Image2d,
}

/// Device memory owned by one job.
pub struct DeviceBuffer<D: ComputeDriver> {
    handle: D::Buffer,
    size: usize,
    access: MemAccess,
    layout: BufferLayout,
}

impl<D: ComputeDriver> DeviceBuffer<D> {
    pub fn handle(&self) -> &D::Buffer {
        &self.handle
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn access(&self) -> MemAccess {
        self.access
    }

    pub fn layout(&self) -> BufferLayout {
        self.layout
    }
}

impl<D: ComputeDriver> fmt::Debug for DeviceBuffer<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("size", &self.size)
            .field("access", &self.access)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

/// Allocates and transfers device buffers within an environment.
pub struct BufferStager<'env, D: ComputeDriver> {
    env: &'env ComputeEnvironment<D>,
}

impl<'env, D: ComputeDriver> BufferStager<'env, D> {
    pub fn new(env: &'env ComputeEnvironment<D>) -> Self {
        Self { env }
    }

    /// Allocates a linear buffer of `size` bytes.
    pub fn allocate(&self, size: usize, access: MemAccess) -> ComputeResult<DeviceBuffer<D>> {
        if size == 0 {
            return Err(ComputeError::BufferAllocationFailure(
                "zero-byte buffer".into(),
            ));
        }
        let handle = self
            .env
            .driver()
            .create_buffer(self.env.context()?, access, size)?;
        trace!(size, ?access, "allocated buffer");
        Ok(DeviceBuffer {
            handle,
            size,
            access,
            layout: BufferLayout::Packed,
        })
    }

    /// Allocates an RGBA8 image of `width` x `height` texels.
    pub fn allocate_image(
        &self,
        width: u32,
        height: u32,
        access: MemAccess,
    ) -> ComputeResult<DeviceBuffer<D>> {
        if width == 0 || height == 0 {
            return Err(ComputeError::BufferAllocationFailure(format!(
                "empty {width}x{height} image"
            )));
        }
        let handle = self.env.driver().create_image(
            self.env.context()?,
            access,
            width as usize,
            height as usize,
        )?;
        let size = width as usize * height as usize * BYTES_PER_PIXEL;
        trace!(width, height, ?access, "allocated image");
        Ok(DeviceBuffer {
            handle,
            size,
            access,
            layout: BufferLayout::Image2d,
        })
    }

    /// Copies `data` to the device. Blocks until the copy completes.
    pub fn upload(&self, buffer: &mut DeviceBuffer<D>, data: &[u8]) -> ComputeResult<()> {
        if data.len() != buffer.size {
            return Err(ComputeError::UploadFailure(format!(
                "host data is {} bytes, buffer is {}",
                data.len(),
                buffer.size
            )));
        }
        self.env
            .driver()
            .write(self.env.queue()?, &mut buffer.handle, data)?;
        trace!(bytes = data.len(), "uploaded");
        Ok(())
    }

    /// Copies the device buffer into `out`. Blocks until the copy completes.
    pub fn download(&self, buffer: &DeviceBuffer<D>, out: &mut [u8]) -> ComputeResult<()> {
        if out.len() != buffer.size {
            return Err(ComputeError::ReadbackFailure(format!(
                "host buffer is {} bytes, device buffer is {}",
                out.len(),
                buffer.size
            )));
        }
        self.env
            .driver()
            .read(self.env.queue()?, &buffer.handle, out)?;
        trace!(bytes = out.len(), "downloaded");
        Ok(())
    }
}
