//! OpenCL driver built on `opencl3`.
//!
//! `opencl3` wrapper types release their CL objects on drop, which is
//! what the [`ComputeDriver`] handle contract requires.

use super::{ComputeDriver, KernelArg, MemAccess, PlatformInfo, ScalarType};
use crate::{ComputeError, ComputeResult};
use opencl3::command_queue::CommandQueue;
use opencl3::context::Context;
use opencl3::device::{CL_DEVICE_TYPE_GPU, Device, get_all_devices};
use opencl3::kernel::Kernel;
use opencl3::memory::{
    Buffer, CL_MEM_OBJECT_IMAGE2D, CL_MEM_READ_ONLY, CL_MEM_WRITE_ONLY, CL_RGBA,
    CL_UNSIGNED_INT8, ClMem, Image,
};
use opencl3::platform::get_platforms;
use opencl3::program::Program;
use opencl3::types::{CL_BLOCKING, cl_image_desc, cl_image_format, cl_mem_flags};
use std::ffi::c_void;
use std::ptr;

/// Memory object: a byte buffer or an RGBA8 image.
pub enum ClMemory {
    Buffer(Buffer<u8>),
    Image {
        image: Image,
        width: usize,
        height: usize,
    },
}

impl ClMemory {
    fn raw(&self) -> opencl3::types::cl_mem {
        match self {
            Self::Buffer(b) => b.get(),
            Self::Image { image, .. } => image.get(),
        }
    }
}

/// OpenCL runtime driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenClDriver;

fn flags(access: MemAccess) -> cl_mem_flags {
    match access {
        MemAccess::ReadOnly => CL_MEM_READ_ONLY,
        MemAccess::WriteOnly => CL_MEM_WRITE_ONLY,
    }
}

impl ComputeDriver for OpenClDriver {
    type Device = Device;
    type Context = Context;
    type Queue = CommandQueue;
    type Program = Program;
    type Kernel = Kernel;
    type Buffer = ClMemory;

    fn name(&self) -> &'static str {
        "opencl"
    }

    fn platforms(&self) -> ComputeResult<Vec<PlatformInfo>> {
        let platforms = get_platforms()
            .map_err(|e| ComputeError::DeviceDiscoveryFailure(format!("platform query: {e}")))?;
        Ok(platforms
            .iter()
            .map(|p| PlatformInfo {
                name: p.name().unwrap_or_default(),
                vendor: p.vendor().unwrap_or_default(),
                version: p.version().unwrap_or_default(),
                profile: p.profile().unwrap_or_default(),
                extensions: p.extensions().unwrap_or_default(),
            })
            .collect())
    }

    fn gpu_device(&self) -> ComputeResult<Device> {
        let ids = get_all_devices(CL_DEVICE_TYPE_GPU)
            .map_err(|e| ComputeError::DeviceDiscoveryFailure(format!("device query: {e}")))?;
        ids.first()
            .map(|&id| Device::new(id))
            .ok_or_else(|| ComputeError::DeviceDiscoveryFailure("no GPU device found".into()))
    }

    fn device_name(&self, device: &Device) -> String {
        device.name().unwrap_or_default().trim().to_string()
    }

    fn create_context(&self, device: &Device) -> ComputeResult<Context> {
        Context::from_device(device)
            .map_err(|e| ComputeError::ContextCreationFailure(e.to_string()))
    }

    fn create_queue(&self, context: &Context, _device: &Device) -> ComputeResult<CommandQueue> {
        // OpenCL 1.2 entry point; no properties means in-order, no profiling.
        #[allow(deprecated)]
        CommandQueue::create_default(context, 0)
            .map_err(|e| ComputeError::QueueCreationFailure(e.to_string()))
    }

    fn preferred_vector_width(&self, device: &Device, scalar: ScalarType) -> ComputeResult<u32> {
        let width = match scalar {
            ScalarType::Int => device.preferred_vector_width_int(),
            ScalarType::Float => device.preferred_vector_width_float(),
        };
        width.map_err(|e| {
            ComputeError::DeviceDiscoveryFailure(format!("{scalar:?} vector width query: {e}"))
        })
    }

    fn build_program(
        &self,
        context: &Context,
        _device: &Device,
        source: &str,
        options: &str,
    ) -> ComputeResult<Program> {
        Program::create_and_build_from_source(context, source, options)
            .map_err(|log| ComputeError::ProgramBuildFailure { log })
    }

    fn create_kernel(&self, program: &Program, entry_point: &str) -> ComputeResult<Kernel> {
        Kernel::create(program, entry_point)
            .map_err(|e| ComputeError::KernelCreationFailure(format!("{entry_point}: {e}")))
    }

    fn create_buffer(
        &self,
        context: &Context,
        access: MemAccess,
        size: usize,
    ) -> ComputeResult<ClMemory> {
        let buffer = unsafe { Buffer::<u8>::create(context, flags(access), size, ptr::null_mut()) }
            .map_err(|e| ComputeError::BufferAllocationFailure(format!("{size} bytes: {e}")))?;
        Ok(ClMemory::Buffer(buffer))
    }

    fn create_image(
        &self,
        context: &Context,
        access: MemAccess,
        width: usize,
        height: usize,
    ) -> ComputeResult<ClMemory> {
        let format = cl_image_format {
            image_channel_order: CL_RGBA,
            image_channel_data_type: CL_UNSIGNED_INT8,
        };
        let desc = cl_image_desc {
            image_type: CL_MEM_OBJECT_IMAGE2D,
            image_width: width,
            image_height: height,
            image_depth: 1,
            image_array_size: 1,
            image_row_pitch: 0,
            image_slice_pitch: 0,
            num_mip_levels: 0,
            num_samples: 0,
            buffer: ptr::null_mut(),
        };
        let image = unsafe {
            Image::create(context, flags(access), &format, &desc, ptr::null_mut())
        }
        .map_err(|e| {
            ComputeError::BufferAllocationFailure(format!("{width}x{height} image: {e}"))
        })?;
        Ok(ClMemory::Image {
            image,
            width,
            height,
        })
    }

    fn write(&self, queue: &CommandQueue, buffer: &mut ClMemory, data: &[u8]) -> ComputeResult<()> {
        let event = match buffer {
            ClMemory::Buffer(b) => unsafe {
                queue.enqueue_write_buffer(b, CL_BLOCKING, 0, data, &[])
            },
            ClMemory::Image {
                image,
                width,
                height,
            } => {
                let origin = [0usize; 3];
                let region = [*width, *height, 1];
                unsafe {
                    queue.enqueue_write_image(
                        image,
                        CL_BLOCKING,
                        origin.as_ptr(),
                        region.as_ptr(),
                        0,
                        0,
                        data.as_ptr() as *mut c_void,
                        &[],
                    )
                }
            }
        }
        .map_err(|e| ComputeError::UploadFailure(e.to_string()))?;
        event
            .wait()
            .map_err(|e| ComputeError::UploadFailure(e.to_string()))
    }

    fn read(&self, queue: &CommandQueue, buffer: &ClMemory, out: &mut [u8]) -> ComputeResult<()> {
        let event = match buffer {
            ClMemory::Buffer(b) => unsafe {
                queue.enqueue_read_buffer(b, CL_BLOCKING, 0, out, &[])
            },
            ClMemory::Image {
                image,
                width,
                height,
            } => {
                let origin = [0usize; 3];
                let region = [*width, *height, 1];
                unsafe {
                    queue.enqueue_read_image(
                        image,
                        CL_BLOCKING,
                        origin.as_ptr(),
                        region.as_ptr(),
                        0,
                        0,
                        out.as_mut_ptr() as *mut c_void,
                        &[],
                    )
                }
            }
        }
        .map_err(|e| ComputeError::ReadbackFailure(e.to_string()))?;
        event
            .wait()
            .map_err(|e| ComputeError::ReadbackFailure(e.to_string()))
    }

    fn set_arg(
        &self,
        kernel: &mut Kernel,
        index: u32,
        arg: KernelArg<'_, ClMemory>,
    ) -> ComputeResult<()> {
        let result = unsafe {
            match arg {
                KernelArg::Mem(mem) => kernel.set_arg(index, &mem.raw()),
                KernelArg::U32(v) => kernel.set_arg(index, &v),
            }
        };
        result.map_err(|e| ComputeError::ArgumentBindingFailure(format!("argument {index}: {e}")))
    }

    fn work_group_size(&self, kernel: &Kernel, device: &Device) -> ComputeResult<usize> {
        kernel
            .get_work_group_size(device.id())
            .map_err(|e| ComputeError::WorkGroupQueryFailure(e.to_string()))
    }

    fn enqueue(
        &self,
        queue: &CommandQueue,
        kernel: &Kernel,
        global: &[usize],
        local: &[usize],
    ) -> ComputeResult<()> {
        unsafe {
            queue.enqueue_nd_range_kernel(
                kernel.get(),
                global.len() as u32,
                ptr::null(),
                global.as_ptr(),
                local.as_ptr(),
                &[],
            )
        }
        .map(drop)
        .map_err(|e| ComputeError::ExecutionFailure(e.to_string()))
    }

    fn finish(&self, queue: &CommandQueue) -> ComputeResult<()> {
        queue
            .finish()
            .map_err(|e| ComputeError::ExecutionFailure(format!("finish: {e}")))
    }
}
