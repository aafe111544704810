//! Validated descriptors for one filter invocation.

use crate::variants::FilterKind;
use crate::{ComputeError, ComputeResult};
use pixcl_core::{BYTES_PER_PIXEL, Bitmap};

/// Read-only packed RGBA pixels with their dimensions.
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    bytes: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> PixelBuffer<'a> {
    pub fn new(bytes: &'a [u8], width: u32, height: u32) -> Self {
        Self {
            bytes,
            width,
            height,
        }
    }

    pub fn from_bitmap(bitmap: &'a Bitmap) -> Self {
        Self::new(bitmap.as_bytes(), bitmap.width(), bitmap.height())
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Writable packed RGBA pixels with their dimensions.
#[derive(Debug)]
pub struct PixelBufferMut<'a> {
    bytes: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> PixelBufferMut<'a> {
    pub fn new(bytes: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            bytes,
            width,
            height,
        }
    }

    pub fn from_bitmap(bitmap: &'a mut Bitmap) -> Self {
        let (width, height) = (bitmap.width(), bitmap.height());
        Self::new(bitmap.as_bytes_mut(), width, height)
    }

    pub fn bytes(&self) -> &[u8] {
        self.bytes
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Scalar kernel parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobParams {
    #[default]
    None,
    /// Source extent a resampling kernel maps destination pixels into.
    SourceSize { width: u32, height: u32 },
}

/// One filter invocation: input, output and parameters, already checked.
#[derive(Debug)]
pub struct FilterJob<'a> {
    filter: FilterKind,
    input: PixelBuffer<'a>,
    output: PixelBufferMut<'a>,
    params: JobParams,
}

impl<'a> FilterJob<'a> {
    /// Validates the descriptors and derives the filter's parameters.
    pub fn new(
        filter: FilterKind,
        input: PixelBuffer<'a>,
        output: PixelBufferMut<'a>,
    ) -> ComputeResult<Self> {
        check_descriptor("input", input.bytes.len(), input.width, input.height)?;
        check_descriptor("output", output.bytes.len(), output.width, output.height)?;

        if filter.is_per_pixel() && (input.width, input.height) != (output.width, output.height)
        {
            return Err(ComputeError::DimensionMismatch(format!(
                "{filter} needs equal sizes, got {}x{} -> {}x{}",
                input.width, input.height, output.width, output.height
            )));
        }

        let params = match filter {
            FilterKind::ScaleNearest => JobParams::SourceSize {
                width: input.width,
                height: input.height,
            },
            FilterKind::Grayscale | FilterKind::Sepia | FilterKind::SepiaImage => {
                JobParams::None
            }
        };

        Ok(Self {
            filter,
            input,
            output,
            params,
        })
    }

    pub fn filter(&self) -> FilterKind {
        self.filter
    }

    pub fn input(&self) -> &PixelBuffer<'a> {
        &self.input
    }

    pub fn output(&self) -> &PixelBufferMut<'a> {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut PixelBufferMut<'a> {
        &mut self.output
    }

    pub fn params(&self) -> JobParams {
        self.params
    }
}

fn check_descriptor(role: &str, len: usize, width: u32, height: u32) -> ComputeResult<()> {
    if len == 0 || width == 0 || height == 0 {
        return Err(ComputeError::NullInput(format!(
            "{role} is empty ({width}x{height}, {len} bytes)"
        )));
    }
    let expected = width as usize * height as usize * BYTES_PER_PIXEL;
    if len != expected {
        return Err(ComputeError::DimensionMismatch(format!(
            "{role} {width}x{height} needs {expected} bytes, got {len}"
        )));
    }
    Ok(())
}
