//! JPEG format support.
//!
//! Decoding goes through `jpeg-decoder`, encoding through `jpeg-encoder`.
//! JPEG has no alpha: bitmaps are always written as RGB, with fully
//! transparent pixels turned white.
//!
//! ```rust,ignore
//! use pixcl_io::jpeg::{JpegWriter, JpegWriterOptions};
//!
//! let writer = JpegWriter::with_options(JpegWriterOptions { quality: 85 });
//! writer.write("preview.jpg", &bitmap)?;
//! ```

use crate::{IoError, IoResult};
use pixcl_core::{Bitmap, Colorspace};
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Encoder settings.
#[derive(Debug, Clone)]
pub struct JpegWriterOptions {
    /// Quality, 1-100.
    pub quality: u8,
}

impl Default for JpegWriterOptions {
    fn default() -> Self {
        Self { quality: 100 }
    }
}

/// JPEG encoder with fixed options.
#[derive(Debug, Clone, Default)]
pub struct JpegWriter {
    options: JpegWriterOptions,
}

impl JpegWriter {
    /// Creates a writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with custom options.
    pub fn with_options(options: JpegWriterOptions) -> Self {
        Self { options }
    }

    /// Writes a JPEG file.
    pub fn write<P: AsRef<Path>>(&self, path: P, bitmap: &Bitmap) -> IoResult<()> {
        let data = self.write_to_memory(bitmap)?;
        std::fs::write(path.as_ref(), data)?;
        Ok(())
    }

    /// Encodes a JPEG into a byte vector.
    pub fn write_to_memory(&self, bitmap: &Bitmap) -> IoResult<Vec<u8>> {
        use jpeg_encoder::{ColorType, Encoder};

        let (width, height) = jpeg_dimensions(bitmap)?;
        let rgb = bitmap.to_components(Colorspace::Rgb);

        let mut buffer = Vec::new();
        let encoder = Encoder::new(&mut buffer, self.options.quality.clamp(1, 100));
        encoder
            .encode(&rgb, width, height, ColorType::Rgb)
            .map_err(|e: jpeg_encoder::EncodingError| IoError::EncodeError(e.to_string()))?;

        debug!(width, height, quality = self.options.quality, "encoded JPEG");
        Ok(buffer)
    }
}

fn jpeg_dimensions(bitmap: &Bitmap) -> IoResult<(u16, u16)> {
    let w = u16::try_from(bitmap.width());
    let h = u16::try_from(bitmap.height());
    match (w, h) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(IoError::EncodeError(format!(
            "{}x{} exceeds JPEG limit of 65535",
            bitmap.width(),
            bitmap.height()
        ))),
    }
}

/// Reads a JPEG file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Bitmap> {
    let file = std::fs::File::open(path.as_ref())?;
    decode(file)
}

/// Decodes a JPEG held in memory.
pub fn read_from_memory(data: &[u8]) -> IoResult<Bitmap> {
    decode(data)
}

fn decode<R: Read>(reader: R) -> IoResult<Bitmap> {
    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(reader));
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(e.to_string()))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("missing JPEG info".into()))?;

    let width = info.width as u32;
    let height = info.height as u32;

    match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => Ok(Bitmap::from_rgb(width, height, &pixels)?),
        jpeg_decoder::PixelFormat::L8 => {
            let rgb: Vec<u8> = pixels.iter().flat_map(|&g| [g, g, g]).collect();
            Ok(Bitmap::from_rgb(width, height, &rgb)?)
        }
        other => Err(IoError::UnsupportedBitDepth(format!("{other:?}"))),
    }
}

/// Writes a JPEG with default options.
pub fn write<P: AsRef<Path>>(path: P, bitmap: &Bitmap) -> IoResult<()> {
    JpegWriter::new().write(path, bitmap)
}
