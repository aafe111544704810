//! PNG format support.
//!
//! Reads 8-bit PNGs of any color type (palette and low bit-depth gray are
//! expanded by the decoder) into an RGBA [`Bitmap`]. Writes 8-bit RGB or
//! RGBA.
//!
//! # Example
//!
//! ```rust,ignore
//! use pixcl_io::png;
//! use pixcl_core::Colorspace;
//!
//! let bitmap = png::read("input.png")?;
//! png::write("output.png", &bitmap, Colorspace::Rgba)?;
//! ```

use crate::{IoError, IoResult};
use pixcl_core::{Bitmap, Colorspace};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor, Seek, Write};
use std::path::Path;

/// Reads a PNG file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Bitmap> {
    let file = File::open(path.as_ref())?;
    decode(BufReader::new(file))
}

/// Decodes a PNG held in memory.
pub fn read_from_memory(data: &[u8]) -> IoResult<Bitmap> {
    decode(Cursor::new(data))
}

fn decode<R: BufRead + Seek>(source: R) -> IoResult<Bitmap> {
    let mut decoder = png::Decoder::new(source);
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;
    let data = &buf[..info.buffer_size()];

    if info.bit_depth != png::BitDepth::Eight {
        return Err(IoError::UnsupportedBitDepth(format!(
            "{:?} {:?}",
            info.color_type, info.bit_depth
        )));
    }

    let bitmap = match info.color_type {
        png::ColorType::Rgb => Bitmap::from_rgb(info.width, info.height, data)?,
        png::ColorType::Rgba => Bitmap::from_rgba(info.width, info.height, data)?,
        png::ColorType::Grayscale => {
            let rgb: Vec<u8> = data.iter().flat_map(|&g| [g, g, g]).collect();
            Bitmap::from_rgb(info.width, info.height, &rgb)?
        }
        png::ColorType::GrayscaleAlpha => {
            let rgba: Vec<u8> = data
                .chunks_exact(2)
                .flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]])
                .collect();
            Bitmap::from_rgba(info.width, info.height, &rgba)?
        }
        other => {
            return Err(IoError::UnsupportedBitDepth(format!(
                "{:?} {:?}",
                other, info.bit_depth
            )));
        }
    };

    Ok(bitmap)
}

/// Writes a PNG file in the given colorspace.
pub fn write<P: AsRef<Path>>(path: P, bitmap: &Bitmap, colorspace: Colorspace) -> IoResult<()> {
    let file = File::create(path.as_ref())?;
    encode(BufWriter::new(file), bitmap, colorspace)
}

/// Encodes a PNG into a byte vector.
pub fn write_to_memory(bitmap: &Bitmap, colorspace: Colorspace) -> IoResult<Vec<u8>> {
    let mut out = Vec::new();
    encode(&mut out, bitmap, colorspace)?;
    Ok(out)
}

fn encode<W: Write>(sink: W, bitmap: &Bitmap, colorspace: Colorspace) -> IoResult<()> {
    let color_type = match colorspace {
        Colorspace::Rgb => png::ColorType::Rgb,
        Colorspace::Rgba => png::ColorType::Rgba,
    };

    let mut encoder = png::Encoder::new(sink, bitmap.width(), bitmap.height());
    encoder.set_color(color_type);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::default());

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    writer
        .write_image_data(&bitmap.to_components(colorspace))
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    writer
        .finish()
        .map_err(|e| IoError::EncodeError(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixcl_core::Rgba;

    fn gradient(width: u32, height: u32) -> Bitmap {
        let mut bmp = Bitmap::new(width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                let px = Rgba::new((x * 8) as u8, (y * 8) as u8, 128, 200);
                bmp.set_pixel(x, y, px).unwrap();
            }
        }
        bmp
    }

    #[test]
    fn test_roundtrip_rgba() {
        let bmp = gradient(16, 8);
        let bytes = write_to_memory(&bmp, Colorspace::Rgba).unwrap();
        let loaded = read_from_memory(&bytes).unwrap();
        assert_eq!(loaded, bmp);
    }

    #[test]
    fn test_rgb_drops_alpha() {
        let bmp = gradient(4, 4);
        let bytes = write_to_memory(&bmp, Colorspace::Rgb).unwrap();
        let loaded = read_from_memory(&bytes).unwrap();
        assert_eq!(loaded.size(), bmp.size());
        assert!(loaded.pixels().iter().all(|p| p.a == 255));
        assert_eq!(loaded.pixel(3, 2).unwrap(), Rgba::new(24, 16, 128, 255));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = read_from_memory(b"not a png").unwrap_err();
        assert!(matches!(err, IoError::DecodeError(_)));
    }
}
