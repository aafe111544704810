//! Truevision TGA support (uncompressed true-color only).
//!
//! Layout of the 18-byte header:
//!
//! ```text
//! 0   id length          1   color map type (0)   2   image type (2)
//! 3   color map spec (5 bytes, zero)
//! 8   x origin  u16le    10  y origin  u16le
//! 12  width     u16le    14  height    u16le
//! 16  bits per pixel     17  descriptor (alpha bits | 0x20 if top-down)
//! ```
//!
//! Pixels are stored BGR or BGRA. Written files are bottom-up.

use crate::{IoError, IoResult};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use pixcl_core::{Bitmap, Colorspace, Rgba};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const HEADER_LEN: usize = 18;
const TYPE_TRUE_COLOR: u8 = 2;
const DESC_TOP_DOWN: u8 = 0x20;

/// Writes a TGA file.
pub fn write<P: AsRef<Path>>(path: P, bitmap: &Bitmap, colorspace: Colorspace) -> IoResult<()> {
    let file = std::fs::File::create(path.as_ref())?;
    let mut out = BufWriter::new(file);
    encode(&mut out, bitmap, colorspace)?;
    out.flush()?;
    Ok(())
}

/// Encodes a TGA into a byte vector.
pub fn write_to_memory(bitmap: &Bitmap, colorspace: Colorspace) -> IoResult<Vec<u8>> {
    let mut out = Vec::with_capacity(HEADER_LEN + bitmap.pixel_count() * colorspace.components());
    encode(&mut out, bitmap, colorspace)?;
    Ok(out)
}

fn encode<W: Write>(out: &mut W, bitmap: &Bitmap, colorspace: Colorspace) -> IoResult<()> {
    let (width, height) = match (u16::try_from(bitmap.width()), u16::try_from(bitmap.height())) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(IoError::EncodeError(format!(
                "{} exceeds TGA limit of 65535",
                bitmap.size()
            )));
        }
    };
    let (bpp, descriptor) = match colorspace {
        Colorspace::Rgb => (24u8, 0u8),
        Colorspace::Rgba => (32u8, 8u8),
    };

    out.write_u8(0)?;
    out.write_u8(0)?;
    out.write_u8(TYPE_TRUE_COLOR)?;
    out.write_all(&[0; 5])?;
    out.write_u16::<LittleEndian>(0)?;
    out.write_u16::<LittleEndian>(0)?;
    out.write_u16::<LittleEndian>(width)?;
    out.write_u16::<LittleEndian>(height)?;
    out.write_u8(bpp)?;
    out.write_u8(descriptor)?;

    let mut row = Vec::with_capacity(bitmap.width() as usize * colorspace.components());
    for y in (0..bitmap.height()).rev() {
        row.clear();
        for px in bitmap.row(y) {
            match colorspace {
                Colorspace::Rgba => row.extend_from_slice(&[px.b, px.g, px.r, px.a]),
                Colorspace::Rgb if px.a == 0 => row.extend_from_slice(&[255, 255, 255]),
                Colorspace::Rgb => row.extend_from_slice(&[px.b, px.g, px.r]),
            }
        }
        out.write_all(&row)?;
    }
    Ok(())
}

/// Reads a TGA file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Bitmap> {
    let file = std::fs::File::open(path.as_ref())?;
    decode(BufReader::new(file))
}

/// Decodes a TGA held in memory.
pub fn read_from_memory(data: &[u8]) -> IoResult<Bitmap> {
    decode(data)
}

fn decode<R: Read>(mut input: R) -> IoResult<Bitmap> {
    let id_len = input.read_u8()?;
    let map_type = input.read_u8()?;
    let image_type = input.read_u8()?;
    let mut map_spec = [0u8; 5];
    input.read_exact(&mut map_spec)?;
    let _x_origin = input.read_u16::<LittleEndian>()?;
    let _y_origin = input.read_u16::<LittleEndian>()?;
    let width = input.read_u16::<LittleEndian>()? as u32;
    let height = input.read_u16::<LittleEndian>()? as u32;
    let bpp = input.read_u8()?;
    let descriptor = input.read_u8()?;

    if map_type != 0 || image_type != TYPE_TRUE_COLOR {
        return Err(IoError::UnsupportedFormat(format!(
            "TGA image type {image_type} with color map type {map_type}"
        )));
    }
    let channels = match bpp {
        24 => 3,
        32 => 4,
        other => return Err(IoError::UnsupportedBitDepth(format!("TGA {other} bpp"))),
    };

    let mut id = vec![0u8; id_len as usize];
    input.read_exact(&mut id)?;

    let mut bitmap = Bitmap::new(width, height)?;
    let top_down = descriptor & DESC_TOP_DOWN != 0;
    let mut row = vec![0u8; width as usize * channels];
    for i in 0..height {
        input
            .read_exact(&mut row)
            .map_err(|e| IoError::DecodeError(format!("truncated TGA pixel data: {e}")))?;
        let y = if top_down { i } else { height - 1 - i };
        let start = y as usize * width as usize;
        let dst = &mut bitmap.pixels_mut()[start..start + width as usize];
        for (px, src) in dst.iter_mut().zip(row.chunks_exact(channels)) {
            let a = if channels == 4 { src[3] } else { 255 };
            *px = Rgba::new(src[2], src[1], src[0], a);
        }
    }

    Ok(bitmap)
}
