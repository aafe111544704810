//! # pixcl-io
//!
//! Image codecs for pixcl. Everything decodes to, and encodes from, a
//! packed RGBA [`Bitmap`].
//!
//! | Format | Read | Write | Notes                                  |
//! |--------|------|-------|----------------------------------------|
//! | PNG    | Yes  | Yes   | 8-bit; gray and palette are expanded   |
//! | JPEG   | Yes  | Yes   | RGB only, default quality 100          |
//! | TGA    | Yes  | Yes   | uncompressed true-color, 24/32 bit     |
//!
//! RGB sources get alpha = 255 on read. Writing RGB from RGBA turns fully
//! transparent pixels white.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pixcl_io::{read, write};
//! use pixcl_core::Colorspace;
//!
//! let bitmap = read("input.jpg")?;
//! write("output.tga", &bitmap, Colorspace::Rgba)?;
//! ```
//!
//! # Feature Flags
//!
//! - `png` - PNG support (default)
//! - `jpeg` - JPEG support (default)

#![warn(missing_docs)]

pub mod detect;
pub mod error;
#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "png")]
pub mod png;
pub mod tga;

pub use detect::Format;
pub use error::{IoError, IoResult};

use pixcl_core::{Bitmap, Colorspace};
use std::path::Path;
use tracing::debug;

/// Reads an image, detecting the format from its content or extension.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Bitmap> {
    let path = path.as_ref();
    let format = Format::detect(path)?;
    debug!(path = %path.display(), format = format.name(), "reading image");

    let bitmap = match format {
        #[cfg(feature = "png")]
        Format::Png => png::read(path)?,
        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::read(path)?,
        Format::Tga => tga::read(path)?,
        other => return Err(unsupported(other, path)),
    };

    debug!(width = bitmap.width(), height = bitmap.height(), "decoded");
    Ok(bitmap)
}

/// Writes an image, choosing the format from the file extension.
pub fn write<P: AsRef<Path>>(path: P, bitmap: &Bitmap, colorspace: Colorspace) -> IoResult<()> {
    let path = path.as_ref();
    write_as(path, bitmap, Format::from_extension(path), colorspace)
}

/// Writes an image in an explicit format.
///
/// JPEG can't hold alpha, so asking for [`Colorspace::Rgba`] with
/// [`Format::Jpeg`] is an error.
pub fn write_as<P: AsRef<Path>>(
    path: P,
    bitmap: &Bitmap,
    format: Format,
    colorspace: Colorspace,
) -> IoResult<()> {
    let path = path.as_ref();
    debug!(
        path = %path.display(),
        format = format.name(),
        %colorspace,
        "writing image"
    );

    match format {
        #[cfg(feature = "png")]
        Format::Png => png::write(path, bitmap, colorspace),
        #[cfg(feature = "jpeg")]
        Format::Jpeg => {
            if colorspace != Colorspace::Rgb {
                return Err(IoError::UnsupportedColorspace {
                    format: "JPEG",
                    colorspace,
                });
            }
            jpeg::write(path, bitmap)
        }
        Format::Tga => tga::write(path, bitmap, colorspace),
        other => Err(unsupported(other, path)),
    }
}

fn unsupported(format: Format, path: &Path) -> IoError {
    IoError::UnsupportedFormat(format!("{} ({})", format.name(), path.display()))
}
