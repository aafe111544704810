//! Error types for I/O operations.

use std::io;
use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unsupported or unrecognised format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Unsupported bit depth or sample layout.
    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(String),

    /// The format can't store the requested colorspace.
    #[error("{format} cannot store {colorspace}")]
    UnsupportedColorspace {
        /// Target format name.
        format: &'static str,
        /// Requested colorspace.
        colorspace: pixcl_core::Colorspace,
    },

    /// Decoded data didn't form a valid bitmap.
    #[error(transparent)]
    Core(#[from] pixcl_core::Error),
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;
