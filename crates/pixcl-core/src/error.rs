//! Error types for pixcl-core operations.
//!
//! The [`Error`] enum covers the failure modes of bitmap construction and
//! pixel access. Higher layers (`pixcl-io`, `pixcl-ops`, `pixcl-compute`)
//! wrap it in their own error types.
//!
//! # Usage
//!
//! ```rust
//! use pixcl_core::{Error, Result};
//!
//! fn check(x: u32, y: u32, width: u32, height: u32) -> Result<()> {
//!     if x >= width || y >= height {
//!         return Err(Error::OutOfBounds { x, y, width, height });
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or accessing a [`crate::Bitmap`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Pixel coordinates are outside bitmap bounds.
    #[error("pixel ({x}, {y}) out of bounds for bitmap {width}x{height}")]
    OutOfBounds {
        /// X coordinate that was out of bounds
        x: u32,
        /// Y coordinate that was out of bounds
        y: u32,
        /// Bitmap width
        width: u32,
        /// Bitmap height
        height: u32,
    },

    /// Width or height is zero, or the byte size overflows `usize`.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// Provided pixel data doesn't match the declared dimensions.
    ///
    /// The `expected` size is `width * height * components` bytes.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch {
        /// Expected buffer size in bytes
        expected: usize,
        /// Actual buffer size in bytes
        actual: usize,
    },
}
