//! Error types for image operations.

use thiserror::Error;

/// Error type for image operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpsError {
    /// Invalid dimensions specified.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Images have incompatible sizes.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// Crop rectangle extends past the source bitmap.
    #[error("crop region {width}x{height} at ({x},{y}) exceeds {src_width}x{src_height}")]
    CropOutOfBounds {
        /// Region X origin
        x: u32,
        /// Region Y origin
        y: u32,
        /// Region width
        width: u32,
        /// Region height
        height: u32,
        /// Source width
        src_width: u32,
        /// Source height
        src_height: u32,
    },

    /// Bitmap construction failed.
    #[error(transparent)]
    Core(#[from] pixcl_core::Error),
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;
