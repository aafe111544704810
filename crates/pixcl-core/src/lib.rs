//! # pixcl-core
//!
//! Core types shared by every pixcl crate:
//!
//! - [`Bitmap`] - packed RGBA8 raster, the layout accelerator kernels consume
//! - [`Rgba`] - one pixel, castable to and from bytes and 32-bit words
//! - [`Colorspace`] - RGB / RGBA tag used by the codecs
//! - [`Rect`], [`Point`], [`Size`] - geometry for crop and scale
//! - [`Error`] / [`Result`] - bitmap construction and access errors
//!
//! ## Crate Structure
//!
//! ```text
//! pixcl-core (this crate)
//!    ^
//!    +-- pixcl-io      (codecs)
//!    +-- pixcl-ops     (CPU filters)
//!    +-- pixcl-compute (accelerator dispatch)
//!    +-- pixcl-cli
//! ```

#![warn(missing_docs)]

pub mod bitmap;
pub mod error;
pub mod pixel;
pub mod rect;

pub use bitmap::Bitmap;
pub use error::{Error, Result};
pub use pixel::{
    BYTES_PER_PIXEL, Colorspace, REC709_LUMA_B, REC709_LUMA_G, REC709_LUMA_R, Rgba,
};
pub use rect::{Point, Rect, Size};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitmap::Bitmap;
    pub use crate::error::{Error, Result};
    pub use crate::pixel::{Colorspace, Rgba};
    pub use crate::rect::{Point, Rect, Size};
}
