//! # pixcl-ops
//!
//! CPU implementations of every pixcl filter. They serve two roles: the
//! fallback path when no accelerator is usable, and the oracle that
//! accelerated output is compared against.
//!
//! # Modules
//!
//! - [`pixel`] - per-pixel grayscale/sepia arithmetic
//! - [`color`] - grayscale and sepia over whole bitmaps
//! - [`resize`] - nearest-neighbor and bilinear scaling
//! - [`transform`] - crop
//! - [`parallel`] - Rayon row-parallel variants (feature `parallel`)
//!
//! All filters write into a caller-provided output bitmap, whose
//! dimensions define the result size.
//!
//! # Example
//!
//! ```rust
//! use pixcl_core::{Bitmap, Rgba};
//!
//! let src = Bitmap::filled(8, 8, Rgba::opaque(200, 120, 40))?;
//! let mut half = Bitmap::new(4, 4)?;
//! pixcl_ops::scale_bilinear(&src, &mut half)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

pub mod color;
mod error;
pub mod pixel;
pub mod resize;
pub mod transform;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use color::{grayscale, sepia};
pub use error::{OpsError, OpsResult};
pub use resize::{scale_bilinear, scale_nearest};
pub use transform::{crop, cropped};
