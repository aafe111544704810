//! Geometric primitives: [`Point`], [`Size`] and [`Rect`].
//!
//! Coordinates use the usual image convention: origin at the top-left,
//! X grows right, Y grows down.

/// A pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// Column
    pub x: u32,
    /// Row
    pub y: u32,
}

impl Point {
    /// Creates a new point.
    #[inline]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Size {
    /// Creates a new size.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of pixels.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns `true` if either dimension is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A rectangle defined by an origin and a size.
///
/// # Example
///
/// ```rust
/// use pixcl_core::{Rect, Size};
///
/// let rect = Rect::new(10, 20, 100, 50);
/// assert_eq!(rect.max_x(), 110);
/// assert_eq!(rect.max_y(), 70);
/// assert!(rect.fits_within(Size::new(110, 70)));
/// assert!(!rect.fits_within(Size::new(109, 70)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Top-left corner (inclusive)
    pub origin: Point,
    /// Extent
    pub size: Size,
}

impl Rect {
    /// Creates a rectangle at `(x, y)` with the given dimensions.
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Right edge (exclusive), widened to avoid overflow.
    #[inline]
    pub const fn max_x(&self) -> u64 {
        self.origin.x as u64 + self.size.width as u64
    }

    /// Bottom edge (exclusive), widened to avoid overflow.
    #[inline]
    pub const fn max_y(&self) -> u64 {
        self.origin.y as u64 + self.size.height as u64
    }

    /// Returns `true` if the rectangle lies entirely inside `bounds`.
    #[inline]
    pub const fn fits_within(&self, bounds: Size) -> bool {
        self.max_x() <= bounds.width as u64 && self.max_y() <= bounds.height as u64
    }
}
