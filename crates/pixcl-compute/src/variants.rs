//! Kernel variants keyed by filter and vector width.
//!
//! The table is plain data: adding a width means adding rows, not
//! branches. Selection falls back to the scalar variant when the device
//! reports a width the table doesn't carry.

use crate::kernels;
use crate::staging::BufferLayout;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// SIMD width a kernel variant processes per work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VectorWidth {
    X1,
    X2,
    X4,
    X8,
    X16,
}

impl VectorWidth {
    /// All supported widths, narrowest first.
    pub const ALL: [VectorWidth; 5] = [Self::X1, Self::X2, Self::X4, Self::X8, Self::X16];

    /// Maps a lane count to a width, if supported.
    pub fn from_lanes(lanes: u32) -> Option<Self> {
        match lanes {
            1 => Some(Self::X1),
            2 => Some(Self::X2),
            4 => Some(Self::X4),
            8 => Some(Self::X8),
            16 => Some(Self::X16),
            _ => None,
        }
    }

    /// Number of lanes.
    pub const fn lanes(self) -> u32 {
        match self {
            Self::X1 => 1,
            Self::X2 => 2,
            Self::X4 => 4,
            Self::X8 => 8,
            Self::X16 => 16,
        }
    }
}

impl fmt::Display for VectorWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.lanes())
    }
}

/// Filters with accelerated implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Grayscale,
    Sepia,
    /// Sepia computed on RGBA8 image objects instead of packed words.
    SepiaImage,
    ScaleNearest,
}

impl FilterKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::SepiaImage => "sepia_image",
            Self::ScaleNearest => "scale_nearest",
        }
    }

    /// `true` for filters whose output size equals the input size.
    pub const fn is_per_pixel(self) -> bool {
        matches!(self, Self::Grayscale | Self::Sepia | Self::SepiaImage)
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One compiled-on-demand specialization of a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelVariant {
    filter: FilterKind,
    source: String,
    entry_point: String,
    vector_width: VectorWidth,
    layout: BufferLayout,
}

impl KernelVariant {
    pub fn new(
        filter: FilterKind,
        source: impl Into<String>,
        entry_point: impl Into<String>,
        vector_width: VectorWidth,
        layout: BufferLayout,
    ) -> Self {
        Self {
            filter,
            source: source.into(),
            entry_point: entry_point.into(),
            vector_width,
            layout,
        }
    }

    pub fn filter(&self) -> FilterKind {
        self.filter
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn vector_width(&self) -> VectorWidth {
        self.vector_width
    }

    pub fn layout(&self) -> BufferLayout {
        self.layout
    }
}

/// Entry point name: `grayscale`, `grayscale_x2`, ... `grayscale_x16`.
pub fn entry_point_name(filter: FilterKind, width: VectorWidth) -> String {
    match width {
        VectorWidth::X1 => filter.name().to_string(),
        w => format!("{}_x{}", filter.name(), w.lanes()),
    }
}

/// Lookup table from (filter, width) to kernel variant.
#[derive(Debug, Clone, Default)]
pub struct KernelVariantTable {
    variants: HashMap<(FilterKind, VectorWidth), KernelVariant>,
}

impl KernelVariantTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with every built-in variant: grayscale and sepia at all five
    /// widths, image-object sepia and nearest-neighbor scale as scalar
    /// image kernels.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for filter in [FilterKind::Grayscale, FilterKind::Sepia] {
            for width in VectorWidth::ALL {
                let entry = entry_point_name(filter, width);
                if let Some(source) = kernels::packed_source(filter, width, &entry) {
                    table.insert(KernelVariant::new(
                        filter,
                        source,
                        entry,
                        width,
                        BufferLayout::Packed,
                    ));
                }
            }
        }
        for (filter, source) in [
            (FilterKind::SepiaImage, kernels::SEPIA_IMAGE),
            (FilterKind::ScaleNearest, kernels::SCALE_NEAREST_IMAGE),
        ] {
            table.insert(KernelVariant::new(
                filter,
                source,
                entry_point_name(filter, VectorWidth::X1),
                VectorWidth::X1,
                BufferLayout::Image2d,
            ));
        }
        table
    }

    /// Adds or replaces a variant.
    pub fn insert(&mut self, variant: KernelVariant) {
        self.variants
            .insert((variant.filter, variant.vector_width), variant);
    }

    /// Variant for `filter` at exactly `width`.
    pub fn get(&self, filter: FilterKind, width: VectorWidth) -> Option<&KernelVariant> {
        self.variants.get(&(filter, width))
    }

    /// Picks the variant matching `preferred_lanes`, or the scalar one when
    /// that width is unsupported or missing for this filter.
    pub fn select(&self, filter: FilterKind, preferred_lanes: u32) -> Option<&KernelVariant> {
        let exact = VectorWidth::from_lanes(preferred_lanes).and_then(|w| self.get(filter, w));
        if let Some(variant) = exact {
            return Some(variant);
        }
        debug!(
            %filter,
            preferred_lanes, "no variant at preferred width, using scalar"
        );
        self.get(filter, VectorWidth::X1)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_all_widths() {
        let table = KernelVariantTable::builtin();
        assert_eq!(table.len(), 12);
        for width in VectorWidth::ALL {
            let v = table.get(FilterKind::Sepia, width).unwrap();
            assert_eq!(v.vector_width(), width);
            assert_eq!(v.layout(), BufferLayout::Packed);
            assert!(v.source().contains(&format!("__kernel void {}(", v.entry_point())));
        }
    }

    #[test]
    fn preferred_width_four_selects_x4() {
        let table = KernelVariantTable::builtin();
        let v = table.select(FilterKind::Grayscale, 4).unwrap();
        assert_eq!(v.vector_width(), VectorWidth::X4);
        assert_eq!(v.entry_point(), "grayscale_x4");
    }

    #[test]
    fn unsupported_widths_fall_back_to_scalar() {
        let table = KernelVariantTable::builtin();
        for lanes in [0, 3, 5, 32] {
            let v = table.select(FilterKind::Grayscale, lanes).unwrap();
            assert_eq!(v.vector_width(), VectorWidth::X1);
            assert_eq!(v.entry_point(), "grayscale");
        }
    }

    #[test]
    fn image_filters_ignore_width() {
        let table = KernelVariantTable::builtin();
        for filter in [FilterKind::ScaleNearest, FilterKind::SepiaImage] {
            let v = table.select(filter, 8).unwrap();
            assert_eq!(v.vector_width(), VectorWidth::X1);
            assert_eq!(v.layout(), BufferLayout::Image2d);
            assert!(v.source().contains(&format!("__kernel void {}(", v.entry_point())));
        }
        assert_eq!(
            table.select(FilterKind::SepiaImage, 1).unwrap().entry_point(),
            "sepia_image"
        );
    }

    #[test]
    fn empty_table_selects_nothing() {
        assert!(KernelVariantTable::new().select(FilterKind::Sepia, 1).is_none());
    }
}
