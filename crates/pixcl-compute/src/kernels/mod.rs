//! OpenCL C sources for the built-in filters.
//!
//! Packed-pixel filters are written once as a per-pixel function over
//! placeholder types (`$U` for the unsigned word type, `$F` for float) and
//! instantiated at each vector width, so every variant computes the same
//! arithmetic. Pixels are little-endian RGBA words: red in bits 0-7,
//! alpha in bits 24-31.

use crate::variants::{FilterKind, VectorWidth};

const GRAYSCALE_PX: &str = r#"
static $U $NAME($U p)
{
    $F r = $TOF(p & 0xFFu);
    $F g = $TOF((p >> 8) & 0xFFu);
    $F b = $TOF((p >> 16) & 0xFFu);
    $U y = $TOU(fmin(r * 0.2126f + g * 0.7152f + b * 0.0722f + 0.5f, 255.0f));
    return (p & 0xFF000000u) | (y << 16) | (y << 8) | y;
}
"#;

const SEPIA_PX: &str = r#"
static $U $NAME($U p)
{
    $F r = $TOF(p & 0xFFu);
    $F g = $TOF((p >> 8) & 0xFFu);
    $F b = $TOF((p >> 16) & 0xFFu);
    $U nr = $TOU(fmin(r * 0.393f + g * 0.769f + b * 0.189f, 255.0f));
    $U ng = $TOU(fmin(r * 0.349f + g * 0.686f + b * 0.168f, 255.0f));
    $U nb = $TOU(fmin(r * 0.272f + g * 0.534f + b * 0.131f, 255.0f));
    return (p & 0xFF000000u) | (nb << 16) | (ng << 8) | nr;
}
"#;

const SCALAR_KERNEL: &str = r#"
__kernel void $ENTRY(__global const uint *input,
                     __global uint *output,
                     const uint count)
{
    const uint i = get_global_id(0);
    if (i >= count)
        return;
    output[i] = px_scalar(input[i]);
}
"#;

const VECTOR_KERNEL: &str = r#"
__kernel void $ENTRY(__global const uint *input,
                     __global uint *output,
                     const uint count)
{
    const uint base = get_global_id(0) * $Wu;
    if (base >= count)
        return;
    if (base + $Wu <= count) {
        vstore$W(px_vector(vload$W(0, input + base)), 0, output + base);
        return;
    }
    for (uint k = base; k < count; k++)
        output[k] = px_scalar(input[k]);
}
"#;

/// Nearest-neighbor resample between two RGBA8 images.
///
/// The source index is `dst * in / out` in integer arithmetic, widened to
/// `ulong` so the product cannot wrap.
pub(crate) const SCALE_NEAREST_IMAGE: &str = r#"
__constant sampler_t nearest_sampler = CLK_NORMALIZED_COORDS_FALSE |
                                       CLK_ADDRESS_CLAMP_TO_EDGE |
                                       CLK_FILTER_NEAREST;

__kernel void scale_nearest(__read_only image2d_t input,
                            __write_only image2d_t output,
                            const uint out_width,
                            const uint out_height,
                            const uint in_width,
                            const uint in_height)
{
    const uint x = get_global_id(0);
    const uint y = get_global_id(1);
    if (x >= out_width || y >= out_height)
        return;
    const uint sx = (uint)(((ulong)x * in_width) / out_width);
    const uint sy = (uint)(((ulong)y * in_height) / out_height);
    const int2 src = (int2)((int)sx, (int)sy);
    write_imageui(output, (int2)((int)x, (int)y), read_imageui(input, nearest_sampler, src));
}
"#;

/// Sepia over RGBA8 image objects, one work item per pixel.
pub(crate) const SEPIA_IMAGE: &str = r#"
__kernel void sepia_image(__read_only image2d_t input,
                          __write_only image2d_t output,
                          const uint width,
                          const uint height)
{
    const uint x = get_global_id(0);
    const uint y = get_global_id(1);
    if (x >= width || y >= height)
        return;
    const int2 pos = (int2)((int)x, (int)y);
    const uint4 p = read_imageui(input, pos);
    const float4 c = convert_float4(p);
    const uint4 out = (uint4)(
        convert_uint_sat(fmin(c.x * 0.393f + c.y * 0.769f + c.z * 0.189f, 255.0f)),
        convert_uint_sat(fmin(c.x * 0.349f + c.y * 0.686f + c.z * 0.168f, 255.0f)),
        convert_uint_sat(fmin(c.x * 0.272f + c.y * 0.534f + c.z * 0.131f, 255.0f)),
        p.w);
    write_imageui(output, pos, out);
}
"#;

fn instantiate(body: &str, name: &str, width: VectorWidth) -> String {
    let (u, f, tof, tou) = match width {
        VectorWidth::X1 => (
            "uint".to_string(),
            "float".to_string(),
            "convert_float".to_string(),
            "convert_uint_sat".to_string(),
        ),
        w => {
            let n = w.lanes();
            (
                format!("uint{n}"),
                format!("float{n}"),
                format!("convert_float{n}"),
                format!("convert_uint{n}_sat"),
            )
        }
    };
    body.replace("$NAME", name)
        .replace("$TOF", &tof)
        .replace("$TOU", &tou)
        .replace("$U", &u)
        .replace("$F", &f)
}

/// Full program source for a packed-pixel filter at `width`.
///
/// Returns `None` for filters that don't use packed buffers.
pub(crate) fn packed_source(filter: FilterKind, width: VectorWidth, entry: &str) -> Option<String> {
    let body = match filter {
        FilterKind::Grayscale => GRAYSCALE_PX,
        FilterKind::Sepia => SEPIA_PX,
        FilterKind::SepiaImage | FilterKind::ScaleNearest => return None,
    };

    let mut src = instantiate(body, "px_scalar", VectorWidth::X1);
    let kernel = match width {
        VectorWidth::X1 => SCALAR_KERNEL.replace("$ENTRY", entry),
        w => {
            src.push_str(&instantiate(body, "px_vector", w));
            VECTOR_KERNEL
                .replace("$ENTRY", entry)
                .replace("$W", &w.lanes().to_string())
        }
    };
    src.push_str(&kernel);
    Some(src)
}
