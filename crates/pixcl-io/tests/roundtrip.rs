//! File-level read/write through the format dispatcher.

use pixcl_core::{Bitmap, Colorspace, Rgba};
use pixcl_io::{Format, IoError, read, write, write_as};
use tempfile::TempDir;

fn checker(width: u32, height: u32) -> Bitmap {
    let mut bmp = Bitmap::new(width, height).unwrap();
    for y in 0..height {
        for x in 0..width {
            let px = if (x + y) % 2 == 0 {
                Rgba::new(250, 10, 10, 255)
            } else {
                Rgba::new(10, 10, 250, 128)
            };
            bmp.set_pixel(x, y, px).unwrap();
        }
    }
    bmp
}

#[test]
fn png_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.png");
    let bmp = checker(7, 5);

    write(&path, &bmp, Colorspace::Rgba).unwrap();
    assert_eq!(Format::detect(&path).unwrap(), Format::Png);
    assert_eq!(read(&path).unwrap(), bmp);
}

#[test]
fn tga_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.tga");
    let bmp = checker(3, 9);

    write(&path, &bmp, Colorspace::Rgba).unwrap();
    assert_eq!(read(&path).unwrap(), bmp);
}

#[test]
fn magic_bytes_beat_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("actually_png.tga");
    let bmp = checker(4, 4);

    write_as(&path, &bmp, Format::Png, Colorspace::Rgb).unwrap();
    assert_eq!(Format::detect(&path).unwrap(), Format::Png);

    let loaded = read(&path).unwrap();
    assert_eq!(loaded.pixel(1, 0).unwrap(), Rgba::opaque(10, 10, 250));
}

#[test]
fn jpeg_file_roundtrip_is_close() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flat.jpg");
    let bmp = Bitmap::filled(32, 32, Rgba::opaque(90, 160, 30)).unwrap();

    write(&path, &bmp, Colorspace::Rgb).unwrap();
    let loaded = read(&path).unwrap();
    assert_eq!(loaded.size(), bmp.size());
    assert!(loaded.pixel(16, 16).unwrap().max_channel_diff(Rgba::opaque(90, 160, 30)) <= 3);
}

#[test]
fn jpeg_with_alpha_is_rejected() {
    let dir = TempDir::new().unwrap();
    let bmp = checker(2, 2);
    let err = write(dir.path().join("a.jpg"), &bmp, Colorspace::Rgba).unwrap_err();
    assert!(matches!(err, IoError::UnsupportedColorspace { .. }));
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let bmp = checker(2, 2);
    let err = write(dir.path().join("a.bmp"), &bmp, Colorspace::Rgba).unwrap_err();
    assert!(matches!(err, IoError::UnsupportedFormat(_)));
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = read(dir.path().join("nope.png")).unwrap_err();
    assert!(matches!(err, IoError::Io(_)));
}
