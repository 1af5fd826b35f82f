use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Rgba, RgbaImage};

use crate::{compression_ratio, transcode_to_webp, ConvertError};

fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("png encode failed");
    buffer.into_inner()
}

fn checkerboard_rgba(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if (x + y) % 2 == 0 {
            Rgba([200, 40, 40, 255])
        } else {
            Rgba([40, 40, 200, 0])
        }
    })
}

#[test]
fn preserves_alpha_channel() {
    let source = DynamicImage::ImageRgba8(checkerboard_rgba(32, 32));
    let png = png_bytes(&source);

    let transcoded = transcode_to_webp(&png, 85).expect("transcode failed");
    assert!(transcoded.alpha);
    assert_eq!((transcoded.width, transcoded.height), (32, 32));

    let decoded = image::load_from_memory(&transcoded.bytes).expect("webp decode failed");
    assert!(decoded.color().has_alpha());

    // The alpha plane is stored losslessly, so exact values survive.
    let pixels = decoded.into_rgba8();
    assert_eq!(pixels.get_pixel(0, 0).0[3], 255);
    assert_eq!(pixels.get_pixel(1, 0).0[3], 0);
}

#[test]
fn flattens_greyscale_to_opaque_rgb() {
    let grey = GrayImage::from_fn(16, 16, |x, _| image::Luma([(x * 16) as u8]));
    let png = png_bytes(&DynamicImage::ImageLuma8(grey));

    let transcoded = transcode_to_webp(&png, 85).expect("transcode failed");
    assert!(!transcoded.alpha);

    let decoded = image::load_from_memory(&transcoded.bytes).expect("webp decode failed");
    assert!(!decoded.color().has_alpha());
}

#[test]
fn accepts_jpeg_sources() {
    let rgb = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(24, 24, image::Rgb([120, 80, 40])));
    let mut buffer = Cursor::new(Vec::new());
    rgb.write_to(&mut buffer, ImageFormat::Jpeg).expect("jpeg encode failed");

    let transcoded = transcode_to_webp(&buffer.into_inner(), 70).expect("transcode failed");
    assert!(!transcoded.alpha);
    assert_eq!((transcoded.width, transcoded.height), (24, 24));
}

#[test]
fn rejects_undecodable_bytes() {
    let err = transcode_to_webp(b"definitely not an image", 85).unwrap_err();
    assert!(matches!(err, ConvertError::Decode(_)));
}

#[test]
fn ratio_arithmetic_matches_definition() {
    assert_eq!(compression_ratio(1000, 250), 75.0);
    assert_eq!(format!("{:.1}%", compression_ratio(1000, 250)), "75.0%");
    assert_eq!(compression_ratio(100, 150), -50.0);
    assert_eq!(format!("{:.1}%", compression_ratio(3, 2)), "33.3%");
}

#[test]
fn reported_lengths_match_buffers() {
    let source = DynamicImage::ImageRgba8(checkerboard_rgba(48, 48));
    let png = png_bytes(&source);

    let transcoded = transcode_to_webp(&png, 85).expect("transcode failed");
    assert_eq!(transcoded.original_len, png.len());
    assert_eq!(
        transcoded.compression_ratio(),
        compression_ratio(png.len(), transcoded.bytes.len())
    );
}
