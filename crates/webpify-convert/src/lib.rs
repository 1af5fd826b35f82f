//! Decodes source images and re-encodes them as lossy WebP.

use image::{DynamicImage, RgbImage, RgbaImage};
use thiserror::Error;
use webp::{Encoder, WebPConfig};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("webp encode failed: {0}")]
    Encode(String),
}

/// Result of one transcode: the encoded payload plus the numbers needed for
/// reporting and metadata.
#[derive(Debug, Clone)]
pub struct TranscodedWebp {
    pub bytes: Vec<u8>,
    pub original_len: usize,
    pub width: u32,
    pub height: u32,
    pub alpha: bool,
}

impl TranscodedWebp {
    /// Size reduction relative to the source, in percent. Negative when the
    /// WebP came out larger than the original.
    pub fn compression_ratio(&self) -> f64 {
        compression_ratio(self.original_len, self.bytes.len())
    }
}

pub fn compression_ratio(original: usize, converted: usize) -> f64 {
    (original as f64 - converted as f64) / original as f64 * 100.0
}

/// Pixel buffer after colour-mode normalization. The encoded output carries
/// either opaque RGB or RGBA, nothing else.
enum NormalizedImage {
    Rgb(RgbImage),
    Rgba(RgbaImage),
}

/// Anything with an alpha channel keeps it; every other mode is flattened to
/// opaque RGB. Paletted sources are expanded by the decoder before we see
/// them: a declared transparency entry surfaces as an alpha channel, an
/// opaque palette as plain RGB.
fn normalize(image: DynamicImage) -> NormalizedImage {
    if image.color().has_alpha() {
        NormalizedImage::Rgba(image.into_rgba8())
    } else {
        NormalizedImage::Rgb(image.into_rgb8())
    }
}

/// Decodes `bytes`, normalizes the colour mode, and encodes lossy WebP at
/// `quality` (0-100) with the slowest, strongest compression effort.
pub fn transcode_to_webp(bytes: &[u8], quality: u8) -> Result<TranscodedWebp, ConvertError> {
    let decoded = image::load_from_memory(bytes)?;
    let normalized = normalize(decoded);

    let (encoder, width, height, alpha) = match &normalized {
        NormalizedImage::Rgb(pixels) => (
            Encoder::from_rgb(pixels.as_raw(), pixels.width(), pixels.height()),
            pixels.width(),
            pixels.height(),
            false,
        ),
        NormalizedImage::Rgba(pixels) => (
            Encoder::from_rgba(pixels.as_raw(), pixels.width(), pixels.height()),
            pixels.width(),
            pixels.height(),
            true,
        ),
    };

    let config = lossy_config(quality)?;
    let encoded = encoder
        .encode_advanced(&config)
        .map_err(|err| ConvertError::Encode(format!("{err:?}")))?;

    Ok(TranscodedWebp {
        bytes: encoded.to_vec(),
        original_len: bytes.len(),
        width,
        height,
        alpha,
    })
}

fn lossy_config(quality: u8) -> Result<WebPConfig, ConvertError> {
    let mut config = WebPConfig::new()
        .map_err(|()| ConvertError::Encode("libwebp rejected its default config".to_string()))?;
    config.lossless = 0;
    config.quality = f32::from(quality);
    config.method = 6; // slowest encode, smallest output
    Ok(config)
}

#[cfg(test)]
mod tests;
