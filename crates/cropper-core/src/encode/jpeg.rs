//! JPEG encoding for crop export.
//!
//! Uses the `image` crate's JPEG encoder. The canvas alpha channel is
//! flattened onto black before encoding.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

use super::{validate_canvas, EncodeError};

/// Encode an RGBA canvas to JPEG bytes.
///
/// # Arguments
///
/// * `rgba` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `width` - Canvas width in pixels
/// * `height` - Canvas height in pixels
/// * `quality` - JPEG quality, clamped to 1-100
pub fn encode_jpeg(
    rgba: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate_canvas(rgba, width, height)?;

    let quality = quality.clamp(1, 100);
    let rgb = flatten_onto_black(rgba);

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder
        .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: "JPEG",
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

/// Drop alpha by compositing each pixel over black.
fn flatten_onto_black(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let alpha = px[3] as u32;
        for &channel in &px[..3] {
            rgb.push(((channel as u32 * alpha + 127) / 255) as u8);
        }
    }
    rgb
}
