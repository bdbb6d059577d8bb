//! PNG encoding for crop export.

use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

use super::{validate_canvas, EncodeError};

/// Encode an RGBA canvas to PNG bytes, keeping transparency.
pub fn encode_png(rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    validate_canvas(rgba, width, height)?;

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(rgba, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: "PNG",
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}
