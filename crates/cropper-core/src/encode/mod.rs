//! Output encoding for cropped canvases.
//!
//! Canvases are RGBA8, row-major. PNG keeps the alpha channel; JPEG has
//! none, so transparent regions are composited onto black the way a 2D
//! canvas export does.
//!
//! # Examples
//!
//! ```ignore
//! use cropper_core::encode::{encode_canvas, OutputFormat};
//!
//! let canvas = vec![255u8; 100 * 100 * 4];
//! let png = encode_canvas(&canvas, 100, 100, OutputFormat::Png).unwrap();
//! assert_eq!(png.mime_type(), "image/png");
//! ```

mod jpeg;
mod png;

pub use jpeg::encode_jpeg;
pub use png::encode_png;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default JPEG quality for crop export.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Errors that can occur while encoding a canvas.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: &'static str,
        message: String,
    },
}

/// Encoded output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG with alpha.
    #[default]
    Png,
    /// JPEG at the given quality (1-100).
    Jpeg { quality: u8 },
}

impl OutputFormat {
    /// JPEG at [`DEFAULT_JPEG_QUALITY`].
    pub fn jpeg() -> Self {
        OutputFormat::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg { .. } => "image/jpeg",
        }
    }
}

/// An encoded crop.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Encode an RGBA canvas in the requested format.
pub fn encode_canvas(
    rgba: &[u8],
    width: u32,
    height: u32,
    format: OutputFormat,
) -> Result<EncodedImage, EncodeError> {
    let bytes = match format {
        OutputFormat::Png => encode_png(rgba, width, height)?,
        OutputFormat::Jpeg { quality } => encode_jpeg(rgba, width, height, quality)?,
    };
    Ok(EncodedImage {
        format,
        width,
        height,
        bytes,
    })
}

/// Shared input validation for the encoders.
fn validate_canvas(rgba: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * 4;
    if rgba.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: rgba.len(),
        });
    }
    Ok(())
}
