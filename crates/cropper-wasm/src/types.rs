//! WASM-compatible wrapper for source pixels.

use cropper_core::{SourceImage, SurfaceError};
use wasm_bindgen::prelude::*;

/// Decoded pixels of the image being cropped.
///
/// The host decodes the image (e.g. from an `ImageData`) and hands the
/// pixels over once; the cropper samples from it on every export.
#[wasm_bindgen]
pub struct JsSourceImage {
    inner: SourceImage,
}

#[wasm_bindgen]
impl JsSourceImage {
    /// Wrap RGBA pixels (4 bytes per pixel, row-major order).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsSourceImage, JsValue> {
        from_rgba(width, height, pixels).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Wrap RGB pixels (3 bytes per pixel); alpha is set to opaque.
    pub fn from_rgb(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsSourceImage, JsValue> {
        SourceImage::from_rgb(width, height, &pixels)
            .map(|inner| JsSourceImage { inner })
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Number of bytes in the RGBA buffer.
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.pixels.len()
    }
}

impl JsSourceImage {
    pub(crate) fn inner(&self) -> &SourceImage {
        &self.inner
    }
}

fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsSourceImage, SurfaceError> {
    SourceImage::from_rgba(width, height, pixels).map(|inner| JsSourceImage { inner })
}
