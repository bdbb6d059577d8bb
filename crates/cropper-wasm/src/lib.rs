//! Cropper WASM - WebAssembly bindings for the stencil image cropper
//!
//! This crate exposes `cropper-core` to JavaScript/TypeScript as an
//! `ImageCropper` class. The host page keeps ownership of the DOM and
//! forwards events; the cropper answers with style updates and crops.
//!
//! # Module Structure
//!
//! - `cropper` - The `ImageCropper` class and its event handlers
//! - `bridge` - JS callbacks adapted to the core's loader/window seams
//! - `types` - WASM-compatible wrapper for source pixels
//!
//! # Usage
//!
//! ```typescript
//! import init, { ImageCropper, JsSourceImage } from '@cropper/wasm';
//!
//! await init();
//!
//! const cropper = new ImageCropper(options, load, attach, detach);
//! cropper.load_image(url);
//! // ...
//! const png = cropper.get_cropped_png(new JsSourceImage(w, h, rgba));
//! ```

use wasm_bindgen::prelude::*;

mod bridge;
mod cropper;
mod types;

pub use cropper::{JsEventResponse, JsImageCropper};
pub use types::JsSourceImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Warn
    };
    // A second call finds the logger already set; keep the first one.
    let _ = console_log::init_with_level(level);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
