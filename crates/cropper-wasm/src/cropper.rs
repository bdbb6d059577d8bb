//! The `ImageCropper` class exposed to JavaScript.
//!
//! The host owns the DOM: it forwards element and window events to the
//! handler methods, applies `style()` to the image element after every
//! call that reports `transform_changed`, and performs image loading
//! through the `load` callback given to the constructor.
//!
//! The `load` and `on_error` callbacks run on a microtask after the call
//! that triggered them has returned, so they may call back into the
//! cropper (for example to load a fallback image).
//!
//! # Example
//!
//! ```typescript
//! const cropper = new ImageCropper(
//!   { stencil: { width: 300, height: 300 }, scale: { min: 0.2, max: 5 } },
//!   (src, ticket) => {
//!     img.onload = () => cropper.image_loaded(ticket, img.naturalWidth, img.naturalHeight);
//!     img.onerror = () => cropper.image_failed(ticket, `could not load ${src}`);
//!     img.src = src;
//!   },
//!   () => { window.addEventListener('mousemove', onMove); window.addEventListener('mouseup', onUp); },
//!   () => { window.removeEventListener('mousemove', onMove); window.removeEventListener('mouseup', onUp); },
//!   (message) => console.error(message),
//! );
//! ```

use cropper_core::cropper::{LoadError, LoadOutcome};
use cropper_core::{
    CpuSurface, CropperOptions, EventOrigin, EventResponse, ImageCropper, ImageMetrics, InputEvent,
    LoadTicket, OutputFormat, Point, TouchPoint, ViewportMetrics,
};
use js_sys::Function;
use log::{debug, warn};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::bridge::{call_deferred, JsLoader, JsWindowBridge};
use crate::types::JsSourceImage;

/// Largest integer a JS number represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// What the host should do with the DOM event it just forwarded.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsEventResponse {
    /// Call `event.preventDefault()`.
    pub prevent_default: bool,
    /// Re-apply `style()` to the image element.
    pub transform_changed: bool,
}

impl From<EventResponse> for JsEventResponse {
    fn from(r: EventResponse) -> Self {
        Self {
            prevent_default: r.prevent_default,
            transform_changed: r.transform_changed,
        }
    }
}

/// Stencil image cropper.
#[wasm_bindgen(js_name = ImageCropper)]
pub struct JsImageCropper {
    inner: ImageCropper<JsWindowBridge>,
    loader: JsLoader,
}

#[wasm_bindgen(js_class = ImageCropper)]
impl JsImageCropper {
    /// Create a cropper.
    ///
    /// # Arguments
    ///
    /// * `options` - `{ stencil: {width, height}, scale?: {min, max}, zoom_step?,
    ///   require_target_match?, filter? }`
    /// * `load` - `(src, ticket) => void`, starts loading an image
    /// * `attach` / `detach` - add / remove the window drag listeners
    /// * `on_error` - optional `(message) => void` for failed loads
    #[wasm_bindgen(constructor)]
    pub fn new(
        options: JsValue,
        load: Function,
        attach: Function,
        detach: Function,
        on_error: Option<Function>,
    ) -> Result<JsImageCropper, JsValue> {
        let options: CropperOptions = serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsValue::from_str(&format!("Invalid cropper options: {}", e)))?;
        if let Err(e) = options.validate() {
            warn!("cropper options: {e}");
        }

        let mut inner = ImageCropper::new(options, JsWindowBridge::new(attach, detach));
        if let Some(callback) = on_error {
            inner = inner.with_error_handler(move |error: &LoadError| {
                let message = JsValue::from_str(&error.to_string());
                call_deferred(callback.clone(), vec![message], "error handler");
            });
        }
        Ok(JsImageCropper {
            inner,
            loader: JsLoader::new(load),
        })
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Start loading `src`. Returns the load ticket, or `undefined` when
    /// `src` is empty.
    pub fn load_image(&mut self, src: &str) -> Option<f64> {
        let request = self.inner.load_image(src)?;
        Some(request.start(&mut self.loader).id() as f64)
    }

    /// Report a finished load. Returns whether it was accepted.
    pub fn image_loaded(&mut self, ticket: f64, natural_width: u32, natural_height: u32) -> bool {
        let Some(ticket) = ticket_from_js(ticket) else {
            return false;
        };
        let metrics = ImageMetrics::new(natural_width, natural_height);
        settle(self.inner.image_loaded(ticket, metrics))
    }

    /// Report a failed load. Returns whether it was accepted.
    pub fn image_failed(&mut self, ticket: f64, message: &str) -> bool {
        let Some(ticket) = ticket_from_js(ticket) else {
            return false;
        };
        settle(self.inner.image_failed(ticket, LoadError::Failed(message.to_string())))
    }

    #[wasm_bindgen(getter)]
    pub fn is_loading(&self) -> bool {
        self.inner.is_loading()
    }

    // ------------------------------------------------------------------
    // Zoom
    // ------------------------------------------------------------------

    pub fn zoom_in(&mut self, step: Option<f64>) -> bool {
        self.inner.zoom_in(step)
    }

    pub fn zoom_out(&mut self, step: Option<f64>) -> bool {
        self.inner.zoom_out(step)
    }

    pub fn set_zoom(&mut self, value: f64) -> bool {
        self.inner.set_zoom(value)
    }

    pub fn reset_zoom(&mut self) {
        self.inner.reset_zoom();
    }

    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.inner.scale()
    }

    #[wasm_bindgen(getter)]
    pub fn min_scale(&self) -> f64 {
        self.inner.scale_bounds().min
    }

    #[wasm_bindgen(getter)]
    pub fn max_scale(&self) -> f64 {
        self.inner.scale_bounds().max
    }

    // ------------------------------------------------------------------
    // Read-outs
    // ------------------------------------------------------------------

    /// `{ x, y, scale }`.
    pub fn transform(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.transform())
    }

    /// Full style descriptor of the image element.
    pub fn style(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.style())
    }

    /// Value for the image element's CSS `transform`.
    pub fn css_transform(&self) -> String {
        self.inner.style().css_transform()
    }

    /// Value for the image element's CSS `top`.
    pub fn css_top(&self) -> String {
        self.inner.style().css_top()
    }

    /// Value for the image element's CSS `left`.
    pub fn css_left(&self) -> String {
        self.inner.style().css_left()
    }

    /// Crop geometry for a canvas-based export, `undefined` without an image.
    pub fn crop_geometry(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.crop_geometry())
    }

    /// Whether the image covers the whole stencil, so the crop has no
    /// transparent border. `false` without an image.
    pub fn covers_stencil(&self) -> bool {
        self.inner
            .crop_geometry()
            .is_some_and(|g| g.covers_stencil())
    }

    /// Map a point in container coordinates to source pixel coordinates.
    ///
    /// Returns `[x, y]`, or `undefined` without an image.
    pub fn viewport_to_source(
        &self,
        viewport_width: f64,
        viewport_height: f64,
        x: f64,
        y: f64,
    ) -> Option<Vec<f64>> {
        let viewport = ViewportMetrics::new(viewport_width, viewport_height);
        self.inner.mapper().map(|m| {
            let p = m.viewport_to_source(&viewport, Point::new(x, y));
            vec![p.x, p.y]
        })
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Crop the visible region of `image` to PNG bytes.
    ///
    /// Returns `undefined` when no image is loaded or the crop fails.
    pub fn get_cropped_png(&self, image: &JsSourceImage) -> Option<Vec<u8>> {
        self.crop(image, OutputFormat::Png)
    }

    /// Crop the visible region of `image` to JPEG bytes.
    pub fn get_cropped_jpeg(&self, image: &JsSourceImage, quality: u8) -> Option<Vec<u8>> {
        self.crop(image, OutputFormat::Jpeg { quality })
    }

    // ------------------------------------------------------------------
    // Element events
    // ------------------------------------------------------------------

    /// `mousedown` on the image. `on_target` is `event.target === img`.
    pub fn mousedown(&mut self, x: f64, y: f64, on_target: bool) -> JsEventResponse {
        self.dispatch(&InputEvent::MouseDown {
            position: Point::new(x, y),
            on_target,
        })
    }

    /// `mousemove` from the image, or from `window` when `from_window`.
    pub fn mousemove(&mut self, x: f64, y: f64, from_window: bool) -> JsEventResponse {
        self.dispatch(&InputEvent::MouseMove {
            position: Point::new(x, y),
            origin: origin(from_window),
        })
    }

    /// `mouseup` from the image, or from `window` when `from_window`.
    pub fn mouseup(&mut self, from_window: bool) -> JsEventResponse {
        self.dispatch(&InputEvent::MouseUp {
            origin: origin(from_window),
        })
    }

    pub fn mouseleave(&mut self) -> JsEventResponse {
        self.dispatch(&InputEvent::MouseLeave)
    }

    /// `wheel`; pass `event.deltaY`.
    pub fn wheel(&mut self, delta_y: f64) -> JsEventResponse {
        self.dispatch(&InputEvent::Wheel { delta_y })
    }

    pub fn contextmenu(&mut self) -> JsEventResponse {
        self.dispatch(&InputEvent::ContextMenu)
    }

    /// `touchstart`; `touches` is flattened `[id, x, y, id, x, y, ...]`.
    pub fn touchstart(&mut self, touches: &[f64]) -> JsEventResponse {
        let touches = parse_touches(touches);
        self.dispatch(&InputEvent::TouchStart { touches: &touches })
    }

    /// `touchmove`; same layout as `touchstart`.
    pub fn touchmove(&mut self, touches: &[f64]) -> JsEventResponse {
        let touches = parse_touches(touches);
        self.dispatch(&InputEvent::TouchMove { touches: &touches })
    }

    /// `touchend`; pass `event.changedTouches` in the flattened layout.
    pub fn touchend(&mut self, changed: &[f64]) -> JsEventResponse {
        let changed = parse_touches(changed);
        self.dispatch(&InputEvent::TouchEnd { changed: &changed })
    }

    pub fn touchcancel(&mut self) -> JsEventResponse {
        self.dispatch(&InputEvent::TouchCancel)
    }

    #[wasm_bindgen(getter)]
    pub fn is_dragging(&self) -> bool {
        self.inner.controller().is_dragging()
    }
}

impl JsImageCropper {
    fn dispatch(&mut self, event: &InputEvent<'_>) -> JsEventResponse {
        self.inner.handle_event(event).into()
    }

    fn crop(&self, image: &JsSourceImage, format: OutputFormat) -> Option<Vec<u8>> {
        let mut surface = CpuSurface::new(image.inner())
            .with_filter(self.inner.options().filter)
            .with_format(format);
        let encoded = self.inner.get_cropped_image(&mut surface)?;
        debug!(
            "exported {}x{} {}",
            encoded.width,
            encoded.height,
            encoded.mime_type()
        );
        Some(encoded.bytes)
    }
}

/// Hand a load result's error to the handler and report acceptance.
fn settle(outcome: LoadOutcome) -> bool {
    outcome.notify();
    outcome.is_accepted()
}

fn origin(from_window: bool) -> EventOrigin {
    if from_window {
        EventOrigin::Window
    } else {
        EventOrigin::Element
    }
}

/// Convert a JS ticket number back to a [`LoadTicket`].
///
/// Anything that is not a non-negative safe integer cannot have been issued
/// by `load_image` and is rejected.
fn ticket_from_js(value: f64) -> Option<LoadTicket> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= MAX_SAFE_INTEGER {
        Some(LoadTicket::from_raw(value as u64))
    } else {
        warn!("ignoring malformed load ticket {value}");
        None
    }
}

/// Unflatten `[id, x, y, ...]` triples. A trailing partial triple is dropped.
fn parse_touches(flat: &[f64]) -> Vec<TouchPoint> {
    flat.chunks_exact(3)
        .map(|t| TouchPoint::new(t[0] as i64, t[1], t[2]))
        .collect()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}


/// WASM-specific tests that need real JS functions and values.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_futures::JsFuture;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn options() -> JsValue {
        js_sys::JSON::parse(r#"{"stencil":{"width":100,"height":100},"scale":{"min":0.5,"max":3}}"#)
            .unwrap()
    }

    fn noop() -> Function {
        Function::new_no_args("")
    }

    fn cropper() -> JsImageCropper {
        let load = Function::new_with_args("src, ticket", "");
        JsImageCropper::new(options(), load, noop(), noop(), None).unwrap()
    }

    fn global(key: &str) -> JsValue {
        js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str(key)).unwrap()
    }

    async fn next_tick() {
        JsFuture::from(js_sys::Promise::resolve(&JsValue::NULL))
            .await
            .unwrap();
    }

    #[wasm_bindgen_test]
    fn test_invalid_options_rejected() {
        let bad = JsValue::from_str("not options");
        assert!(JsImageCropper::new(bad, noop(), noop(), noop(), None).is_err());
    }

    #[wasm_bindgen_test]
    fn test_load_and_crop() {
        let mut c = cropper();
        let ticket = c.load_image("photo.png").unwrap();
        assert!(c.is_loading());
        assert!(c.image_loaded(ticket, 100, 100));
        assert!(!c.image_loaded(ticket, 100, 100));

        let image = JsSourceImage::new(100, 100, vec![255; 100 * 100 * 4]).unwrap();
        let png = c.get_cropped_png(&image).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[wasm_bindgen_test]
    fn test_empty_src_returns_undefined() {
        let mut c = cropper();
        assert!(c.load_image("").is_none());
    }

    #[wasm_bindgen_test]
    fn test_wheel_and_style() {
        let mut c = cropper();
        let r = c.wheel(-100.0);
        assert!(r.prevent_default);
        assert!(r.transform_changed);
        assert_eq!(c.scale(), 1.05);
        assert_eq!(c.css_transform(), "translate(0px, 0px) scale(1.05)");
    }

    #[wasm_bindgen_test]
    fn test_scale_bounds_and_coverage() {
        let mut c = cropper();
        assert_eq!(c.min_scale(), 0.5);
        assert_eq!(c.max_scale(), 3.0);
        assert!(!c.covers_stencil());

        let ticket = c.load_image("photo.png").unwrap();
        assert!(c.image_loaded(ticket, 200, 200));
        assert!(c.covers_stencil());
        assert!(c.set_zoom(0.5));
        assert!(c.covers_stencil());
        c.mousedown(0.0, 0.0, true);
        c.mousemove(10.0, 0.0, false);
        assert!(!c.covers_stencil());
    }

    #[wasm_bindgen_test]
    fn test_drag_attaches_window_listeners() {
        let attach =
            Function::new_no_args("globalThis.__attached = (globalThis.__attached || 0) + 1;");
        let detach = Function::new_no_args("globalThis.__attached -= 1;");
        let mut c = JsImageCropper::new(options(), noop(), attach, detach, None).unwrap();

        c.mousedown(0.0, 0.0, true);
        assert!(c.is_dragging());
        c.mouseleave();
        let r = c.mousemove(5.0, 0.0, true);
        assert!(r.transform_changed);
        c.mouseup(true);
        assert!(!c.is_dragging());

        assert_eq!(global("__attached").as_f64(), Some(0.0));
    }

    #[wasm_bindgen_test]
    async fn test_error_callback_receives_message_after_return() {
        let on_error = Function::new_with_args("m", "globalThis.__cropError = m;");
        let mut c = JsImageCropper::new(options(), noop(), noop(), noop(), Some(on_error)).unwrap();
        let ticket = c.load_image("missing.png").unwrap();
        assert!(c.image_failed(ticket, "404"));
        assert!(global("__cropError").is_undefined());

        next_tick().await;
        assert_eq!(
            global("__cropError").as_string().unwrap(),
            "Failed to load image: 404"
        );
    }

    #[wasm_bindgen_test]
    async fn test_error_callback_can_load_fallback() {
        let load = Function::new_with_args(
            "src, ticket",
            "(globalThis.__fallbackLoads = globalThis.__fallbackLoads || []).push(src);",
        );
        let on_error = Function::new_no_args(
            "globalThis.__fallbackTicket = globalThis.__fallback.load_image('fallback.png');",
        );
        let mut c = JsImageCropper::new(options(), load, noop(), noop(), Some(on_error)).unwrap();
        let ticket = c.load_image("missing.png").unwrap();
        assert!(c.image_failed(ticket, "404"));

        let cropper = JsValue::from(c);
        js_sys::Reflect::set(&js_sys::global(), &JsValue::from_str("__fallback"), &cropper)
            .unwrap();
        for _ in 0..3 {
            next_tick().await;
        }

        assert_eq!(global("__fallbackTicket").as_f64(), Some(ticket + 1.0));
        let loads: Vec<String> = js_sys::Array::from(&global("__fallbackLoads"))
            .iter()
            .filter_map(|v| v.as_string())
            .collect();
        assert_eq!(loads, vec!["missing.png", "fallback.png"]);
    }
}
