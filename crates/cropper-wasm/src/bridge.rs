//! Adapters that let JavaScript callbacks serve as the cropper's host
//! services.
//!
//! Every JS callback is deferred to a microtask. A callback may call back
//! into the cropper (retry a load from the error handler, say), and the
//! cropper object is still borrowed while the call that triggered it runs.

use cropper_core::{ImageLoader, LoadTicket, WindowEvents};
use js_sys::{Array, Function};
use log::warn;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;

/// Call `callback` with `args` once the current call into wasm returns.
pub(crate) fn call_deferred(callback: Function, args: Vec<JsValue>, what: &'static str) {
    spawn_local(async move {
        let args: Array = args.into_iter().collect();
        if let Err(e) = callback.apply(&JsValue::NULL, &args) {
            warn!("{what} threw: {e:?}");
        }
    });
}

/// Image loader backed by a JS function `(src: string, ticket: number)`.
///
/// The function starts the load (typically by assigning `img.src`) and
/// reports back through `image_loaded` / `image_failed` with the ticket.
pub(crate) struct JsLoader {
    load: Function,
}

impl JsLoader {
    pub(crate) fn new(load: Function) -> Self {
        Self { load }
    }
}

impl ImageLoader for JsLoader {
    fn load(&mut self, src: &str, ticket: LoadTicket) {
        let args = vec![JsValue::from_str(src), JsValue::from_f64(ticket.id() as f64)];
        call_deferred(self.load.clone(), args, "image loader");
    }
}

/// Window listener subscription driven by two JS functions.
///
/// `attach` adds `mousemove`/`mouseup` listeners on `window`, `detach`
/// removes them. Both run synchronously so no window event slips between
/// the press and the subscription.
pub(crate) struct JsWindowBridge {
    attach: Function,
    detach: Function,
}

impl JsWindowBridge {
    pub(crate) fn new(attach: Function, detach: Function) -> Self {
        Self { attach, detach }
    }
}

impl WindowEvents for JsWindowBridge {
    fn attach(&mut self) {
        if let Err(e) = self.attach.call0(&JsValue::NULL) {
            warn!("window attach threw: {e:?}");
        }
    }

    fn detach(&mut self) {
        if let Err(e) = self.detach.call0(&JsValue::NULL) {
            warn!("window detach threw: {e:?}");
        }
    }
}
