//! The cropper session.
//!
//! [`ImageCropper`] owns the transform model, the drag controller and the
//! metrics of the current image, and exposes the operations a host binds
//! to its UI: loading, zooming, input handlers and crop export.
//!
//! # Loading
//!
//! Loading is asynchronous and owned by the host through [`ImageLoader`].
//! Each [`ImageCropper::load_image`] call issues a new [`LoadTicket`]; the
//! host reports the outcome with the same ticket. Only the most recent
//! ticket is honored, so a slow load that finishes after a newer one was
//! started cannot overwrite the newer image's metrics.
//!
//! Host callbacks never run while the cropper is borrowed. `load_image`
//! returns a [`LoadRequest`] the host starts on its loader, and the
//! outcome of a finished load is a [`LoadOutcome`] whose
//! [`notify`](LoadOutcome::notify) runs the error handler. A host that keeps
//! the cropper in a `RefCell` can therefore call back into it, for example
//! to load a fallback image from the error handler.
//!
//! ```ignore
//! let request = cropper.borrow_mut().load_image(src);
//! if let Some(request) = request {
//!     request.start(&mut loader);
//! }
//! // later, from the loader's completion callback
//! let outcome = cropper.borrow_mut().image_failed(ticket, error);
//! outcome.notify();
//! ```

use std::fmt;
use std::rc::Rc;

use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;

use crate::config::{CropperOptions, ScaleBounds};
use crate::encode::EncodedImage;
use crate::input::{EventResponse, InputEvent, PointerDragController, WindowEvents};
use crate::raster::DrawingSurface;
use crate::transform::{
    compute_crop_geometry, style_of, AffineDescriptor, CoordinateMapper, CropGeometry, Transform,
    TransformModel,
};
use crate::ImageMetrics;

/// Identifies one `load_image` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LoadTicket(u64);

impl LoadTicket {
    /// Rebuild a ticket from the raw value handed to the host.
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Why an image did not load.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LoadError {
    /// The host's loader reported a failure.
    #[error("Failed to load image: {0}")]
    Failed(String),

    /// The image loaded but has no pixels.
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Host-side image loading.
pub trait ImageLoader {
    /// Start loading `src`. The outcome is reported back through
    /// [`ImageCropper::image_loaded`] or [`ImageCropper::image_failed`]
    /// with the same ticket.
    fn load(&mut self, src: &str, ticket: LoadTicket);
}

/// Callback invoked once per failed load.
pub type ErrorHandler = Rc<dyn Fn(&LoadError)>;

/// A load the cropper is waiting for, not yet handed to the loader.
#[must_use = "the load does not start until `start` is called"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    src: String,
    ticket: LoadTicket,
}

impl LoadRequest {
    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn ticket(&self) -> LoadTicket {
        self.ticket
    }

    /// Hand the request to `loader`.
    pub fn start<L: ImageLoader + ?Sized>(self, loader: &mut L) -> LoadTicket {
        loader.load(&self.src, self.ticket);
        self.ticket
    }
}

/// Result of reporting a finished load.
#[must_use = "failed loads reach the error handler only through `notify`"]
#[derive(Clone)]
pub enum LoadOutcome {
    /// The ticket was stale or already answered.
    Ignored,
    /// The image became current.
    Loaded(ImageMetrics),
    /// The load failed; state is unchanged.
    Failed {
        error: LoadError,
        handler: Option<ErrorHandler>,
    },
}

impl LoadOutcome {
    /// Whether the ticket was the one the cropper was waiting for.
    pub fn is_accepted(&self) -> bool {
        !matches!(self, LoadOutcome::Ignored)
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            LoadOutcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Run the error handler for a failed load.
    ///
    /// Call after releasing any borrow of the cropper.
    pub fn notify(&self) {
        if let LoadOutcome::Failed {
            error,
            handler: Some(handler),
        } = self
        {
            handler(error);
        }
    }
}

impl fmt::Debug for LoadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadOutcome::Ignored => f.write_str("Ignored"),
            LoadOutcome::Loaded(metrics) => f.debug_tuple("Loaded").field(metrics).finish(),
            LoadOutcome::Failed { error, handler } => f
                .debug_struct("Failed")
                .field("error", error)
                .field("has_handler", &handler.is_some())
                .finish(),
        }
    }
}

/// One cropper widget instance.
pub struct ImageCropper<W: WindowEvents> {
    options: CropperOptions,
    model: TransformModel,
    controller: PointerDragController<W>,
    last_ticket: u64,
    pending: Option<LoadTicket>,
    image: Option<ImageMetrics>,
    on_error: Option<ErrorHandler>,
}

impl<W: WindowEvents> ImageCropper<W> {
    pub fn new(options: CropperOptions, window: W) -> Self {
        let model = TransformModel::new(options.scale);
        let controller =
            PointerDragController::new(window, options.zoom_step, options.require_target_match);
        Self {
            options,
            model,
            controller,
            last_ticket: 0,
            pending: None,
            image: None,
            on_error: None,
        }
    }

    /// Install the callback for failed loads.
    pub fn with_error_handler(mut self, handler: impl Fn(&LoadError) + 'static) -> Self {
        self.set_error_handler(handler);
        self
    }

    /// Replace the callback for failed loads.
    pub fn set_error_handler(&mut self, handler: impl Fn(&LoadError) + 'static) {
        self.on_error = Some(Rc::new(handler));
    }

    pub fn options(&self) -> &CropperOptions {
        &self.options
    }

    pub fn controller(&self) -> &PointerDragController<W> {
        &self.controller
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Start waiting for a new image source.
    ///
    /// An empty source is ignored: no ticket is issued and state is
    /// untouched.
    pub fn load_image(&mut self, src: &str) -> Option<LoadRequest> {
        if src.is_empty() {
            debug!("ignoring empty image source");
            return None;
        }
        self.last_ticket += 1;
        let ticket = LoadTicket(self.last_ticket);
        if let Some(superseded) = self.pending.replace(ticket) {
            debug!("load {} superseded by {}", superseded.0, ticket.0);
        }
        Some(LoadRequest {
            src: src.to_string(),
            ticket,
        })
    }

    /// Report a finished load.
    ///
    /// On acceptance the transform resets to identity and the metrics
    /// become current. Stale or repeated tickets are ignored. An image
    /// without pixels counts as a failed load.
    pub fn image_loaded(&mut self, ticket: LoadTicket, metrics: ImageMetrics) -> LoadOutcome {
        if !self.take_pending(ticket) {
            return LoadOutcome::Ignored;
        }
        if metrics.is_empty() {
            return self.failure(LoadError::EmptyImage {
                width: metrics.natural_width,
                height: metrics.natural_height,
            });
        }
        debug!(
            "image {} loaded ({}x{})",
            ticket.0, metrics.natural_width, metrics.natural_height
        );
        self.model.reset();
        self.image = Some(metrics);
        LoadOutcome::Loaded(metrics)
    }

    /// Report a failed load. State is left as it was.
    pub fn image_failed(&mut self, ticket: LoadTicket, error: LoadError) -> LoadOutcome {
        if !self.take_pending(ticket) {
            return LoadOutcome::Ignored;
        }
        self.failure(error)
    }

    /// Whether a load is in flight.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Metrics of the current image, if one has loaded.
    pub fn image_metrics(&self) -> Option<ImageMetrics> {
        self.image
    }

    fn take_pending(&mut self, ticket: LoadTicket) -> bool {
        if self.pending != Some(ticket) {
            warn!(
                "ignoring stale load result {} (current: {:?})",
                ticket.0,
                self.pending.map(|t| t.0)
            );
            return false;
        }
        self.pending = None;
        true
    }

    fn failure(&self, error: LoadError) -> LoadOutcome {
        warn!("{error}");
        LoadOutcome::Failed {
            error,
            handler: self.on_error.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Transform
    // ------------------------------------------------------------------

    /// Zoom in by `step`, or by the configured step when `None`.
    pub fn zoom_in(&mut self, step: Option<f64>) -> bool {
        self.model.zoom_in(step.unwrap_or(self.options.zoom_step))
    }

    /// Zoom out by `step`, or by the configured step when `None`.
    pub fn zoom_out(&mut self, step: Option<f64>) -> bool {
        self.model.zoom_out(step.unwrap_or(self.options.zoom_step))
    }

    pub fn set_zoom(&mut self, value: f64) -> bool {
        self.model.set_zoom(value)
    }

    /// Recenter at natural size.
    pub fn reset_zoom(&mut self) {
        self.model.reset();
    }

    pub fn transform(&self) -> Transform {
        self.model.transform()
    }

    /// Current scale read-out.
    pub fn scale(&self) -> f64 {
        self.model.scale()
    }

    /// Allowed scale range, e.g. for a zoom slider.
    pub fn scale_bounds(&self) -> ScaleBounds {
        self.model.bounds()
    }

    /// Style for the image element; zero-sized until an image loads.
    pub fn style(&self) -> AffineDescriptor {
        style_of(&self.model.transform(), &self.image.unwrap_or_default())
    }

    /// Coordinate mapping for the current state.
    pub fn mapper(&self) -> Option<CoordinateMapper> {
        self.image
            .map(|image| CoordinateMapper::new(self.model.transform(), image, self.options.stencil))
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    pub fn handle_event(&mut self, event: &InputEvent<'_>) -> EventResponse {
        self.controller.handle(event, &mut self.model)
    }

    /// End any drag in progress.
    pub fn cancel_drag(&mut self) -> bool {
        self.controller.cancel()
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Geometry of the visible crop, `None` until an image loads.
    pub fn crop_geometry(&self) -> Option<CropGeometry> {
        let transform = self.model.transform();
        self.image
            .map(|image| compute_crop_geometry(&transform, &image, &self.options.stencil))
    }

    /// Rasterize the visible crop through `surface`.
    ///
    /// Returns `None` when no image is loaded or the surface fails.
    pub fn get_cropped_image<S: DrawingSurface>(&self, surface: &mut S) -> Option<EncodedImage> {
        let geometry = self.crop_geometry()?;
        match surface.draw(&geometry) {
            Ok(encoded) => Some(encoded),
            Err(e) => {
                warn!("crop failed: {e}");
                None
            }
        }
    }
}
