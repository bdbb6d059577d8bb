//! Pointer, touch and wheel input.
//!
//! The host translates its platform events into [`InputEvent`] values and
//! feeds them to a [`PointerDragController`]. Every call returns an
//! [`EventResponse`] telling the host whether to suppress the platform's
//! default handling (text selection, page scroll, native touch gestures).

mod drag;
mod window;

pub use drag::PointerDragController;
pub use window::WindowEvents;

#[cfg(test)]
pub(crate) use window::testing;

use crate::Point;

/// Where a mouse event was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventOrigin {
    /// On the tracked element.
    #[default]
    Element,
    /// On the window, via the listeners requested by [`WindowEvents::attach`].
    Window,
}

/// One active touch point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    /// Platform touch identifier, stable for the lifetime of the touch.
    pub id: i64,
    pub position: Point,
}

impl TouchPoint {
    pub fn new(id: i64, x: f64, y: f64) -> Self {
        Self {
            id,
            position: Point::new(x, y),
        }
    }
}

/// Input events understood by the controller. Positions are client
/// coordinates; only differences between them are used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent<'a> {
    MouseDown {
        position: Point,
        /// Whether the press landed on the tracked element itself.
        on_target: bool,
    },
    MouseMove {
        position: Point,
        origin: EventOrigin,
    },
    MouseUp {
        origin: EventOrigin,
    },
    MouseLeave,
    Wheel {
        /// Vertical scroll amount; negative scrolls up.
        delta_y: f64,
    },
    ContextMenu,
    /// `touches` lists every touch currently on the surface.
    TouchStart {
        touches: &'a [TouchPoint],
    },
    /// `touches` lists every touch currently on the surface.
    TouchMove {
        touches: &'a [TouchPoint],
    },
    /// `changed` lists the touches that were lifted.
    TouchEnd {
        changed: &'a [TouchPoint],
    },
    TouchCancel,
}

/// What the host should do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventResponse {
    /// Call the platform's `preventDefault` equivalent.
    pub prevent_default: bool,
    /// The transform changed and the image style should be recomputed.
    pub transform_changed: bool,
}

impl EventResponse {
    pub(crate) fn ignored() -> Self {
        Self::default()
    }

    pub(crate) fn consumed(transform_changed: bool) -> Self {
        Self {
            prevent_default: true,
            transform_changed,
        }
    }
}
