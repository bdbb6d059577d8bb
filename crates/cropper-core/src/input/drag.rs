//! Drag state machine.
//!
//! ```text
//!            press                    move: pan_by(pos - last)
//!   Idle ───────────────▶ Dragging ◀──────────────┐
//!    ▲                      │  │                   │
//!    │ release / cancel /   │  └───────────────────┘
//!    │ context menu         │
//!    └──────────────────────┘
//! ```
//!
//! Moves apply incremental deltas (`current - last`), so dropped move
//! events shorten nothing: the next delivered move covers the gap.
//!
//! A mouse drag that leaves the element acquires window listeners; from
//! then on only window-origin moves are applied (element moves would be
//! delivered twice through bubbling) and the listeners are released on
//! whichever path ends the drag.

use log::debug;

use super::window::{WindowEvents, WindowListeners};
use super::{EventOrigin, EventResponse, InputEvent, TouchPoint};
use crate::transform::TransformModel;
use crate::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Channel {
    Mouse,
    Touch(i64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging { channel: Channel, last: Point },
}

/// Translates input events into [`TransformModel`] operations.
#[derive(Debug)]
pub struct PointerDragController<W: WindowEvents> {
    state: DragState,
    window: WindowListeners<W>,
    zoom_step: f64,
    require_target_match: bool,
}

impl<W: WindowEvents> PointerDragController<W> {
    /// Create an idle controller.
    ///
    /// `zoom_step` is used for wheel zoom. With `require_target_match`,
    /// mouse presses on child elements do not start a drag.
    pub fn new(window: W, zoom_step: f64, require_target_match: bool) -> Self {
        Self {
            state: DragState::Idle,
            window: WindowListeners::new(window),
            zoom_step,
            require_target_match,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Whether window-level listeners are currently attached.
    pub fn window_attached(&self) -> bool {
        self.window.is_attached()
    }

    pub fn window(&self) -> &W {
        self.window.target()
    }

    /// Dispatch one event.
    pub fn handle(&mut self, event: &InputEvent<'_>, model: &mut TransformModel) -> EventResponse {
        match *event {
            InputEvent::MouseDown {
                position,
                on_target,
            } => self.mouse_down(position, on_target),
            InputEvent::MouseMove { position, origin } => self.mouse_move(position, origin, model),
            InputEvent::MouseUp { origin } => self.mouse_up(origin),
            InputEvent::MouseLeave => self.mouse_leave(),
            InputEvent::Wheel { delta_y } => self.wheel(delta_y, model),
            InputEvent::ContextMenu => {
                self.cancel();
                EventResponse::consumed(false)
            }
            InputEvent::TouchStart { touches } => self.touch_start(touches),
            InputEvent::TouchMove { touches } => self.touch_move(touches, model),
            InputEvent::TouchEnd { changed } => self.touch_end(changed),
            InputEvent::TouchCancel => {
                if self.touch_channel().is_some() {
                    self.end_drag();
                }
                EventResponse::consumed(false)
            }
        }
    }

    /// End any drag in progress and release window listeners.
    ///
    /// Returns whether a drag was active.
    pub fn cancel(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.end_drag();
        was_dragging
    }

    fn mouse_down(&mut self, position: Point, on_target: bool) -> EventResponse {
        if self.require_target_match && !on_target {
            return EventResponse::ignored();
        }
        self.start_drag(Channel::Mouse, position);
        EventResponse::consumed(false)
    }

    fn mouse_move(
        &mut self,
        position: Point,
        origin: EventOrigin,
        model: &mut TransformModel,
    ) -> EventResponse {
        if !self.is_mouse_drag() {
            return EventResponse::consumed(false);
        }
        let accepted = match origin {
            EventOrigin::Element => !self.window.is_attached(),
            EventOrigin::Window => self.window.is_attached(),
        };
        if !accepted {
            return EventResponse::consumed(false);
        }
        EventResponse::consumed(self.move_to(position, model))
    }

    fn mouse_up(&mut self, origin: EventOrigin) -> EventResponse {
        let ends = match origin {
            EventOrigin::Element => self.is_mouse_drag(),
            EventOrigin::Window => self.window.is_attached(),
        };
        if ends {
            self.end_drag();
        }
        EventResponse::consumed(false)
    }

    fn mouse_leave(&mut self) -> EventResponse {
        if self.is_mouse_drag() && self.window.acquire() {
            debug!("pointer left element mid-drag, tracking window events");
        }
        // mouseleave is not cancelable
        EventResponse::ignored()
    }

    fn wheel(&mut self, delta_y: f64, model: &mut TransformModel) -> EventResponse {
        let changed = if delta_y < 0.0 {
            model.zoom_in(self.zoom_step)
        } else if delta_y > 0.0 {
            model.zoom_out(self.zoom_step)
        } else {
            false
        };
        EventResponse::consumed(changed)
    }

    fn touch_start(&mut self, touches: &[TouchPoint]) -> EventResponse {
        // Extra fingers never replace the primary touch.
        if self.touch_channel().is_none() {
            if let Some(primary) = touches.first() {
                self.start_drag(Channel::Touch(primary.id), primary.position);
            }
        }
        EventResponse::consumed(false)
    }

    fn touch_move(&mut self, touches: &[TouchPoint], model: &mut TransformModel) -> EventResponse {
        let Some(id) = self.touch_channel() else {
            return EventResponse::consumed(false);
        };
        let changed = match touches.iter().find(|t| t.id == id) {
            Some(primary) => self.move_to(primary.position, model),
            None => false,
        };
        EventResponse::consumed(changed)
    }

    fn touch_end(&mut self, changed: &[TouchPoint]) -> EventResponse {
        if let Some(id) = self.touch_channel() {
            if changed.is_empty() || changed.iter().any(|t| t.id == id) {
                self.end_drag();
            }
        }
        EventResponse::consumed(false)
    }

    fn start_drag(&mut self, channel: Channel, position: Point) {
        // A press while already dragging means the previous release was
        // lost; start over from a clean subscription.
        self.end_drag();
        debug!("drag started ({channel:?})");
        self.state = DragState::Dragging {
            channel,
            last: position,
        };
    }

    fn move_to(&mut self, position: Point, model: &mut TransformModel) -> bool {
        let DragState::Dragging { last, .. } = &mut self.state else {
            return false;
        };
        let (dx, dy) = (position.x - last.x, position.y - last.y);
        *last = position;
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        model.pan_by(dx, dy);
        true
    }

    fn end_drag(&mut self) {
        if let DragState::Dragging { channel, .. } = self.state {
            debug!("drag ended ({channel:?})");
        }
        self.state = DragState::Idle;
        self.window.release();
    }

    fn is_mouse_drag(&self) -> bool {
        matches!(
            self.state,
            DragState::Dragging {
                channel: Channel::Mouse,
                ..
            }
        )
    }

    fn touch_channel(&self) -> Option<i64> {
        match self.state {
            DragState::Dragging {
                channel: Channel::Touch(id),
                ..
            } => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScaleBounds;
    use crate::input::testing::RecordingWindow;

    fn setup() -> (PointerDragController<RecordingWindow>, TransformModel, RecordingWindow) {
        let window = RecordingWindow::default();
        let controller = PointerDragController::new(window.clone(), 0.05, false);
        let model = TransformModel::new(ScaleBounds::new(0.5, 3.0));
        (controller, model, window)
    }

    fn down(x: f64, y: f64) -> InputEvent<'static> {
        InputEvent::MouseDown {
            position: Point::new(x, y),
            on_target: true,
        }
    }

    fn mv(x: f64, y: f64) -> InputEvent<'static> {
        InputEvent::MouseMove {
            position: Point::new(x, y),
            origin: EventOrigin::Element,
        }
    }

    fn window_mv(x: f64, y: f64) -> InputEvent<'static> {
        InputEvent::MouseMove {
            position: Point::new(x, y),
            origin: EventOrigin::Window,
        }
    }

    const UP: InputEvent<'static> = InputEvent::MouseUp {
        origin: EventOrigin::Element,
    };
    const WINDOW_UP: InputEvent<'static> = InputEvent::MouseUp {
        origin: EventOrigin::Window,
    };

    #[test]
    fn test_mouse_drag_pans_by_deltas() {
        let (mut c, mut m, _) = setup();
        c.handle(&down(100.0, 100.0), &mut m);
        assert!(c.is_dragging());

        let r = c.handle(&mv(110.0, 95.0), &mut m);
        assert!(r.prevent_default);
        assert!(r.transform_changed);
        c.handle(&mv(130.0, 90.0), &mut m);
        c.handle(&UP, &mut m);

        assert!(!c.is_dragging());
        assert_eq!(m.transform().x(), 30.0);
        assert_eq!(m.transform().y(), -10.0);
    }

    #[test]
    fn test_move_without_press_is_ignored() {
        let (mut c, mut m, _) = setup();
        let r = c.handle(&mv(50.0, 50.0), &mut m);
        assert!(r.prevent_default);
        assert!(!r.transform_changed);
        assert_eq!(m.transform().x(), 0.0);
    }

    #[test]
    fn test_moves_after_release_are_ignored() {
        let (mut c, mut m, _) = setup();
        c.handle(&down(0.0, 0.0), &mut m);
        c.handle(&mv(5.0, 5.0), &mut m);
        c.handle(&UP, &mut m);
        c.handle(&mv(50.0, 50.0), &mut m);
        assert_eq!(m.transform().x(), 5.0);
    }

    #[test]
    fn test_target_match_required() {
        let window = RecordingWindow::default();
        let mut c = PointerDragController::new(window, 0.05, true);
        let mut m = TransformModel::new(ScaleBounds::new(0.5, 3.0));

        let r = c.handle(
            &InputEvent::MouseDown {
                position: Point::new(0.0, 0.0),
                on_target: false,
            },
            &mut m,
        );
        assert!(!c.is_dragging());
        assert!(!r.prevent_default);

        c.handle(&down(0.0, 0.0), &mut m);
        assert!(c.is_dragging());
    }

    #[test]
    fn test_leave_then_window_release() {
        let (mut c, mut m, window) = setup();
        c.handle(&down(10.0, 10.0), &mut m);
        c.handle(&mv(20.0, 10.0), &mut m);
        c.handle(&InputEvent::MouseLeave, &mut m);

        assert!(c.is_dragging());
        assert!(c.window_attached());
        assert_eq!(window.attached.get(), 1);

        c.handle(&window_mv(60.0, 30.0), &mut m);
        assert_eq!(m.transform().x(), 50.0);
        assert_eq!(m.transform().y(), 20.0);

        c.handle(&WINDOW_UP, &mut m);
        assert!(!c.is_dragging());
        assert!(!c.window_attached());
        assert_eq!(window.detached.get(), 1);

        // A second release has no effect
        c.handle(&WINDOW_UP, &mut m);
        c.handle(&UP, &mut m);
        assert_eq!(window.attached.get(), 1);
        assert_eq!(window.detached.get(), 1);
        assert_eq!(m.transform().x(), 50.0);
    }

    #[test]
    fn test_repeated_leave_attaches_once() {
        let (mut c, mut m, window) = setup();
        c.handle(&down(0.0, 0.0), &mut m);
        c.handle(&InputEvent::MouseLeave, &mut m);
        c.handle(&InputEvent::MouseLeave, &mut m);
        c.handle(&InputEvent::MouseLeave, &mut m);
        assert_eq!(window.attached.get(), 1);
    }

    #[test]
    fn test_leave_while_idle_attaches_nothing() {
        let (mut c, mut m, window) = setup();
        let r = c.handle(&InputEvent::MouseLeave, &mut m);
        assert!(!r.prevent_default);
        assert_eq!(window.attached.get(), 0);
    }

    #[test]
    fn test_element_moves_ignored_while_window_attached() {
        let (mut c, mut m, _) = setup();
        c.handle(&down(0.0, 0.0), &mut m);
        c.handle(&InputEvent::MouseLeave, &mut m);

        // The pointer re-enters; the same move reaches element and window
        c.handle(&mv(15.0, 0.0), &mut m);
        c.handle(&window_mv(15.0, 0.0), &mut m);
        assert_eq!(m.transform().x(), 15.0);
    }

    #[test]
    fn test_window_moves_ignored_without_subscription() {
        let (mut c, mut m, _) = setup();
        c.handle(&down(0.0, 0.0), &mut m);
        c.handle(&window_mv(40.0, 0.0), &mut m);
        assert_eq!(m.transform().x(), 0.0);
    }

    #[test]
    fn test_element_release_after_leave_detaches() {
        let (mut c, mut m, window) = setup();
        c.handle(&down(0.0, 0.0), &mut m);
        c.handle(&InputEvent::MouseLeave, &mut m);
        c.handle(&UP, &mut m);
        assert!(!c.is_dragging());
        assert_eq!(window.live(), 0);
    }

    #[test]
    fn test_context_menu_ends_drag_and_detaches() {
        let (mut c, mut m, window) = setup();
        c.handle(&down(0.0, 0.0), &mut m);
        c.handle(&InputEvent::MouseLeave, &mut m);
        let r = c.handle(&InputEvent::ContextMenu, &mut m);
        assert!(r.prevent_default);
        assert!(!c.is_dragging());
        assert_eq!(window.detached.get(), 1);

        c.handle(&window_mv(100.0, 100.0), &mut m);
        assert_eq!(m.transform().x(), 0.0);
    }

    #[test]
    fn test_cancel_reports_previous_state() {
        let (mut c, mut m, window) = setup();
        assert!(!c.cancel());
        c.handle(&down(0.0, 0.0), &mut m);
        c.handle(&InputEvent::MouseLeave, &mut m);
        assert!(c.cancel());
        assert!(!c.cancel());
        assert_eq!(window.detached.get(), 1);
    }

    #[test]
    fn test_drop_mid_drag_detaches() {
        let (mut c, mut m, window) = setup();
        c.handle(&down(0.0, 0.0), &mut m);
        c.handle(&InputEvent::MouseLeave, &mut m);
        drop(c);
        assert_eq!(window.live(), 0);
    }

    #[test]
    fn test_press_during_drag_restarts_cleanly() {
        let (mut c, mut m, window) = setup();
        c.handle(&down(0.0, 0.0), &mut m);
        c.handle(&InputEvent::MouseLeave, &mut m);
        c.handle(&down(500.0, 500.0), &mut m);
        assert_eq!(window.live(), 0);

        c.handle(&mv(505.0, 500.0), &mut m);
        assert_eq!(m.transform().x(), 5.0);

        // A new leave may attach again for the new drag
        c.handle(&InputEvent::MouseLeave, &mut m);
        assert_eq!(window.attached.get(), 2);
    }

    #[test]
    fn test_wheel_zooms() {
        let (mut c, mut m, _) = setup();
        let r = c.handle(&InputEvent::Wheel { delta_y: -120.0 }, &mut m);
        assert!(r.prevent_default);
        assert!(r.transform_changed);
        assert_eq!(m.scale(), 1.05);

        c.handle(&InputEvent::Wheel { delta_y: 120.0 }, &mut m);
        c.handle(&InputEvent::Wheel { delta_y: 120.0 }, &mut m);
        // 1.05 * 0.95 = 0.9975 -> 1.0, 1.0 * 0.95 = 0.95
        assert_eq!(m.scale(), 0.95);
    }

    #[test]
    fn test_horizontal_wheel_does_not_zoom() {
        let (mut c, mut m, _) = setup();
        let r = c.handle(&InputEvent::Wheel { delta_y: 0.0 }, &mut m);
        assert!(r.prevent_default);
        assert!(!r.transform_changed);
        assert_eq!(m.scale(), 1.0);
    }

    #[test]
    fn test_wheel_during_drag_keeps_drag() {
        let (mut c, mut m, _) = setup();
        c.handle(&down(0.0, 0.0), &mut m);
        c.handle(&InputEvent::Wheel { delta_y: -1.0 }, &mut m);
        assert!(c.is_dragging());
        c.handle(&mv(3.0, 4.0), &mut m);
        assert_eq!(m.transform().x(), 3.0);
    }

    #[test]
    fn test_touch_drag() {
        let (mut c, mut m, _) = setup();
        let start = [TouchPoint::new(7, 10.0, 10.0)];
        c.handle(&InputEvent::TouchStart { touches: &start }, &mut m);
        assert!(c.is_dragging());

        let moved = [TouchPoint::new(7, 25.0, 4.0)];
        let r = c.handle(&InputEvent::TouchMove { touches: &moved }, &mut m);
        assert!(r.prevent_default);
        assert!(r.transform_changed);

        c.handle(&InputEvent::TouchEnd { changed: &moved }, &mut m);
        assert!(!c.is_dragging());
        assert_eq!(m.transform().x(), 15.0);
        assert_eq!(m.transform().y(), -6.0);
    }

    #[test]
    fn test_secondary_touch_is_ignored() {
        let (mut c, mut m, _) = setup();
        c.handle(
            &InputEvent::TouchStart {
                touches: &[TouchPoint::new(1, 0.0, 0.0)],
            },
            &mut m,
        );
        // Second finger lands far away
        c.handle(
            &InputEvent::TouchStart {
                touches: &[TouchPoint::new(1, 0.0, 0.0), TouchPoint::new(2, 300.0, 300.0)],
            },
            &mut m,
        );
        // Only the second finger moves
        c.handle(
            &InputEvent::TouchMove {
                touches: &[TouchPoint::new(1, 0.0, 0.0), TouchPoint::new(2, 350.0, 320.0)],
            },
            &mut m,
        );
        assert_eq!(m.transform().x(), 0.0);

        // Lifting the second finger keeps the drag alive
        c.handle(
            &InputEvent::TouchEnd {
                changed: &[TouchPoint::new(2, 350.0, 320.0)],
            },
            &mut m,
        );
        assert!(c.is_dragging());

        c.handle(
            &InputEvent::TouchMove {
                touches: &[TouchPoint::new(1, 8.0, -2.0)],
            },
            &mut m,
        );
        assert_eq!(m.transform().x(), 8.0);
        assert_eq!(m.transform().y(), -2.0);
    }

    #[test]
    fn test_touch_start_without_touches_is_ignored() {
        let (mut c, mut m, _) = setup();
        c.handle(&InputEvent::TouchStart { touches: &[] }, &mut m);
        assert!(!c.is_dragging());
    }

    #[test]
    fn test_touch_cancel_ends_drag() {
        let (mut c, mut m, _) = setup();
        c.handle(
            &InputEvent::TouchStart {
                touches: &[TouchPoint::new(1, 0.0, 0.0)],
            },
            &mut m,
        );
        let r = c.handle(&InputEvent::TouchCancel, &mut m);
        assert!(r.prevent_default);
        assert!(!c.is_dragging());
    }

    #[test]
    fn test_touch_end_does_not_end_mouse_drag() {
        let (mut c, mut m, _) = setup();
        c.handle(&down(0.0, 0.0), &mut m);
        c.handle(&InputEvent::TouchEnd { changed: &[] }, &mut m);
        c.handle(&InputEvent::TouchCancel, &mut m);
        assert!(c.is_dragging());
    }

    #[test]
    fn test_mouse_up_does_not_end_touch_drag() {
        let (mut c, mut m, _) = setup();
        c.handle(
            &InputEvent::TouchStart {
                touches: &[TouchPoint::new(1, 0.0, 0.0)],
            },
            &mut m,
        );
        c.handle(&UP, &mut m);
        assert!(c.is_dragging());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
