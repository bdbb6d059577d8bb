//! Window-level listener subscription used for drag continuity.
//!
//! When the pointer leaves the tracked element mid-drag, move and release
//! events stop reaching it. The host then has to forward window-level
//! events instead. [`WindowListeners`] owns that subscription: it attaches
//! at most once and detaches exactly once, including when dropped.

/// Host hook that starts and stops forwarding window-level mouse move and
/// mouse up events to the controller (tagged [`super::EventOrigin::Window`]).
pub trait WindowEvents {
    /// Begin forwarding window move/release events.
    fn attach(&mut self);
    /// Stop forwarding window move/release events.
    fn detach(&mut self);
}

impl<W: WindowEvents + ?Sized> WindowEvents for Box<W> {
    fn attach(&mut self) {
        (**self).attach();
    }

    fn detach(&mut self) {
        (**self).detach();
    }
}

/// Exclusive owner of the window listener pair.
#[derive(Debug)]
pub(crate) struct WindowListeners<W: WindowEvents> {
    target: W,
    attached: bool,
}

impl<W: WindowEvents> WindowListeners<W> {
    pub(crate) fn new(target: W) -> Self {
        Self {
            target,
            attached: false,
        }
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.attached
    }

    /// Attach unless already attached. Returns whether anything happened.
    pub(crate) fn acquire(&mut self) -> bool {
        if self.attached {
            return false;
        }
        self.target.attach();
        self.attached = true;
        true
    }

    /// Detach if attached. Safe to call any number of times.
    pub(crate) fn release(&mut self) -> bool {
        if !self.attached {
            return false;
        }
        self.target.detach();
        self.attached = false;
        true
    }

    pub(crate) fn target(&self) -> &W {
        &self.target
    }
}

impl<W: WindowEvents> Drop for WindowListeners<W> {
    fn drop(&mut self) {
        self.release();
    }
}
