//! Pan/zoom state with scale bounds.
//!
//! The model knows nothing about input devices. Every mutation goes through
//! one of the operations here, and each returns whether it changed anything
//! so callers can skip re-rendering on rejected input.
//!
//! # Rounding
//!
//! Relative zoom steps are rounded to two decimal places. Without this,
//! long runs of wheel events accumulate floating error and the scale read-out
//! drifts (`1.0 * 1.05 / 1.05 != 1.0`). Rounding introduces its own hazard:
//! at small scales `s * (1 + step)` can round back to `s`. When that happens
//! the step is widened to one rounding unit so zooming always makes progress.

use serde::Serialize;

use crate::config::ScaleBounds;

/// Smallest scale change a relative zoom can make.
const ROUNDING_UNIT: f64 = 0.01;

/// Round to two decimal places.
#[inline]
fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Pan offset and uniform scale applied to the displayed image.
///
/// `x`/`y` are in display pixels relative to the image's centered position.
/// Values of this type are only produced by [`TransformModel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    x: f64,
    y: f64,
    scale: f64,
}

impl Transform {
    /// The transform every image starts with: centered, natural size.
    pub const IDENTITY: Transform = Transform {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
    };

    /// Crate-internal constructor for geometry tests and the model itself.
    pub(crate) fn from_parts(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Owner of the current [`Transform`].
#[derive(Debug, Clone)]
pub struct TransformModel {
    transform: Transform,
    bounds: ScaleBounds,
}

impl TransformModel {
    /// Create a model at the identity transform.
    pub fn new(bounds: ScaleBounds) -> Self {
        Self {
            transform: Transform::IDENTITY,
            bounds,
        }
    }

    /// Current transform snapshot.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Current scale.
    pub fn scale(&self) -> f64 {
        self.transform.scale
    }

    pub fn bounds(&self) -> ScaleBounds {
        self.bounds
    }

    /// Grow the scale by `step` (e.g. `0.05` for +5%).
    ///
    /// Returns `false` without touching state when already at the upper
    /// bound or when `step` is not a positive finite number.
    pub fn zoom_in(&mut self, step: f64) -> bool {
        if !(step.is_finite() && step > 0.0) {
            return false;
        }
        let current = self.transform.scale;
        if current >= self.bounds.max {
            return false;
        }

        let mut next = round_hundredths(current * (1.0 + step));
        if next <= current {
            next = round_hundredths(current + ROUNDING_UNIT);
        }
        self.transform.scale = self.bounds.clamp(next);
        true
    }

    /// Shrink the scale by `step` (e.g. `0.05` for -5%).
    ///
    /// Returns `false` without touching state when already at the lower
    /// bound or when `step` is not a positive finite number.
    pub fn zoom_out(&mut self, step: f64) -> bool {
        if !(step.is_finite() && step > 0.0) {
            return false;
        }
        let current = self.transform.scale;
        if current <= self.bounds.min {
            return false;
        }

        let mut next = round_hundredths(current * (1.0 - step));
        if next >= current {
            next = round_hundredths(current - ROUNDING_UNIT);
        }
        self.transform.scale = self.bounds.clamp(next);
        true
    }

    /// Set the scale to exactly `value`.
    ///
    /// Values outside the bounds are rejected rather than clamped, so a
    /// slider overshooting its track cannot snap the image.
    pub fn set_zoom(&mut self, value: f64) -> bool {
        if !self.bounds.contains(value) {
            return false;
        }
        self.transform.scale = value;
        true
    }

    /// Move the image by a screen-space delta. Pan is unbounded.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.transform.x += dx;
        self.transform.y += dy;
    }

    /// Return to the identity transform.
    pub fn reset(&mut self) {
        self.transform = Transform::IDENTITY;
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
