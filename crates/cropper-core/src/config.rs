//! Static cropper configuration.
//!
//! Options are supplied once at construction and never mutated afterward.
//! Every field except the stencil size has a default, so hosts can pass a
//! partial object and let serde fill in the rest.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::raster::SampleFilter;

/// Zoom step used by wheel input and by `zoom_in`/`zoom_out` without an
/// explicit step.
pub const DEFAULT_ZOOM_STEP: f64 = 0.05;

/// Default lower scale bound.
pub const DEFAULT_MIN_SCALE: f64 = 0.1;

/// Default upper scale bound.
pub const DEFAULT_MAX_SCALE: f64 = 10.0;

/// Problems detected by [`CropperOptions::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Stencil width or height is zero.
    #[error("Invalid stencil: width ({width}) and height ({height}) must be non-zero")]
    EmptyStencil { width: u32, height: u32 },

    /// A scale bound is NaN, infinite, or not positive.
    #[error("Invalid scale bound: {0} must be finite and positive")]
    InvalidScaleBound(f64),

    /// The lower bound is above the upper bound.
    #[error("Invalid scale range: min ({min}) is greater than max ({max})")]
    InvertedScaleRange { min: f64, max: f64 },

    /// Zoom step outside the open interval (0, 1).
    #[error("Invalid zoom step: {0} must be between 0 and 1")]
    InvalidZoomStep(f64),
}

/// Fixed pixel dimensions of the output crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StencilConfig {
    pub width: u32,
    pub height: u32,
}

impl StencilConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Inclusive scale bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_SCALE,
            max: DEFAULT_MAX_SCALE,
        }
    }
}

impl ScaleBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within `[min, max]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp `value` into the bounds.
    ///
    /// Unlike `f64::clamp` this never panics: with an inverted range the
    /// upper bound wins.
    pub fn clamp(&self, value: f64) -> f64 {
        if value > self.max {
            self.max
        } else if value < self.min {
            self.min
        } else {
            value
        }
    }
}

/// Full cropper configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropperOptions {
    /// Output crop size, also the size of the visible stencil window.
    pub stencil: StencilConfig,
    /// Allowed scale range.
    #[serde(default)]
    pub scale: ScaleBounds,
    /// Relative zoom step for wheel input and step-less zoom calls.
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,
    /// Only start a mouse drag when the press lands on the tracked element
    /// itself rather than one of its children.
    #[serde(default)]
    pub require_target_match: bool,
    /// Sampling filter used by the built-in CPU surface.
    #[serde(default)]
    pub filter: SampleFilter,
}

fn default_zoom_step() -> f64 {
    DEFAULT_ZOOM_STEP
}

impl CropperOptions {
    /// Options for a stencil of the given size with every other field at
    /// its default.
    pub fn new(stencil_width: u32, stencil_height: u32) -> Self {
        Self {
            stencil: StencilConfig::new(stencil_width, stencil_height),
            scale: ScaleBounds::default(),
            zoom_step: DEFAULT_ZOOM_STEP,
            require_target_match: false,
            filter: SampleFilter::default(),
        }
    }

    /// Builder-style override of the scale bounds.
    pub fn with_scale(mut self, min: f64, max: f64) -> Self {
        self.scale = ScaleBounds::new(min, max);
        self
    }

    /// Check the options for contract violations.
    ///
    /// Nothing in the crate requires valid options to avoid panicking; this
    /// is for hosts that want to surface mistakes early.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let StencilConfig { width, height } = self.stencil;
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyStencil { width, height });
        }

        for bound in [self.scale.min, self.scale.max] {
            if !bound.is_finite() || bound <= 0.0 {
                return Err(ConfigError::InvalidScaleBound(bound));
            }
        }

        if self.scale.min > self.scale.max {
            return Err(ConfigError::InvertedScaleRange {
                min: self.scale.min,
                max: self.scale.max,
            });
        }

        if !(self.zoom_step > 0.0 && self.zoom_step < 1.0) {
            return Err(ConfigError::InvalidZoomStep(self.zoom_step));
        }

        Ok(())
    }
}
