//! CSS-equivalent positioning for the displayed image.
//!
//! The host layer places the image element so that, before any transform,
//! its natural-size box is centered in the container. The pan/scale
//! transform is then applied around the image center (the default CSS
//! `transform-origin`), which keeps the zoom anchor on the viewport center.

use std::fmt;

use serde::Serialize;

use super::model::Transform;
use crate::ImageMetrics;

/// Structured form of the image element's style.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AffineDescriptor {
    /// Horizontal pan in display pixels.
    pub translate_x: f64,
    /// Vertical pan in display pixels.
    pub translate_y: f64,
    /// Uniform scale.
    pub scale: f64,
    /// Offset subtracted from 50% of the container width to center the image.
    pub half_width: f64,
    /// Offset subtracted from 50% of the container height to center the image.
    pub half_height: f64,
}

impl AffineDescriptor {
    /// Value for the CSS `transform` property.
    pub fn css_transform(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }

    /// Value for the CSS `top` property.
    pub fn css_top(&self) -> String {
        format!("calc(50% - {}px)", self.half_height)
    }

    /// Value for the CSS `left` property.
    pub fn css_left(&self) -> String {
        format!("calc(50% - {}px)", self.half_width)
    }
}

impl fmt::Display for AffineDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "top: {}; left: {}; transform: {}",
            self.css_top(),
            self.css_left(),
            self.css_transform()
        )
    }
}

/// Compute the image element style for a transform.
///
/// Pure: call again whenever the transform or the image changes.
pub fn style_of(transform: &Transform, image: &ImageMetrics) -> AffineDescriptor {
    AffineDescriptor {
        translate_x: transform.x(),
        translate_y: transform.y(),
        scale: transform.scale(),
        half_width: image.natural_width as f64 / 2.0,
        half_height: image.natural_height as f64 / 2.0,
    }
}
