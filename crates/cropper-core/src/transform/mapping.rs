//! Forward and inverse mapping between coordinate spaces.
//!
//! Three spaces are involved:
//!
//! - **Source**: natural image pixels, origin at the image's top-left.
//! - **Stencil**: display pixels, origin at the stencil window's top-left.
//! - **Viewport**: display pixels, origin at the container's top-left.
//!
//! The image is centered in the container before the transform applies,
//! and the stencil is centered in the container, so the two centers
//! coincide. A source point `u` lands at
//!
//! ```text
//! stencil_x = S.w / 2 + T.x + (u - I.w / 2) * T.scale
//! ```
//!
//! and the inverse is
//!
//! ```text
//! u = I.w / 2 + (stencil_x - S.w / 2 - T.x) / T.scale
//! ```

use super::model::Transform;
use crate::config::StencilConfig;
use crate::{ImageMetrics, Point, ViewportMetrics};

/// Point mapping for one transform/image/stencil snapshot.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    transform: Transform,
    image: ImageMetrics,
    stencil: StencilConfig,
}

impl CoordinateMapper {
    pub fn new(transform: Transform, image: ImageMetrics, stencil: StencilConfig) -> Self {
        Self {
            transform,
            image,
            stencil,
        }
    }

    /// Map a source pixel coordinate into stencil space.
    pub fn source_to_stencil(&self, source: Point) -> Point {
        let t = &self.transform;
        let (half_iw, half_ih) = self.half_image();
        let (half_sw, half_sh) = self.half_stencil();
        Point::new(
            half_sw + t.x() + (source.x - half_iw) * t.scale(),
            half_sh + t.y() + (source.y - half_ih) * t.scale(),
        )
    }

    /// Map a stencil-space point back to source pixels.
    pub fn stencil_to_source(&self, stencil: Point) -> Point {
        let t = &self.transform;
        let (half_iw, half_ih) = self.half_image();
        let (half_sw, half_sh) = self.half_stencil();
        Point::new(
            half_iw + (stencil.x - half_sw - t.x()) / t.scale(),
            half_ih + (stencil.y - half_sh - t.y()) / t.scale(),
        )
    }

    /// Translate a container-space point into stencil space.
    pub fn viewport_to_stencil(&self, viewport: &ViewportMetrics, point: Point) -> Point {
        let origin = self.stencil_origin(viewport);
        Point::new(point.x - origin.x, point.y - origin.y)
    }

    /// Map a container-space point straight to source pixels.
    pub fn viewport_to_source(&self, viewport: &ViewportMetrics, point: Point) -> Point {
        self.stencil_to_source(self.viewport_to_stencil(viewport, point))
    }

    /// Top-left corner of the centered stencil inside the container.
    pub fn stencil_origin(&self, viewport: &ViewportMetrics) -> Point {
        Point::new(
            (viewport.width - self.stencil.width as f64) / 2.0,
            (viewport.height - self.stencil.height as f64) / 2.0,
        )
    }

    fn half_image(&self) -> (f64, f64) {
        (
            self.image.natural_width as f64 / 2.0,
            self.image.natural_height as f64 / 2.0,
        )
    }

    fn half_stencil(&self) -> (f64, f64) {
        (
            self.stencil.width as f64 / 2.0,
            self.stencil.height as f64 / 2.0,
        )
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
