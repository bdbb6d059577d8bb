//! Crop geometry for the stencil window.
//!
//! Given the current transform, the image's natural size and the stencil
//! size, this module computes which source pixels are visible through the
//! stencil and the single draw call that reproduces them on a
//! stencil-sized canvas.
//!
//! # Convention
//!
//! Image and stencil are both centered in the container, so the container
//! size cancels out and is not an input. With
//!
//! ```text
//! offset_x = I.w * T.scale / 2 - S.w / 2
//! sx       = (offset_x - T.x) / T.scale
//! sw       = S.w / T.scale
//! ```
//!
//! the draw call copies source `(sx, sy, I.w, I.h)` into destination
//! `(0, 0, I.w * T.scale, I.h * T.scale)` and relies on the canvas clipping
//! to `S.w x S.h`. `sx` is exactly the inverse mapping of the stencil's
//! top-left corner, see [`super::mapping`].

use serde::Serialize;

use super::mapping::CoordinateMapper;
use super::model::Transform;
use crate::config::StencilConfig;
use crate::{ImageMetrics, Point, Rect};

/// Rasterization request for one crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CropGeometry {
    /// Output canvas width (the stencil width).
    pub output_width: u32,
    /// Output canvas height (the stencil height).
    pub output_height: u32,
    /// Scale the image is drawn at.
    pub scale: f64,
    /// Source region visible through the stencil, in natural pixels.
    /// May extend past the image edges when the image does not cover the
    /// stencil.
    pub sampling: Rect,
    /// Source rectangle of the draw call.
    pub draw_source: Rect,
    /// Destination rectangle of the draw call, in canvas pixels.
    pub draw_destination: Rect,
    /// Natural size of the image the geometry was computed for.
    pub image: ImageMetrics,
}

impl CropGeometry {
    /// Map a canvas pixel coordinate to a source coordinate.
    #[inline]
    pub fn canvas_to_source(&self, canvas_x: f64, canvas_y: f64) -> Point {
        Point::new(
            self.draw_source.x + canvas_x / self.scale,
            self.draw_source.y + canvas_y / self.scale,
        )
    }

    /// Part of the sampling rectangle that lies on the image.
    pub fn covered_region(&self) -> Option<Rect> {
        let bounds = Rect::new(
            0.0,
            0.0,
            self.image.natural_width as f64,
            self.image.natural_height as f64,
        );
        self.sampling.intersection(&bounds)
    }

    /// Whether every stencil pixel shows image content.
    pub fn covers_stencil(&self) -> bool {
        self.covered_region() == Some(self.sampling)
    }
}

/// Compute the crop geometry for the current state.
pub fn compute_crop_geometry(
    transform: &Transform,
    image: &ImageMetrics,
    stencil: &StencilConfig,
) -> CropGeometry {
    let scale = transform.scale();
    let mapper = CoordinateMapper::new(*transform, *image, *stencil);
    let origin = mapper.stencil_to_source(Point::new(0.0, 0.0));

    let natural_w = image.natural_width as f64;
    let natural_h = image.natural_height as f64;

    CropGeometry {
        output_width: stencil.width,
        output_height: stencil.height,
        scale,
        sampling: Rect::new(
            origin.x,
            origin.y,
            stencil.width as f64 / scale,
            stencil.height as f64 / scale,
        ),
        draw_source: Rect::new(origin.x, origin.y, natural_w, natural_h),
        draw_destination: Rect::new(0.0, 0.0, natural_w * scale, natural_h * scale),
        image: *image,
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
