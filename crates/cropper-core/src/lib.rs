//! Cropper Core - stencil image cropper library
//!
//! This crate provides the interactive core of an image cropper: a pan/zoom
//! transform driven by pointer, touch and wheel input, and the crop geometry
//! that turns the transform into the pixels visible through a fixed-size
//! stencil window.
//!
//! # Module Structure
//!
//! - `config` - Static options: stencil size, scale bounds, zoom step
//! - `transform` - Transform state, CSS form, coordinate mapping, crop geometry
//! - `input` - Drag state machine and input event types
//! - `raster` - Drawing surfaces that execute a crop geometry
//! - `encode` - PNG/JPEG output encoding
//! - `cropper` - Session object tying the pieces to an image loader

pub mod config;
pub mod cropper;
pub mod encode;
pub mod input;
pub mod raster;
pub mod transform;

pub use config::{ConfigError, CropperOptions, ScaleBounds, StencilConfig};
pub use cropper::{
    ErrorHandler, ImageCropper, ImageLoader, LoadError, LoadOutcome, LoadRequest, LoadTicket,
};
pub use encode::{EncodeError, EncodedImage, OutputFormat};
pub use input::{
    EventOrigin, EventResponse, InputEvent, PointerDragController, TouchPoint, WindowEvents,
};
pub use raster::{CpuSurface, DrawingSurface, SampleFilter, SourceImage, SurfaceError};
pub use transform::{
    compute_crop_geometry, style_of, AffineDescriptor, CoordinateMapper, CropGeometry, Transform,
    TransformModel,
};

use serde::{Deserialize, Serialize};

/// Intrinsic pixel size of the loaded image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetrics {
    pub natural_width: u32,
    pub natural_height: u32,
}

impl ImageMetrics {
    pub fn new(natural_width: u32, natural_height: u32) -> Self {
        Self {
            natural_width,
            natural_height,
        }
    }

    /// Check if this describes an image without pixels.
    pub fn is_empty(&self) -> bool {
        self.natural_width == 0 || self.natural_height == 0
    }
}

/// Size of the container element as reported by the layout system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewportMetrics {
    pub width: f64,
    pub height: f64,
}

impl ViewportMetrics {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A 2D point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle, origin top-left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Overlap of two rectangles, `None` when they do not share any area.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}
