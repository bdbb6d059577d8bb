//! Drawing surfaces that execute a crop geometry.
//!
//! A [`DrawingSurface`] takes a [`CropGeometry`] and produces the encoded
//! crop. Browser hosts typically implement it with a 2D canvas
//! (`drawImage` with the geometry's draw rectangles); [`CpuSurface`] does the
//! same work in memory for hosts that already hold decoded pixels.
//!
//! # Algorithm
//!
//! The CPU surface uses inverse mapping: for each output pixel center it
//! computes the source position through the geometry and samples there.
//! Output pixels whose source position falls outside the image stay fully
//! transparent.

mod sample;
mod source;

pub use sample::SampleFilter;
pub use source::SourceImage;

use log::debug;
use thiserror::Error;

use crate::encode::{encode_canvas, EncodeError, EncodedImage, OutputFormat};
use crate::transform::CropGeometry;

/// Largest canvas a surface will allocate (16384 x 16384, the common
/// browser limit).
pub const MAX_CANVAS_PIXELS: u64 = 16_384 * 16_384;

/// Failures of a drawing surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// No drawable surface of the requested size could be acquired.
    #[error("Drawing surface unavailable for a {width}x{height} canvas")]
    Unavailable { width: u32, height: u32 },

    /// The geometry was computed for a different image.
    #[error(
        "Geometry is for a {expected_width}x{expected_height} image, surface holds {actual_width}x{actual_height}"
    )]
    ImageMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// Source pixel buffer length doesn't match its dimensions.
    #[error("Invalid source pixels: expected {expected} bytes, got {actual}")]
    InvalidSource { expected: usize, actual: usize },

    /// Encoding the finished canvas failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Something that can rasterize and encode a crop.
pub trait DrawingSurface {
    fn draw(&mut self, geometry: &CropGeometry) -> Result<EncodedImage, SurfaceError>;
}

/// In-memory drawing surface over a [`SourceImage`].
#[derive(Debug, Clone, Copy)]
pub struct CpuSurface<'a> {
    image: &'a SourceImage,
    filter: SampleFilter,
    format: OutputFormat,
}

impl<'a> CpuSurface<'a> {
    /// Bilinear sampling, PNG output.
    pub fn new(image: &'a SourceImage) -> Self {
        Self {
            image,
            filter: SampleFilter::default(),
            format: OutputFormat::default(),
        }
    }

    pub fn with_filter(mut self, filter: SampleFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Rasterize the geometry into an RGBA canvas without encoding.
    pub fn rasterize(&self, geometry: &CropGeometry) -> Result<Vec<u8>, SurfaceError> {
        let (width, height) = (geometry.output_width, geometry.output_height);
        let area = width as u64 * height as u64;
        if area == 0 || area > MAX_CANVAS_PIXELS {
            return Err(SurfaceError::Unavailable { width, height });
        }

        let expected = geometry.image;
        if expected != self.image.metrics() {
            return Err(SurfaceError::ImageMismatch {
                expected_width: expected.natural_width,
                expected_height: expected.natural_height,
                actual_width: self.image.width,
                actual_height: self.image.height,
            });
        }

        debug!(
            "rasterizing {}x{} crop at scale {} from ({:.2}, {:.2})",
            width, height, geometry.scale, geometry.sampling.x, geometry.sampling.y
        );

        let mut canvas = allocate_canvas(area * 4, width, height)?;
        for (row, line) in canvas.chunks_exact_mut(width as usize * 4).enumerate() {
            for (col, out) in line.chunks_exact_mut(4).enumerate() {
                let src = geometry.canvas_to_source(col as f64 + 0.5, row as f64 + 0.5);
                out.copy_from_slice(&sample::sample(self.image, src.x, src.y, self.filter));
            }
        }
        Ok(canvas)
    }
}

/// Zeroed canvas buffer; allocation failure maps to `Unavailable`.
fn allocate_canvas(len: u64, width: u32, height: u32) -> Result<Vec<u8>, SurfaceError> {
    let unavailable = SurfaceError::Unavailable { width, height };
    let Ok(len) = usize::try_from(len) else {
        return Err(unavailable);
    };
    let mut canvas = Vec::new();
    if canvas.try_reserve_exact(len).is_err() {
        return Err(unavailable);
    }
    canvas.resize(len, 0);
    Ok(canvas)
}

impl DrawingSurface for CpuSurface<'_> {
    fn draw(&mut self, geometry: &CropGeometry) -> Result<EncodedImage, SurfaceError> {
        let canvas = self.rasterize(geometry)?;
        Ok(encode_canvas(
            &canvas,
            geometry.output_width,
            geometry.output_height,
            self.format,
        )?)
    }
}
