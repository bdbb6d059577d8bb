//! Pan/zoom transform, its CSS form, and the crop geometry derived from it.
//!
//! # Coordinate System
//!
//! - Pan offsets are display pixels, positive x = right, positive y = down
//! - Scale is uniform and applied around the image center
//! - Source coordinates are natural image pixels, origin top-left
//! - The stencil is centered in the container, as is the untransformed image

mod crop;
mod mapping;
mod model;
mod style;

pub use crop::{compute_crop_geometry, CropGeometry};
pub use mapping::CoordinateMapper;
pub use model::{Transform, TransformModel};
pub use style::{style_of, AffineDescriptor};
