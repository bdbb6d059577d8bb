//! Pixel sampling for crop rasterization.
//!
//! Coordinates are continuous source positions with pixel `i` covering
//! `[i, i + 1)`, so the center of pixel `i` sits at `i + 0.5`. Positions
//! outside the image return transparent black, matching the uncovered
//! area of a 2D canvas.

use serde::{Deserialize, Serialize};

use super::SourceImage;

const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Interpolation used when the crop scale is not 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFilter {
    /// Nearest neighbor (hard pixel edges when zoomed in).
    Nearest,
    /// Bilinear interpolation, the 2D canvas default.
    #[default]
    Bilinear,
}

/// Sample the image at a continuous source position.
#[inline]
pub(crate) fn sample(image: &SourceImage, x: f64, y: f64, filter: SampleFilter) -> [u8; 4] {
    if !(x >= 0.0 && y >= 0.0 && x < image.width as f64 && y < image.height as f64) {
        return TRANSPARENT;
    }
    match filter {
        SampleFilter::Nearest => image.pixel(x as usize, y as usize),
        SampleFilter::Bilinear => sample_bilinear(image, x, y),
    }
}

/// Neighbor indices and blend weight along one axis, clamped to the edge
/// pixels so the outer half-pixel band is not darkened.
#[inline]
fn axis(coord: f64, len: u32) -> (usize, usize, f64) {
    let last = (len - 1) as f64;
    let c = (coord - 0.5).clamp(0.0, last);
    let i0 = c.floor();
    let i1 = (i0 + 1.0).min(last);
    (i0 as usize, i1 as usize, c - i0)
}

/// Bilinear interpolation over the 4 nearest pixel centers.
fn sample_bilinear(image: &SourceImage, x: f64, y: f64) -> [u8; 4] {
    let (x0, x1, fx) = axis(x, image.width);
    let (y0, y1, fy) = axis(y, image.height);

    let p00 = image.pixel(x0, y0);
    let p10 = image.pixel(x1, y0);
    let p01 = image.pixel(x0, y1);
    let p11 = image.pixel(x1, y1);

    let mut result = [0u8; 4];
    for i in 0..4 {
        let v = p00[i] as f64 * (1.0 - fx) * (1.0 - fy)
            + p10[i] as f64 * fx * (1.0 - fy)
            + p01[i] as f64 * (1.0 - fx) * fy
            + p11[i] as f64 * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2x1 image: black on the left, white on the right, both opaque.
    fn two_pixel() -> SourceImage {
        SourceImage::from_rgba(2, 1, vec![0, 0, 0, 255, 255, 255, 255, 255]).unwrap()
    }

    #[test]
    fn test_outside_is_transparent() {
        let img = two_pixel();
        for filter in [SampleFilter::Nearest, SampleFilter::Bilinear] {
            assert_eq!(sample(&img, -0.1, 0.5, filter), TRANSPARENT);
            assert_eq!(sample(&img, 2.0, 0.5, filter), TRANSPARENT);
            assert_eq!(sample(&img, 0.5, 1.0, filter), TRANSPARENT);
            assert_eq!(sample(&img, f64::NAN, 0.5, filter), TRANSPARENT);
        }
    }

    #[test]
    fn test_nearest_picks_containing_pixel() {
        let img = two_pixel();
        assert_eq!(sample(&img, 0.99, 0.5, SampleFilter::Nearest)[0], 0);
        assert_eq!(sample(&img, 1.0, 0.5, SampleFilter::Nearest)[0], 255);
    }

    #[test]
    fn test_bilinear_exact_at_centers() {
        let img = two_pixel();
        assert_eq!(sample(&img, 0.5, 0.5, SampleFilter::Bilinear), [0, 0, 0, 255]);
        assert_eq!(sample(&img, 1.5, 0.5, SampleFilter::Bilinear), [255, 255, 255, 255]);
    }

    #[test]
    fn test_bilinear_midpoint_blends() {
        let img = two_pixel();
        let px = sample(&img, 1.0, 0.5, SampleFilter::Bilinear);
        assert_eq!(px, [128, 128, 128, 255]);
    }

    #[test]
    fn test_bilinear_clamps_at_edges() {
        let img = two_pixel();
        assert_eq!(sample(&img, 0.1, 0.9, SampleFilter::Bilinear), [0, 0, 0, 255]);
        assert_eq!(sample(&img, 1.9, 0.1, SampleFilter::Bilinear), [255, 255, 255, 255]);
    }

    #[test]
    fn test_single_pixel_image() {
        let img = SourceImage::from_rgba(1, 1, vec![10, 20, 30, 40]).unwrap();
        assert_eq!(sample(&img, 0.7, 0.2, SampleFilter::Bilinear), [10, 20, 30, 40]);
    }
}
