//! In-memory source pixels for the CPU surface.

use super::SurfaceError;
use crate::ImageMetrics;

/// An already-decoded image with RGBA pixel data.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl SourceImage {
    /// Wrap RGBA pixel data, checking the buffer length.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, SurfaceError> {
        let expected = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected {
            return Err(SurfaceError::InvalidSource {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Convert RGB pixel data (3 bytes per pixel) to an opaque image.
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8]) -> Result<Self, SurfaceError> {
        let expected = (width as usize) * (height as usize) * 3;
        if rgb.len() != expected {
            return Err(SurfaceError::InvalidSource {
                expected,
                actual: rgb.len(),
            });
        }
        let mut pixels = Vec::with_capacity(rgb.len() / 3 * 4);
        for px in rgb.chunks_exact(3) {
            pixels.extend_from_slice(px);
            pixels.push(255);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Natural size of this image.
    pub fn metrics(&self) -> ImageMetrics {
        ImageMetrics::new(self.width, self.height)
    }

    /// RGBA value at an in-bounds pixel.
    #[inline]
    pub(crate) fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let idx = (y * self.width as usize + x) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_checks_length() {
        assert!(SourceImage::from_rgba(2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            SourceImage::from_rgba(2, 2, vec![0; 12]),
            Err(SurfaceError::InvalidSource {
                expected: 16,
                actual: 12
            })
        ));
    }

    #[test]
    fn test_from_rgb_adds_opaque_alpha() {
        let img = SourceImage::from_rgb(2, 1, &[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(img.pixels, vec![1, 2, 3, 255, 4, 5, 6, 255]);
        assert_eq!(img.pixel(1, 0), [4, 5, 6, 255]);
    }

    #[test]
    fn test_from_rgb_checks_length() {
        assert!(SourceImage::from_rgb(2, 2, &[0; 16]).is_err());
    }

    #[test]
    fn test_metrics() {
        let img = SourceImage::from_rgba(5, 3, vec![0; 5 * 3 * 4]).unwrap();
        assert_eq!(img.metrics(), ImageMetrics::new(5, 3));
    }
}
