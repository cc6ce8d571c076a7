use crate::error::PipelineError;
use image::{DynamicImage, GrayImage};

/// Convert image to single channel grayscale
/// This is the foundation for the remaining steps
pub fn apply(image: DynamicImage) -> Result<GrayImage, PipelineError> {
    Ok(image.into_luma8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_grayscale_converts_color() {
        let mut img = RgbImage::new(10, 10);
        img.put_pixel(0, 0, Rgb([255, 0, 0])); // Red
        img.put_pixel(1, 0, Rgb([0, 255, 0])); // Green
        img.put_pixel(2, 0, Rgb([0, 0, 255])); // Blue

        let gray = apply(DynamicImage::ImageRgb8(img)).unwrap();

        assert!(gray.get_pixel(0, 0).0[0] > 0);
        assert!(gray.get_pixel(1, 0).0[0] > 0);
        assert!(gray.get_pixel(2, 0).0[0] > 0);
        // Green carries the most luminance
        assert!(gray.get_pixel(1, 0).0[0] > gray.get_pixel(2, 0).0[0]);
    }

    #[test]
    fn test_grayscale_preserves_dimensions() {
        let img = RgbImage::new(100, 50);
        let gray = apply(DynamicImage::ImageRgb8(img)).unwrap();
        assert_eq!(gray.dimensions(), (100, 50));
    }
}
