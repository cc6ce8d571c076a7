use crate::error::PipelineError;
use image::GrayImage;
use imageproc::filter::median_filter;

/// Kernel radius of the median blur (radius 1 = 3x3 window)
const MEDIAN_RADIUS: u32 = 1;

/// Apply median blur to knock out salt-and-pepper noise while keeping glyph edges
pub fn apply(image: GrayImage) -> Result<GrayImage, PipelineError> {
    Ok(median_filter(&image, MEDIAN_RADIUS, MEDIAN_RADIUS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_denoise_removes_isolated_pixels() {
        let mut img = GrayImage::from_pixel(10, 10, Luma([128]));
        img.put_pixel(5, 5, Luma([0])); // "pepper" noise
        img.put_pixel(2, 7, Luma([255])); // "salt" noise

        let result = apply(img).unwrap();

        assert_eq!(result.get_pixel(5, 5).0[0], 128);
        assert_eq!(result.get_pixel(2, 7).0[0], 128);
    }

    #[test]
    fn test_denoise_keeps_solid_strokes() {
        // A 3px wide vertical bar survives a 3x3 median
        let mut img = GrayImage::from_pixel(12, 12, Luma([240]));
        for y in 0..12 {
            for x in 4..7 {
                img.put_pixel(x, y, Luma([10]));
            }
        }

        let result = apply(img).unwrap();

        assert_eq!(result.get_pixel(5, 6).0[0], 10);
        assert_eq!(result.get_pixel(1, 6).0[0], 240);
    }
}
