use crate::error::PipelineError;
use image::GrayImage;
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

/// Binarize with a single global threshold picked by Otsu's method.
///
/// Pixels strictly above the threshold become white (255), the rest black.
pub fn apply(image: GrayImage) -> Result<GrayImage, PipelineError> {
    let level = otsu_level(&image);
    tracing::debug!("Otsu threshold level: {}", level);
    Ok(threshold(&image, level, ThresholdType::Binary))
}
