use crate::error::PipelineError;
use image::{DynamicImage, GrayImage};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

use super::steps;

/// Timing information for a single preprocessing step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessingResult {
    /// Binarized image (not serialized)
    #[serde(skip)]
    pub image: GrayImage,
    /// Total preprocessing time in milliseconds
    pub total_time_ms: u64,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

/// Grayscale, median blur, then Otsu threshold
#[derive(Debug, Clone, Copy, Default)]
pub struct Pipeline;

impl Pipeline {
    pub fn new() -> Self {
        Self
    }

    /// Run every step over an already decoded image
    pub fn process(&self, image: DynamicImage) -> Result<PreprocessingResult, PipelineError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(PipelineError::PreprocessingError(
                "image has no pixels".to_string(),
            ));
        }

        let start = Instant::now();
        let mut steps_timing = Vec::new();

        let step_start = Instant::now();
        let gray = steps::grayscale::apply(image)?;
        record(&mut steps_timing, "grayscale", step_start);

        let gray = self.run_step("denoise", gray, &mut steps_timing, steps::denoise::apply)?;
        let gray = self.run_step("threshold", gray, &mut steps_timing, steps::threshold::apply)?;

        Ok(PreprocessingResult {
            image: gray,
            total_time_ms: start.elapsed().as_millis() as u64,
            steps: steps_timing,
        })
    }

    fn run_step<F>(
        &self,
        name: &str,
        img: GrayImage,
        timings: &mut Vec<StepTiming>,
        step_fn: F,
    ) -> Result<GrayImage, PipelineError>
    where
        F: FnOnce(GrayImage) -> Result<GrayImage, PipelineError>,
    {
        let step_start = Instant::now();
        let result = step_fn(img)?;
        record(timings, name, step_start);
        Ok(result)
    }
}

fn record(timings: &mut Vec<StepTiming>, name: &str, started: Instant) {
    timings.push(StepTiming {
        name: name.to_string(),
        time_ms: started.elapsed().as_millis() as u64,
    });
}

/// Decode an image from disk, mapping any failure to `ImageNotFound`
pub fn load_image(path: &Path) -> Result<DynamicImage, PipelineError> {
    image::open(path).map_err(|e| {
        PipelineError::ImageNotFound(format!("{}: {}", path.display(), e))
    })
}

/// Load `path` and produce the binarized bitmap handed to classical OCR
pub fn preprocess_for_ocr(path: &Path) -> Result<GrayImage, PipelineError> {
    let image = load_image(path)?;
    let result = Pipeline::new().process(image)?;

    tracing::debug!(
        "Preprocessed {} in {}ms ({:?})",
        path.display(),
        result.total_time_ms,
        result.steps
    );

    Ok(result.image)
}
