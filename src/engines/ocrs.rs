//! OCRS engine implementation
//!
//! Pure Rust neural OCR used by the deep backend. Reads the raw image (no
//! preprocessing) and groups recognized lines into paragraphs. Downloads
//! the detection and recognition models automatically on first use.

use crate::engine::{DeepOcrReader, ReaderLoader};
use crate::error::PipelineError;
use ocrs::{DecodeMethod, ImageSource, OcrEngine as OcrsOcrEngine, OcrEngineParams, TextItem};
use rten::Model;
use std::path::Path;
use std::sync::Arc;

use super::download::ensure_downloaded;
use super::paragraphs::{group_paragraphs, LineBox};

/// Default model URLs from the ocrs project
const DETECTION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

/// Language hints the bundled recognition model handles (Latin script)
const LATIN_LANGUAGES: &[&str] = &["en", "fr", "de", "es", "it", "pt", "nl"];

/// Builds ocrs readers from the cached models
#[derive(Debug, Clone, Copy, Default)]
pub struct OcrsLoader;

impl ReaderLoader for OcrsLoader {
    fn name(&self) -> &'static str {
        "ocrs"
    }

    fn load(&self, languages: &[String]) -> Result<Arc<dyn DeepOcrReader>, PipelineError> {
        let unsupported: Vec<&String> = languages
            .iter()
            .filter(|l| !LATIN_LANGUAGES.contains(&l.as_str()))
            .collect();
        if !unsupported.is_empty() {
            tracing::warn!(
                "ocrs only recognizes Latin script; hints {:?} will be read as Latin",
                unsupported
            );
        }

        Ok(Arc::new(OcrsReader::new()?))
    }
}

/// A loaded ocrs engine
pub struct OcrsReader {
    engine: OcrsOcrEngine,
}

impl OcrsReader {
    pub fn new() -> Result<Self, PipelineError> {
        let detection_model_path =
            ensure_downloaded(DETECTION_MODEL_URL, "text-detection.rten")?;
        let recognition_model_path =
            ensure_downloaded(RECOGNITION_MODEL_URL, "text-recognition.rten")?;

        let detection_model = Model::load_file(&detection_model_path).map_err(|e| {
            PipelineError::InitializationError(format!("Failed to load detection model: {}", e))
        })?;
        let recognition_model = Model::load_file(&recognition_model_path).map_err(|e| {
            PipelineError::InitializationError(format!("Failed to load recognition model: {}", e))
        })?;

        let engine = OcrsOcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            decode_method: DecodeMethod::Greedy,
            ..Default::default()
        })
        .map_err(|e| {
            PipelineError::InitializationError(format!("Failed to create OCR engine: {}", e))
        })?;

        tracing::info!("ocrs engine initialized successfully");

        Ok(Self { engine })
    }
}

impl DeepOcrReader for OcrsReader {
    fn read_blocks(&self, path: &Path) -> Result<Vec<String>, PipelineError> {
        let img = image::open(path).map_err(|e| {
            PipelineError::ImageNotFound(format!("{}: {}", path.display(), e))
        })?;

        // HWC RGB8 is what ImageSource::from_bytes expects
        let rgb_img = img.into_rgb8();
        let dimensions = rgb_img.dimensions();

        let img_source = ImageSource::from_bytes(rgb_img.as_raw(), dimensions).map_err(|e| {
            PipelineError::ProcessingError(format!("Failed to create image source: {}", e))
        })?;

        let ocr_input = self.engine.prepare_input(img_source).map_err(|e| {
            PipelineError::ProcessingError(format!("Failed to prepare input: {}", e))
        })?;

        let word_rects = self.engine.detect_words(&ocr_input).map_err(|e| {
            PipelineError::ProcessingError(format!("Failed to detect words: {}", e))
        })?;

        let line_rects = self.engine.find_text_lines(&ocr_input, &word_rects);

        let line_texts = self
            .engine
            .recognize_text(&ocr_input, &line_rects)
            .map_err(|e| {
                PipelineError::ProcessingError(format!("Failed to recognize text: {}", e))
            })?;

        let lines: Vec<LineBox> = line_texts
            .iter()
            .filter_map(|line| line.as_ref())
            .map(|line| {
                let rect = line.bounding_rect();
                LineBox {
                    text: line
                        .words()
                        .map(|word| word.to_string())
                        .collect::<Vec<_>>()
                        .join(" "),
                    top: rect.top() as f32,
                    bottom: rect.bottom() as f32,
                }
            })
            .collect();

        tracing::debug!(
            "ocrs recognized {} lines in {}x{} image",
            lines.len(),
            dimensions.0,
            dimensions.1
        );

        Ok(group_paragraphs(&lines))
    }
}
