//! Leptess/Tesseract engine implementation
//!
//! In-process classical OCR via tesseract-static (no system dependencies).
//! Downloads tessdata (training data) automatically on first use of each
//! language.

use crate::config::Config;
use crate::engine::ClassicalOcr;
use crate::error::PipelineError;
use image::GrayImage;
use std::path::PathBuf;
use tesseract_static::tesseract::Tesseract;

use super::download::{cache_root, download_file};
use super::tesseract_cli::PAGE_SEG_MODE;

/// OEM tesseract falls back to when `Tesseract::new` is given none. Matches
/// the `--oem` passed by the CLI engine.
const INIT_ENGINE_MODE: &str = "3";

/// Tesseract OCR Engine
pub struct LeptessEngine {
    /// Fixed tessdata directory; when unset, tessdata is downloaded into the cache dir
    tessdata_path: Option<String>,
}

impl LeptessEngine {
    /// Create the engine, fetching tessdata for the default language up front
    pub fn new(config: &Config) -> Result<Self, PipelineError> {
        let engine = Self {
            tessdata_path: config.tessdata_path.clone(),
        };

        let tessdata = engine.tessdata_for(&config.tesseract_lang)?;
        let test_tess = Tesseract::new(Some(&tessdata), Some(&config.tesseract_lang)).map_err(
            |e| PipelineError::InitializationError(format!("Failed to initialize Tesseract: {}", e)),
        )?;
        drop(test_tess);

        tracing::info!(
            "Leptess engine initialized (tessdata: {}, language: {})",
            tessdata,
            config.tesseract_lang
        );

        Ok(engine)
    }

    fn tessdata_for(&self, language: &str) -> Result<String, PipelineError> {
        match &self.tessdata_path {
            Some(path) => Ok(path.clone()),
            None => ensure_tessdata_available(language),
        }
    }
}

impl ClassicalOcr for LeptessEngine {
    fn name(&self) -> &'static str {
        "leptess"
    }

    fn recognize(&self, image: &GrayImage, language: &str) -> Result<String, PipelineError> {
        let (width, height) = image.dimensions();

        // BMP is always supported by leptonica
        let mut bmp_data = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bmp_data), image::ImageFormat::Bmp)
            .map_err(|e| {
                PipelineError::ProcessingError(format!("Failed to convert to BMP: {}", e))
            })?;

        tracing::debug!(
            "Processing bitmap: {}x{}, BMP size: {} bytes",
            width,
            height,
            bmp_data.len()
        );

        let tessdata = self.tessdata_for(language)?;
        let mut tess = Tesseract::new(Some(&tessdata), Some(language)).map_err(|e| {
            PipelineError::ProcessingError(format!("Failed to create Tesseract: {}", e))
        })?;

        // OEM is fixed at init, so only the page segmentation mode is set here
        tracing::debug!("Tesseract oem {} psm {}", INIT_ENGINE_MODE, PAGE_SEG_MODE);
        tess = tess
            .set_variable("tessedit_pageseg_mode", PAGE_SEG_MODE)
            .map_err(|e| {
                PipelineError::ProcessingError(format!("Failed to set page segmentation: {}", e))
            })?;

        tess = tess.set_image_from_mem(&bmp_data).map_err(|e| {
            PipelineError::ProcessingError(format!(
                "Failed to set image ({}x{}, {} bytes): {}",
                width,
                height,
                bmp_data.len(),
                e
            ))
        })?;

        tess = tess.recognize().map_err(|e| {
            PipelineError::ProcessingError(format!("Failed to recognize text: {}", e))
        })?;

        tess.get_text()
            .map_err(|e| PipelineError::ProcessingError(format!("Failed to get text: {}", e)))
    }
}

// ============================================================================
// Tessdata download helpers
// ============================================================================

/// Ensure tessdata for every `+` separated language is cached, returning the directory
fn ensure_tessdata_available(language: &str) -> Result<String, PipelineError> {
    let cache_dir = cache_root().join("tessdata");

    std::fs::create_dir_all(&cache_dir).map_err(|e| {
        PipelineError::InitializationError(format!("Failed to create tessdata directory: {}", e))
    })?;

    for lang in language.split('+').map(str::trim).filter(|l| !l.is_empty()) {
        let traineddata_path: PathBuf = cache_dir.join(format!("{}.traineddata", lang));
        if !traineddata_path.exists() {
            tracing::info!(
                "Downloading tessdata for '{}' (this may take a moment)...",
                lang
            );
            download_file(&tessdata_url(lang), &traineddata_path)?;
            tracing::info!("Downloaded tessdata to {:?}", traineddata_path);
        }
    }

    // Tesseract expects the directory, not the file
    cache_dir
        .to_str()
        .map(|s| s.to_string())
        .ok_or_else(|| PipelineError::InitializationError("Invalid tessdata path".to_string()))
}

/// Get tessdata download URL for a language
fn tessdata_url(language: &str) -> String {
    // tessdata_fast keeps downloads small
    format!(
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
        language
    )
}
