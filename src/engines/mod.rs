//! OCR backend selection
//!
//! Two backends: the classical path (preprocess, then tesseract) and the deep
//! path (raw image straight into a cached neural reader). In-process engines
//! are conditionally compiled based on feature flags.

pub mod cache;
pub mod paragraphs;
pub mod tesseract_cli;

#[cfg(any(feature = "engine-ocrs", feature = "engine-leptess"))]
pub mod download;

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

#[cfg(feature = "engine-leptess")]
pub mod leptess;

pub use cache::ReaderCache;

use crate::config::Config;
use crate::engine::{ClassicalOcr, DeepOcrReader, ReaderLoader};
use crate::error::PipelineError;
use crate::preprocessing::preprocess_for_ocr;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Which OCR backend a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum OcrBackendKind {
    /// Preprocessing + tesseract ("tesseract")
    Classical,
    /// Neural reader on the raw image ("easyocr")
    Deep,
}

impl OcrBackendKind {
    /// Parse a configuration value, case-insensitively
    pub fn parse(s: &str) -> Result<Self, PipelineError> {
        match s.trim().to_lowercase().as_str() {
            "tesseract" => Ok(Self::Classical),
            "easyocr" => Ok(Self::Deep),
            _ => Err(PipelineError::UnknownEngine(s.to_string())),
        }
    }

    /// Configuration name of the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classical => "tesseract",
            Self::Deep => "easyocr",
        }
    }
}

impl fmt::Display for OcrBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<OcrBackendKind> for &'static str {
    fn from(kind: OcrBackendKind) -> Self {
        kind.as_str()
    }
}

/// Language hints for each backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrOptions {
    /// Tesseract style hint, e.g. "eng" or "eng+fra"
    pub tesseract_lang: String,
    /// Deep reader hints, e.g. ["en", "fr"]
    pub deep_languages: Vec<String>,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            tesseract_lang: "eng".to_string(),
            deep_languages: vec!["en".to_string()],
        }
    }
}

impl From<&Config> for OcrOptions {
    fn from(config: &Config) -> Self {
        Self {
            tesseract_lang: config.tesseract_lang.clone(),
            deep_languages: config.deep_languages.clone(),
        }
    }
}

/// Information about an available backend
#[derive(Debug, Clone, Serialize)]
pub struct BackendInfo {
    pub name: &'static str,
    pub engine: Option<&'static str>,
    pub available: bool,
}

/// Picks and drives one of the two OCR backends
pub struct OcrBackendSelector {
    classical: Option<Arc<dyn ClassicalOcr>>,
    deep: Option<ReaderCache>,
}

impl OcrBackendSelector {
    /// Selector over explicitly provided engines
    pub fn new(
        classical: Option<Arc<dyn ClassicalOcr>>,
        deep_loader: Option<Arc<dyn ReaderLoader>>,
    ) -> Self {
        Self {
            classical,
            deep: deep_loader.map(ReaderCache::new),
        }
    }

    /// Selector over the engines compiled into this build
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        #[cfg(feature = "engine-leptess")]
        let classical: Arc<dyn ClassicalOcr> = {
            tracing::info!("Initializing leptess engine...");
            Arc::new(leptess::LeptessEngine::new(config)?)
        };

        #[cfg(not(feature = "engine-leptess"))]
        let classical: Arc<dyn ClassicalOcr> = {
            tracing::info!("Using tesseract command '{}'", config.tesseract_cmd);
            Arc::new(tesseract_cli::TesseractCli::new(config.tesseract_cmd.clone()))
        };

        #[cfg(feature = "engine-ocrs")]
        let deep_loader: Option<Arc<dyn ReaderLoader>> = Some(Arc::new(ocrs::OcrsLoader));

        #[cfg(not(feature = "engine-ocrs"))]
        let deep_loader: Option<Arc<dyn ReaderLoader>> = None;

        Ok(Self::new(Some(classical), deep_loader))
    }

    /// Run OCR on `image_path` with the chosen backend
    pub fn run(
        &self,
        kind: OcrBackendKind,
        image_path: &Path,
        options: &OcrOptions,
    ) -> Result<String, PipelineError> {
        match kind {
            OcrBackendKind::Classical => self.run_classical(image_path, &options.tesseract_lang),
            OcrBackendKind::Deep => self.run_deep(image_path, &options.deep_languages),
        }
    }

    fn run_classical(&self, image_path: &Path, language: &str) -> Result<String, PipelineError> {
        let engine = self.classical.as_ref().ok_or_else(|| {
            PipelineError::InitializationError("classical OCR engine not available".to_string())
        })?;

        let bitmap = preprocess_for_ocr(image_path)?;
        let text = engine.recognize(&bitmap, language)?;

        tracing::info!(
            "{} recognized {} chars from {}",
            engine.name(),
            text.len(),
            image_path.display()
        );
        Ok(text)
    }

    fn run_deep(&self, image_path: &Path, languages: &[String]) -> Result<String, PipelineError> {
        let cache = self.deep.as_ref().ok_or_else(|| {
            PipelineError::InitializationError(
                "deep OCR backend not compiled in (build with --features engine-ocrs)".to_string(),
            )
        })?;

        let reader: Arc<dyn DeepOcrReader> = cache.get(languages)?;
        let blocks = reader.read_blocks(image_path)?;
        let text = join_blocks(&blocks);

        tracing::info!(
            "{} read {} blocks ({} chars) from {}",
            cache.loader_name(),
            blocks.len(),
            text.len(),
            image_path.display()
        );
        Ok(text)
    }

    /// The reader cache backing the deep path, if any
    pub fn reader_cache(&self) -> Option<&ReaderCache> {
        self.deep.as_ref()
    }

    /// Describe both backends
    pub fn info(&self) -> Vec<BackendInfo> {
        vec![
            BackendInfo {
                name: OcrBackendKind::Classical.as_str(),
                engine: self.classical.as_ref().map(|e| e.name()),
                available: self.classical.is_some(),
            },
            BackendInfo {
                name: OcrBackendKind::Deep.as_str(),
                engine: self.deep.as_ref().map(|c| c.loader_name()),
                available: self.deep.is_some(),
            },
        ]
    }
}

/// Join text blocks with newlines, dropping blank ones
pub fn join_blocks(blocks: &[String]) -> String {
    blocks
        .iter()
        .map(|b| b.trim())
        .filter(|b| !b.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
