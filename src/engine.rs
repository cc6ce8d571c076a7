//! Capability traits for the black-box services the pipeline drives.
//!
//! OCR engines, the entity tagger and the language classifier are injected
//! as trait objects so callers (and tests) can swap in their own.

use crate::error::PipelineError;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Classical OCR over an already binarized bitmap
pub trait ClassicalOcr: Send + Sync {
    /// Returns the engine identifier (e.g. "tesseract-cli", "leptess")
    fn name(&self) -> &'static str;

    /// Recognize text in a "block of text" layout.
    ///
    /// `language` is a tesseract style hint such as "eng" or "eng+fra".
    fn recognize(&self, image: &GrayImage, language: &str) -> Result<String, PipelineError>;
}

/// A loaded neural OCR reader bound to one language set
pub trait DeepOcrReader: Send + Sync {
    /// Read the raw image at `path`, returning paragraph level text blocks
    fn read_blocks(&self, path: &Path) -> Result<Vec<String>, PipelineError>;
}

/// Builds deep OCR readers; each call is expected to be expensive
pub trait ReaderLoader: Send + Sync {
    fn name(&self) -> &'static str;

    fn load(&self, languages: &[String]) -> Result<Arc<dyn DeepOcrReader>, PipelineError>;
}

/// A tagged span as reported by a tagging service, before normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTag {
    pub entity_group: Option<String>,
    pub word: Option<String>,
    pub score: Option<f64>,
}

/// Named entity tagging over one chunk of text
pub trait EntityTagger: Send + Sync {
    fn tag(&self, chunk: &str) -> Result<Vec<RawTag>, PipelineError>;
}

/// Language identification over normalized text
pub trait LanguageClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<String, PipelineError>;
}
