use crate::engines::OcrBackendKind;
use std::path::PathBuf;

/// Sentences kept by the extractive summary
pub const DEFAULT_SUMMARY_SENTENCES: usize = 4;

/// Keywords returned per document
pub const DEFAULT_KEYWORD_COUNT: usize = 15;

/// Pipeline and server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory receiving the `.txt` and `.json` artifacts
    pub output_dir: PathBuf,
    /// Backend used when a request doesn't name one
    pub default_engine: OcrBackendKind,
    /// Tesseract language hint (e.g. "eng", "eng+fra")
    pub tesseract_lang: String,
    /// Language hints handed to the deep OCR reader
    pub deep_languages: Vec<String>,
    /// Run language/summary/entity/keyword stages after OCR
    pub run_nlp: bool,
    pub summary_sentences: usize,
    pub keyword_count: usize,
    /// Tesseract executable used when the in-process engine isn't compiled in
    pub tesseract_cmd: String,
    /// Path to tessdata directory for the in-process engine
    pub tessdata_path: Option<String>,
    pub host: String,
    pub port: u16,
    pub max_file_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
            default_engine: OcrBackendKind::Classical,
            tesseract_lang: "eng".to_string(),
            deep_languages: vec!["en".to_string()],
            run_nlp: true,
            summary_sentences: DEFAULT_SUMMARY_SENTENCES,
            keyword_count: DEFAULT_KEYWORD_COUNT,
            tesseract_cmd: "tesseract".to_string(),
            tessdata_path: None,
            host: "127.0.0.1".to_string(),
            port: 9393,
            max_file_size: 20 * 1024 * 1024,
        }
    }
}

/// Split a comma separated language list ("en, fr,,hi") into hints
pub fn parse_language_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
