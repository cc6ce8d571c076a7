//! Image to text to NLP, persisted as `.txt` and `.json` artifacts.

use crate::config::Config;
use crate::engines::{OcrBackendKind, OcrBackendSelector, OcrOptions};
use crate::error::PipelineError;
use crate::nlp::{normalize, Entity, NlpSuite};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Timestamp format embedded in artifact names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Record written to the JSON artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub image_path: String,
    pub ocr_engine: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<Entity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

/// Artifact locations plus the in-memory result
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub text_path: PathBuf,
    pub json_path: PathBuf,
    pub result: PipelineResult,
}

/// One pipeline invocation
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub image_path: String,
    /// "tesseract" or "easyocr"
    pub ocr_engine: String,
    pub ocr: OcrOptions,
    pub run_nlp: bool,
}

impl PipelineRequest {
    pub fn new(image_path: impl Into<String>) -> Self {
        Self {
            image_path: image_path.into(),
            ocr_engine: OcrBackendKind::Classical.as_str().to_string(),
            ocr: OcrOptions::default(),
            run_nlp: true,
        }
    }

    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.ocr_engine = engine.into();
        self
    }

    pub fn options(mut self, ocr: OcrOptions) -> Self {
        self.ocr = ocr;
        self
    }

    pub fn nlp(mut self, run_nlp: bool) -> Self {
        self.run_nlp = run_nlp;
        self
    }
}

/// Sequences OCR, normalization, NLP and persistence
pub struct Pipeline {
    selector: OcrBackendSelector,
    nlp: NlpSuite,
    output_dir: PathBuf,
}

impl Pipeline {
    pub fn new(selector: OcrBackendSelector, nlp: NlpSuite, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            selector,
            nlp,
            output_dir: output_dir.into(),
        }
    }

    /// Pipeline with the engines compiled into this build and default NLP services
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let selector = OcrBackendSelector::from_config(config)?;
        let nlp = NlpSuite::default().with_limits(config.summary_sentences, config.keyword_count);
        Ok(Self::new(selector, nlp, config.output_dir.clone()))
    }

    pub fn selector(&self) -> &OcrBackendSelector {
        &self.selector
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run OCR (and optionally NLP) on one image and persist both artifacts.
    ///
    /// Input errors surface before anything touches the disk. Any stage
    /// failure aborts the run without writing artifacts.
    pub fn run(&self, request: &PipelineRequest) -> Result<PipelineOutput, PipelineError> {
        if request.image_path.trim().is_empty() {
            return Err(PipelineError::EmptyImagePath);
        }
        let kind = OcrBackendKind::parse(&request.ocr_engine)?;
        let start = Instant::now();

        std::fs::create_dir_all(&self.output_dir)?;
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        let image_path = Path::new(&request.image_path);
        let stem = format!("{}_{}", base_name(image_path), timestamp);

        tracing::info!("Running {} OCR on {}", kind, image_path.display());
        let raw = self.selector.run(kind, image_path, &request.ocr)?;
        let text = normalize(&raw);

        let mut result = PipelineResult {
            image_path: request.image_path.clone(),
            ocr_engine: kind.as_str().to_string(),
            text,
            language: None,
            summary: None,
            entities: None,
            keywords: None,
        };

        if request.run_nlp {
            let nlp = self.nlp.run(&result.text);
            result.language = Some(nlp.language);
            result.summary = Some(nlp.summary);
            result.entities = Some(nlp.entities);
            result.keywords = Some(nlp.keywords);
        }

        let json = serde_json::to_string_pretty(&result)?;
        let (text_path, json_path) =
            write_artifacts(&self.output_dir, &stem, &result.text, &json)?;

        tracing::info!(
            "Pipeline finished in {}ms: {} chars -> {}",
            start.elapsed().as_millis(),
            result.text.len(),
            json_path.display()
        );

        Ok(PipelineOutput {
            text_path,
            json_path,
            result,
        })
    }
}

/// File stem of the input image, "image" when it has none
fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string())
}

/// Write both artifacts under `<stem>.txt` / `<stem>.json`.
///
/// Names already taken (a rerun within the same second) get a `_1`, `_2`, ...
/// suffix instead of being overwritten. A failed write removes both files.
fn write_artifacts(
    dir: &Path,
    stem: &str,
    text: &str,
    json: &str,
) -> Result<(PathBuf, PathBuf), PipelineError> {
    write_artifacts_with(dir, stem, text, json, |file, bytes| file.write_all(bytes))
}

fn write_artifacts_with<W>(
    dir: &Path,
    stem: &str,
    text: &str,
    json: &str,
    mut write: W,
) -> Result<(PathBuf, PathBuf), PipelineError>
where
    W: FnMut(&mut File, &[u8]) -> std::io::Result<()>,
{
    for attempt in 0usize.. {
        let name = if attempt == 0 {
            stem.to_string()
        } else {
            format!("{}_{}", stem, attempt)
        };
        let text_path = dir.join(format!("{}.txt", name));
        let json_path = dir.join(format!("{}.json", name));

        let mut text_file = match create_new(&text_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        };
        let mut json_file = match create_new(&json_path) {
            Ok(file) => file,
            Err(e) => {
                drop(text_file);
                std::fs::remove_file(&text_path)?;
                if e.kind() == ErrorKind::AlreadyExists {
                    continue;
                }
                return Err(e.into());
            }
        };

        let written = write(&mut text_file, text.as_bytes())
            .and_then(|_| write(&mut json_file, json.as_bytes()));
        if let Err(e) = written {
            drop(text_file);
            drop(json_file);
            for path in [&text_path, &json_path] {
                if let Err(cleanup) = std::fs::remove_file(path) {
                    tracing::warn!("Could not remove partial artifact {}: {}", path.display(), cleanup);
                }
            }
            return Err(e.into());
        }

        if attempt > 0 {
            tracing::warn!("Artifact name {} was taken, wrote {} instead", stem, name);
        }
        return Ok((text_path, json_path));
    }
    unreachable!("artifact suffixes exhausted")
}

fn create_new(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}
