//! Screenshot text extraction: OCR with a classical or a deep backend,
//! followed by language detection, extractive summary, entities and keywords.

pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod nlp;
pub mod pipeline;
pub mod preprocessing;
pub mod server;

pub use config::Config;
pub use engines::{OcrBackendKind, OcrBackendSelector, OcrOptions};
pub use error::PipelineError;
pub use pipeline::{Pipeline, PipelineOutput, PipelineRequest, PipelineResult};
