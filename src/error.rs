use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("image_path is empty; provide an image file or capture one first")]
    EmptyImagePath,

    #[error("Could not read image: {0}")]
    ImageNotFound(String),

    #[error("Unknown OCR engine '{0}': expected 'tesseract' or 'easyocr'")]
    UnknownEngine(String),

    #[error("Failed to initialize OCR engine: {0}")]
    InitializationError(String),

    #[error("Failed to process image: {0}")]
    ProcessingError(String),

    #[error("Preprocessing failed: {0}")]
    PreprocessingError(String),

    #[error("Entity tagging failed: {0}")]
    TaggingError(String),

    #[error("Language classification failed: {0}")]
    ClassificationError(String),

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Missing file in request")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize result: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    /// Whether this is a caller mistake rather than an engine or disk failure
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PipelineError::EmptyImagePath
                | PipelineError::ImageNotFound(_)
                | PipelineError::UnknownEngine(_)
                | PipelineError::ImageTooLarge { .. }
                | PipelineError::MissingFile
                | PipelineError::InvalidRequest(_)
        )
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            PipelineError::EmptyImagePath => (StatusCode::BAD_REQUEST, "EMPTY_IMAGE_PATH"),
            PipelineError::ImageNotFound(_) => (StatusCode::UNPROCESSABLE_ENTITY, "IMAGE_NOT_FOUND"),
            PipelineError::UnknownEngine(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_ENGINE"),
            PipelineError::InitializationError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INIT_ERROR")
            }
            PipelineError::ProcessingError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PROCESSING_ERROR")
            }
            PipelineError::PreprocessingError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PREPROCESSING_ERROR")
            }
            PipelineError::TaggingError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "TAGGING_ERROR"),
            PipelineError::ClassificationError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CLASSIFICATION_ERROR")
            }
            PipelineError::ImageTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, "IMAGE_TOO_LARGE")
            }
            PipelineError::MissingFile => (StatusCode::BAD_REQUEST, "MISSING_FILE"),
            PipelineError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            PipelineError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            PipelineError::Serialization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "SERIALIZATION_ERROR")
            }
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_classified() {
        assert!(PipelineError::EmptyImagePath.is_input_error());
        assert!(PipelineError::UnknownEngine("paddle".into()).is_input_error());
        assert!(!PipelineError::ProcessingError("boom".into()).is_input_error());
    }

    #[test]
    fn test_status_codes() {
        let response = PipelineError::UnknownEngine("paddle".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = PipelineError::ProcessingError("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
