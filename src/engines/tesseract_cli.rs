//! Classical OCR through the `tesseract` command line tool.
//!
//! Always compiled; used when the in-process engine isn't built in. The
//! bitmap is written to a temporary PNG and tesseract prints to stdout.

use crate::engine::ClassicalOcr;
use crate::error::PipelineError;
use image::GrayImage;
use std::process::Command;

/// OCR engine mode: default (LSTM with legacy fallback)
pub const OCR_ENGINE_MODE: &str = "3";
/// Page segmentation mode: a single uniform block of text
pub const PAGE_SEG_MODE: &str = "6";

pub struct TesseractCli {
    command: String,
}

impl TesseractCli {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Arguments for one invocation, excluding the program name
    fn args(image_path: &str, language: &str) -> Vec<String> {
        vec![
            image_path.to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            language.to_string(),
            "--oem".to_string(),
            OCR_ENGINE_MODE.to_string(),
            "--psm".to_string(),
            PAGE_SEG_MODE.to_string(),
        ]
    }
}

impl ClassicalOcr for TesseractCli {
    fn name(&self) -> &'static str {
        "tesseract-cli"
    }

    fn recognize(&self, image: &GrayImage, language: &str) -> Result<String, PipelineError> {
        let temp_file = tempfile::Builder::new()
            .prefix("snaptext-")
            .suffix(".png")
            .tempfile()?;

        image
            .save_with_format(temp_file.path(), image::ImageFormat::Png)
            .map_err(|e| {
                PipelineError::ProcessingError(format!("Failed to write bitmap: {}", e))
            })?;

        let image_path = temp_file.path().to_string_lossy().to_string();
        tracing::debug!(
            "Running {} on {}x{} bitmap (lang: {})",
            self.command,
            image.width(),
            image.height(),
            language
        );

        let output = Command::new(&self.command)
            .args(Self::args(&image_path, language))
            .output()
            .map_err(|e| {
                PipelineError::InitializationError(format!(
                    "Failed to run '{}': {}. Install tesseract or build with --features engine-leptess",
                    self.command, e
                ))
            })?;

        if !output.status.success() {
            return Err(PipelineError::ProcessingError(format!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_args_request_block_layout() {
        let args = TesseractCli::args("/tmp/x.png", "eng+fra");
        assert_eq!(
            args,
            vec!["/tmp/x.png", "stdout", "-l", "eng+fra", "--oem", "3", "--psm", "6"]
        );
    }

    #[test]
    fn test_missing_binary_is_initialization_error() {
        let engine = TesseractCli::new("snaptext-no-such-tesseract-binary");
        let img = GrayImage::from_pixel(4, 4, Luma([255]));

        let err = engine.recognize(&img, "eng").unwrap_err();
        assert!(matches!(err, PipelineError::InitializationError(_)));
    }
}
