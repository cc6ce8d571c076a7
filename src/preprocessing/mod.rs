//! Image preprocessing for the classical OCR path
//!
//! A fixed pipeline (grayscale, median blur, Otsu binarization) that turns a
//! screenshot into a clean black and white bitmap for tesseract.

pub mod pipeline;
pub mod steps;

pub use pipeline::{load_image, preprocess_for_ocr, Pipeline, PreprocessingResult, StepTiming};
