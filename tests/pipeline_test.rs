use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use snaptext::engine::{
    ClassicalOcr, DeepOcrReader, EntityTagger, LanguageClassifier, RawTag, ReaderLoader,
};
use snaptext::engines::{OcrBackendSelector, OcrOptions};
use snaptext::error::PipelineError;
use snaptext::nlp::NlpSuite;
use snaptext::pipeline::{Pipeline, PipelineRequest, PipelineResult};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const RECEIPT_TEXT: &str = "The quarterly revenue report shows strong growth across every \
    region this year and the team expects further gains next quarter.";

struct FixedOcr(&'static str);

impl ClassicalOcr for FixedOcr {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn recognize(&self, _image: &GrayImage, _language: &str) -> Result<String, PipelineError> {
        Ok(self.0.to_string())
    }
}

struct FailingOcr;

impl ClassicalOcr for FailingOcr {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn recognize(&self, _image: &GrayImage, _language: &str) -> Result<String, PipelineError> {
        Err(PipelineError::ProcessingError("engine crashed".to_string()))
    }
}

struct FixedReader;

impl DeepOcrReader for FixedReader {
    fn read_blocks(&self, _path: &Path) -> Result<Vec<String>, PipelineError> {
        Ok(vec!["Invoice 42".to_string(), "Total due Friday".to_string()])
    }
}

#[derive(Default)]
struct CountingLoader {
    loads: AtomicUsize,
}

impl ReaderLoader for CountingLoader {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn load(&self, _languages: &[String]) -> Result<Arc<dyn DeepOcrReader>, PipelineError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FixedReader))
    }
}

struct EnglishClassifier;

impl LanguageClassifier for EnglishClassifier {
    fn classify(&self, _text: &str) -> Result<String, PipelineError> {
        Ok("en".to_string())
    }
}

struct RevenueTagger;

impl EntityTagger for RevenueTagger {
    fn tag(&self, chunk: &str) -> Result<Vec<RawTag>, PipelineError> {
        Ok(chunk
            .contains("revenue")
            .then(|| RawTag {
                entity_group: Some("MISC".to_string()),
                word: Some("revenue".to_string()),
                score: Some(0.75),
            })
            .into_iter()
            .collect())
    }
}

fn write_test_image(dir: &Path, name: &str) -> PathBuf {
    let img = RgbImage::from_fn(48, 24, |x, _| {
        if x % 8 < 4 {
            Rgb([20, 20, 20])
        } else {
            Rgb([235, 235, 235])
        }
    });
    let path = dir.join(name);
    DynamicImage::ImageRgb8(img).save(&path).unwrap();
    path
}

fn build_pipeline(
    classical: Arc<dyn ClassicalOcr>,
    loader: Option<Arc<CountingLoader>>,
    output_dir: &Path,
) -> Pipeline {
    let selector = OcrBackendSelector::new(
        Some(classical),
        loader.map(|l| l as Arc<dyn ReaderLoader>),
    );
    let nlp = NlpSuite::with_services(Arc::new(EnglishClassifier), Arc::new(RevenueTagger));
    Pipeline::new(selector, nlp, output_dir)
}

#[test]
fn test_end_to_end_tesseract_with_nlp() {
    let tmp = tempfile::tempdir().unwrap();
    let image = write_test_image(tmp.path(), "receipt.png");
    let out = tmp.path().join("outputs");
    let pipeline = build_pipeline(Arc::new(FixedOcr(RECEIPT_TEXT)), None, &out);

    let output = pipeline
        .run(&PipelineRequest::new(image.to_string_lossy()))
        .unwrap();

    assert!(output.text_path.starts_with(&out));
    let stem = output.text_path.file_stem().unwrap().to_string_lossy().to_string();
    assert!(stem.starts_with("receipt_"));
    assert_eq!(
        output.json_path.file_stem().unwrap().to_string_lossy(),
        stem
    );

    let text = std::fs::read_to_string(&output.text_path).unwrap();
    assert_eq!(text, RECEIPT_TEXT);

    let json = std::fs::read_to_string(&output.json_path).unwrap();
    let result: PipelineResult = serde_json::from_str(&json).unwrap();
    assert_eq!(result, output.result);
    assert_eq!(result.ocr_engine, "tesseract");
    assert_eq!(result.text, RECEIPT_TEXT);
    assert_eq!(result.language.as_deref(), Some("en"));
    assert_eq!(result.summary.as_deref(), Some(RECEIPT_TEXT));

    let keywords = result.keywords.unwrap();
    assert!(!keywords.is_empty());
    assert!(keywords.len() <= 15);
    assert!(keywords
        .iter()
        .all(|k| k.split(' ').all(|w| w != "the" && w != "and")));

    let entities = result.entities.unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].entity, "MISC");
    assert_eq!(entities[0].text, "revenue");
}

#[test]
fn test_empty_image_path_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("outputs");
    let pipeline = build_pipeline(Arc::new(FixedOcr(RECEIPT_TEXT)), None, &out);

    let err = pipeline.run(&PipelineRequest::new("   ")).unwrap_err();

    assert!(matches!(err, PipelineError::EmptyImagePath));
    assert!(err.is_input_error());
    assert!(!out.exists());
}

#[test]
fn test_unknown_engine_rejected_before_output() {
    let tmp = tempfile::tempdir().unwrap();
    let image = write_test_image(tmp.path(), "shot.png");
    let out = tmp.path().join("outputs");
    let pipeline = build_pipeline(Arc::new(FixedOcr(RECEIPT_TEXT)), None, &out);

    let err = pipeline
        .run(&PipelineRequest::new(image.to_string_lossy()).engine("paddle"))
        .unwrap_err();

    assert!(matches!(err, PipelineError::UnknownEngine(ref e) if e == "paddle"));
    assert!(!out.exists());
}

#[test]
fn test_ocr_failure_writes_no_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    let image = write_test_image(tmp.path(), "shot.png");
    let out = tmp.path().join("outputs");
    let pipeline = build_pipeline(Arc::new(FailingOcr), None, &out);

    let err = pipeline
        .run(&PipelineRequest::new(image.to_string_lossy()))
        .unwrap_err();

    assert!(matches!(err, PipelineError::ProcessingError(_)));
    assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
}

#[test]
fn test_missing_image_is_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("outputs");
    let pipeline = build_pipeline(Arc::new(FixedOcr(RECEIPT_TEXT)), None, &out);

    let err = pipeline
        .run(&PipelineRequest::new(tmp.path().join("nope.png").to_string_lossy()))
        .unwrap_err();

    assert!(matches!(err, PipelineError::ImageNotFound(_)));
    assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
}

#[test]
fn test_deep_reader_loaded_once_per_language_set() {
    let tmp = tempfile::tempdir().unwrap();
    let image = write_test_image(tmp.path(), "invoice.png");
    let out = tmp.path().join("outputs");
    let loader = Arc::new(CountingLoader::default());
    let pipeline = build_pipeline(
        Arc::new(FixedOcr(RECEIPT_TEXT)),
        Some(Arc::clone(&loader)),
        &out,
    );

    let options = |langs: &[&str]| OcrOptions {
        deep_languages: langs.iter().map(|l| l.to_string()).collect(),
        ..OcrOptions::default()
    };
    let request = |langs: &[&str]| {
        PipelineRequest::new(image.to_string_lossy())
            .engine("easyocr")
            .options(options(langs))
            .nlp(false)
    };

    let first = pipeline.run(&request(&["en"])).unwrap();
    let second = pipeline.run(&request(&["en"])).unwrap();
    assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    assert_ne!(first.json_path, second.json_path);
    assert_eq!(first.result.ocr_engine, "easyocr");
    assert_eq!(first.result.text, "Invoice 42\nTotal due Friday");

    pipeline.run(&request(&["en", "fr"])).unwrap();
    pipeline.run(&request(&["fr", "en"])).unwrap();
    assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
    assert_eq!(pipeline.selector().reader_cache().unwrap().len(), 2);
}

#[test]
fn test_without_nlp_fields_are_omitted() {
    let tmp = tempfile::tempdir().unwrap();
    let image = write_test_image(tmp.path(), "shot.png");
    let out = tmp.path().join("outputs");
    let pipeline = build_pipeline(Arc::new(FixedOcr(RECEIPT_TEXT)), None, &out);

    let output = pipeline
        .run(&PipelineRequest::new(image.to_string_lossy()).nlp(false))
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output.json_path).unwrap()).unwrap();
    let fields = json.as_object().unwrap();
    assert_eq!(fields.len(), 3);
    assert!(fields.contains_key("image_path"));
    assert!(fields.contains_key("ocr_engine"));
    assert_eq!(fields["text"], RECEIPT_TEXT);
    assert!(output.result.keywords.is_none());
}

#[test]
fn test_ocr_noise_is_normalized() {
    let tmp = tempfile::tempdir().unwrap();
    let image = write_test_image(tmp.path(), "noisy.png");
    let out = tmp.path().join("outputs");
    let pipeline = build_pipeline(
        Arc::new(FixedOcr("  Hello\u{FFFD}   world \r\n\r\n\r\nSecond\u{200B} line \x0C")),
        None,
        &out,
    );

    let output = pipeline
        .run(&PipelineRequest::new(image.to_string_lossy()).nlp(false))
        .unwrap();

    assert!(!output.result.text.contains('\u{FFFD}'));
    assert!(!output.result.text.contains('\u{200B}'));
    assert!(output.result.text.starts_with("Hello"));
    assert!(output.result.text.contains("Second line"));
}
