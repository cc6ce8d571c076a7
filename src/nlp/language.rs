//! Advisory language identification.

use crate::engine::LanguageClassifier;
use crate::error::PipelineError;
use std::sync::Arc;

/// Returned whenever the language can't be determined
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Texts shorter than this (after trimming) are not classified
pub const MIN_DETECT_CHARS: usize = 20;

/// Trigram classifier backed by `whatlang`, reporting ISO 639-1 codes
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangClassifier;

impl LanguageClassifier for WhatlangClassifier {
    fn classify(&self, text: &str) -> Result<String, PipelineError> {
        let lang = whatlang::detect(text)
            .map(|info| info.lang())
            .ok_or_else(|| {
                PipelineError::ClassificationError("no language features found".to_string())
            })?;

        iso_639_1(lang).map(str::to_string).ok_or_else(|| {
            PipelineError::ClassificationError(format!(
                "no two-letter code for {}",
                lang.code()
            ))
        })
    }
}

/// Two-letter code for a detected language, when one exists
pub fn iso_639_1(lang: whatlang::Lang) -> Option<&'static str> {
    use whatlang::Lang;

    let code = match lang {
        Lang::Epo => "eo",
        Lang::Eng => "en",
        Lang::Rus => "ru",
        Lang::Cmn => "zh",
        Lang::Spa => "es",
        Lang::Por => "pt",
        Lang::Ita => "it",
        Lang::Ben => "bn",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ukr => "uk",
        Lang::Kat => "ka",
        Lang::Ara => "ar",
        Lang::Hin => "hi",
        Lang::Jpn => "ja",
        Lang::Heb => "he",
        Lang::Yid => "yi",
        Lang::Pol => "pl",
        Lang::Amh => "am",
        Lang::Jav => "jv",
        Lang::Kor => "ko",
        Lang::Nob => "nb",
        Lang::Dan => "da",
        Lang::Swe => "sv",
        Lang::Fin => "fi",
        Lang::Tur => "tr",
        Lang::Nld => "nl",
        Lang::Hun => "hu",
        Lang::Ces => "cs",
        Lang::Ell => "el",
        Lang::Bul => "bg",
        Lang::Bel => "be",
        Lang::Mar => "mr",
        Lang::Kan => "kn",
        Lang::Ron => "ro",
        Lang::Slv => "sl",
        Lang::Hrv => "hr",
        Lang::Srp => "sr",
        Lang::Mkd => "mk",
        Lang::Lit => "lt",
        Lang::Lav => "lv",
        Lang::Est => "et",
        Lang::Tam => "ta",
        Lang::Vie => "vi",
        Lang::Urd => "ur",
        Lang::Tha => "th",
        Lang::Guj => "gu",
        Lang::Uzb => "uz",
        Lang::Pan => "pa",
        Lang::Aze => "az",
        Lang::Ind => "id",
        Lang::Tel => "te",
        Lang::Pes => "fa",
        Lang::Mal => "ml",
        Lang::Ori => "or",
        Lang::Mya => "my",
        Lang::Nep => "ne",
        Lang::Sin => "si",
        Lang::Khm => "km",
        Lang::Tuk => "tk",
        Lang::Aka => "ak",
        Lang::Zul => "zu",
        Lang::Sna => "sn",
        Lang::Afr => "af",
        Lang::Lat => "la",
        Lang::Slk => "sk",
        Lang::Cat => "ca",
        Lang::Tgl => "tl",
        _ => return None,
    };
    Some(code)
}

/// Wraps a classifier with length guards and an "unknown" fallback
#[derive(Clone)]
pub struct LanguageDetector {
    classifier: Arc<dyn LanguageClassifier>,
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new(Arc::new(WhatlangClassifier))
    }
}

impl LanguageDetector {
    pub fn new(classifier: Arc<dyn LanguageClassifier>) -> Self {
        Self { classifier }
    }

    /// Best-effort language code, or `"unknown"`. Never fails.
    pub fn detect(&self, text: &str) -> String {
        if text.trim().chars().count() < MIN_DETECT_CHARS {
            return UNKNOWN_LANGUAGE.to_string();
        }

        match self.classifier.classify(text) {
            Ok(code) if !code.trim().is_empty() => code,
            Ok(_) => UNKNOWN_LANGUAGE.to_string(),
            Err(e) => {
                tracing::warn!("Language detection fell back to unknown: {}", e);
                UNKNOWN_LANGUAGE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingClassifier {
        calls: AtomicUsize,
        result: Result<&'static str, &'static str>,
    }

    impl LanguageClassifier for CountingClassifier {
        fn classify(&self, _text: &str) -> Result<String, PipelineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .map(str::to_string)
                .map_err(|e| PipelineError::ClassificationError(e.to_string()))
        }
    }

    fn counting(result: Result<&'static str, &'static str>) -> Arc<CountingClassifier> {
        Arc::new(CountingClassifier {
            calls: AtomicUsize::new(0),
            result,
        })
    }

    #[test]
    fn test_short_text_skips_classifier() {
        let classifier = counting(Ok("en"));
        let detector = LanguageDetector::new(classifier.clone());

        assert_eq!(detector.detect(""), "unknown");
        assert_eq!(detector.detect("   short text    "), "unknown");
        assert_eq!(detector.detect("nineteen characters"), "unknown");
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_long_enough_text_is_classified() {
        let classifier = counting(Ok("fr"));
        let detector = LanguageDetector::new(classifier.clone());

        assert_eq!(detector.detect("twenty characters ok"), "fr");
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_classifier_failure_is_unknown() {
        let detector = LanguageDetector::new(counting(Err("model exploded")));
        assert_eq!(
            detector.detect("This sentence is comfortably long enough."),
            "unknown"
        );
    }

    #[test]
    fn test_whatlang_detects_english_and_french() {
        let detector = LanguageDetector::default();
        assert_eq!(
            detector.detect("The quick brown fox jumps over the lazy dog near the river bank."),
            "en"
        );
        assert_eq!(
            detector.detect("Le renard brun rapide saute par-dessus le chien paresseux pres de la riviere."),
            "fr"
        );
    }

    #[test]
    fn test_two_letter_codes_for_common_languages() {
        use whatlang::Lang;

        assert_eq!(iso_639_1(Lang::Eng), Some("en"));
        assert_eq!(iso_639_1(Lang::Fra), Some("fr"));
        assert_eq!(iso_639_1(Lang::Hin), Some("hi"));
        assert_eq!(iso_639_1(Lang::Cmn), Some("zh"));
        assert_eq!(iso_639_1(Lang::Pes), Some("fa"));
    }

    #[test]
    fn test_whatlang_codes_are_two_letters() {
        let code = WhatlangClassifier
            .classify("Der schnelle braune Fuchs springt über den faulen Hund am Flussufer.")
            .unwrap();
        assert_eq!(code, "de");
    }
}
