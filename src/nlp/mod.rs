//! Text cleanup and the optional NLP stages run after OCR.

pub mod entities;
pub mod keywords;
pub mod language;
pub mod normalize;
pub mod sentences;
pub mod stopwords;
pub mod summarize;
pub mod tfidf;

pub use entities::{ChunkOutcome, Entity, EntityExtractor, PatternTagger, SkipReason};
pub use keywords::extract_keywords;
pub use language::{LanguageDetector, WhatlangClassifier, UNKNOWN_LANGUAGE};
pub use normalize::normalize;
pub use sentences::{split_sentences, Sentence};
pub use summarize::summarize;
pub use tfidf::{rank_descending, ScoredSentence, ScoredTerm, TermScorer};

use crate::config::{DEFAULT_KEYWORD_COUNT, DEFAULT_SUMMARY_SENTENCES};
use crate::engine::{EntityTagger, LanguageClassifier};
use std::sync::Arc;

/// Output of the four NLP stages
#[derive(Debug, Clone, PartialEq)]
pub struct NlpOutput {
    pub language: String,
    pub summary: String,
    pub entities: Vec<Entity>,
    pub keywords: Vec<String>,
}

/// The NLP stages with their injected services and limits
#[derive(Clone)]
pub struct NlpSuite {
    pub language: LanguageDetector,
    pub entities: EntityExtractor,
    pub summary_sentences: usize,
    pub keyword_count: usize,
}

impl Default for NlpSuite {
    fn default() -> Self {
        Self {
            language: LanguageDetector::default(),
            entities: EntityExtractor::default(),
            summary_sentences: DEFAULT_SUMMARY_SENTENCES,
            keyword_count: DEFAULT_KEYWORD_COUNT,
        }
    }
}

impl NlpSuite {
    pub fn with_services(
        classifier: Arc<dyn LanguageClassifier>,
        tagger: Arc<dyn EntityTagger>,
    ) -> Self {
        Self {
            language: LanguageDetector::new(classifier),
            entities: EntityExtractor::new(tagger),
            ..Self::default()
        }
    }

    pub fn with_limits(mut self, summary_sentences: usize, keyword_count: usize) -> Self {
        self.summary_sentences = summary_sentences;
        self.keyword_count = keyword_count;
        self
    }

    /// Run language, summary, entity and keyword stages over normalized text
    pub fn run(&self, text: &str) -> NlpOutput {
        let language = self.language.detect(text);
        let summary = summarize(text, self.summary_sentences);
        let entities = self.entities.extract(text);
        let keywords = extract_keywords(text, self.keyword_count);

        tracing::debug!(
            "NLP stages: language={}, summary {} chars, {} entities, {} keywords",
            language,
            summary.len(),
            entities.len(),
            keywords.len()
        );

        NlpOutput {
            language,
            summary,
            entities,
            keywords,
        }
    }
}
