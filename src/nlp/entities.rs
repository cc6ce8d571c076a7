//! Named entity extraction over OCR text, one line at a time.
//!
//! Lines are tagged independently. A line the tagger chokes on is recorded as
//! skipped and the remaining lines still contribute.

use crate::engine::{EntityTagger, RawTag};
use crate::error::PipelineError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lines shorter than this (after trimming) are too fragmentary to tag
pub const MIN_CHUNK_CHARS: usize = 15;

/// A recognized entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Category label, e.g. "EMAIL" or "MISC"
    pub entity: String,
    /// Surface text as it appears in the line
    pub text: String,
    /// Confidence in [0, 1]
    pub score: f64,
}

impl From<RawTag> for Entity {
    fn from(tag: RawTag) -> Self {
        let score = tag.score.unwrap_or(0.0);
        let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
        Self {
            entity: tag.entity_group.unwrap_or_default(),
            text: tag.word.unwrap_or_default(),
            score,
        }
    }
}

/// Why a chunk produced no entities
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    TooShort,
    TaggerFailed(String),
}

/// What happened to one line of input
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome {
    Tagged(Vec<Entity>),
    Skipped(SkipReason),
}

impl ChunkOutcome {
    pub fn entities(&self) -> &[Entity] {
        match self {
            ChunkOutcome::Tagged(entities) => entities,
            ChunkOutcome::Skipped(_) => &[],
        }
    }
}

#[derive(Clone)]
pub struct EntityExtractor {
    tagger: Arc<dyn EntityTagger>,
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new(Arc::new(PatternTagger))
    }
}

impl EntityExtractor {
    pub fn new(tagger: Arc<dyn EntityTagger>) -> Self {
        Self { tagger }
    }

    /// Per-line outcomes, in line order
    pub fn extract_report(&self, text: &str) -> Vec<ChunkOutcome> {
        text.split('\n')
            .map(str::trim)
            .map(|chunk| {
                if chunk.chars().count() < MIN_CHUNK_CHARS {
                    return ChunkOutcome::Skipped(SkipReason::TooShort);
                }
                match self.tagger.tag(chunk) {
                    Ok(tags) => ChunkOutcome::Tagged(tags.into_iter().map(Entity::from).collect()),
                    Err(e) => {
                        tracing::warn!("Entity tagging skipped a line: {}", e);
                        ChunkOutcome::Skipped(SkipReason::TaggerFailed(e.to_string()))
                    }
                }
            })
            .collect()
    }

    /// All entities in line order, then tag order within the line. Never fails.
    pub fn extract(&self, text: &str) -> Vec<Entity> {
        self.extract_report(text)
            .iter()
            .flat_map(|outcome| outcome.entities().iter().cloned())
            .collect()
    }
}

// --- Rule based tagger ---

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}").unwrap());

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:https?://|www\.)[^\s\)\]>"']+"#).unwrap());

static MONEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[$\x{20AC}\x{00A3}\x{00A5}]\s?\d[\d,]*(?:\.\d{1,2})?|\b\d[\d,]*(?:\.\d{1,2})?\s?(?:USD|EUR|GBP|JPY|INR)\b").unwrap()
});

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{4}-\d{2}-\d{2}\b|\b\d{1,2}/\d{1,2}/\d{2,4}\b|\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)[a-z]*\.? \d{1,2}(?:st|nd|rd|th)?,? \d{4}\b").unwrap()
});

static PROPER_NOUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)+\b").unwrap());

/// Offline tagger built from regular expressions.
///
/// Patterns run in priority order; later matches overlapping an earlier one
/// are dropped. Capitalized multi-word runs are reported as `MISC`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternTagger;

const PATTERNS: &[(&str, f64)] = &[
    ("EMAIL", 0.99),
    ("URL", 0.98),
    ("MONEY", 0.9),
    ("DATE", 0.85),
    ("MISC", 0.6),
];

fn pattern_for(label: &str) -> &'static Regex {
    match label {
        "EMAIL" => &EMAIL_RE,
        "URL" => &URL_RE,
        "MONEY" => &MONEY_RE,
        "DATE" => &DATE_RE,
        _ => &PROPER_NOUN_RE,
    }
}

impl EntityTagger for PatternTagger {
    fn tag(&self, chunk: &str) -> Result<Vec<RawTag>, PipelineError> {
        let mut spans: Vec<(usize, usize, &str, f64)> = Vec::new();

        for &(label, score) in PATTERNS {
            for m in pattern_for(label).find_iter(chunk) {
                let overlaps = spans
                    .iter()
                    .any(|&(start, end, _, _)| m.start() < end && m.end() > start);
                if !overlaps {
                    spans.push((m.start(), m.end(), label, score));
                }
            }
        }

        spans.sort_by_key(|&(start, _, _, _)| start);
        Ok(spans
            .into_iter()
            .map(|(start, end, label, score)| RawTag {
                entity_group: Some(label.to_string()),
                word: Some(chunk[start..end].to_string()),
                score: Some(score),
            })
            .collect())
    }
}
