//! TF-IDF term scoring over a small in-memory corpus.
//!
//! Tokens are lowercase runs of two or more word characters with English stop
//! words removed; features are those unigrams plus adjacent bigrams. The
//! vocabulary keeps the `max_features` most frequent terms (ties broken
//! alphabetically) and is then ordered alphabetically. Weights are raw counts
//! times smoothed IDF, `ln((1 + n) / (1 + df)) + 1`, with every document row
//! L2-normalized.

use super::stopwords::is_stop_word;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

/// Vocabulary cap applied when fitting
pub const MAX_FEATURES: usize = 5000;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// A vocabulary term with its weight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredTerm {
    pub term: String,
    pub score: f64,
}

/// A sentence with its summed term weight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredSentence {
    pub index: usize,
    pub text: String,
    pub score: f64,
}

/// Lowercased content tokens of `text`
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !is_stop_word(token))
        .map(str::to_string)
        .collect()
}

/// Unigrams followed by adjacent bigrams
pub fn ngrams(tokens: &[String]) -> Vec<String> {
    let mut terms = tokens.to_vec();
    terms.extend(tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
    terms
}

/// Fitted document-term weights
#[derive(Debug, Clone, Default)]
pub struct TfidfMatrix {
    /// Alphabetically ordered terms
    pub vocabulary: Vec<String>,
    pub idf: Vec<f64>,
    /// Sparse rows of `(term index, weight)`, ascending by term index
    pub rows: Vec<Vec<(usize, f64)>>,
}

impl TfidfMatrix {
    /// Sum of the weights in each row
    pub fn row_sums(&self) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|(_, weight)| weight).sum())
            .collect()
    }
}

/// Scores terms and sentences by corpus-relative importance
#[derive(Debug, Clone, Copy)]
pub struct TermScorer {
    max_features: usize,
}

impl Default for TermScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl TermScorer {
    pub fn new() -> Self {
        Self {
            max_features: MAX_FEATURES,
        }
    }

    pub fn with_max_features(max_features: usize) -> Self {
        Self { max_features }
    }

    /// Fit the vocabulary and IDF on `documents` and weight each of them
    pub fn fit_transform<S: AsRef<str>>(&self, documents: &[S]) -> TfidfMatrix {
        let counts: Vec<HashMap<String, usize>> = documents
            .iter()
            .map(|doc| {
                let mut counts = HashMap::new();
                for term in ngrams(&tokenize(doc.as_ref())) {
                    *counts.entry(term).or_insert(0) += 1;
                }
                counts
            })
            .collect();

        let mut corpus_freq: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for doc in &counts {
            for (term, count) in doc {
                *corpus_freq.entry(term.as_str()).or_insert(0) += count;
                *doc_freq.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(&str, usize)> = corpus_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.max_features);

        let mut vocabulary: Vec<String> = ranked.iter().map(|(t, _)| t.to_string()).collect();
        vocabulary.sort();

        let n_docs = documents.len() as f64;
        let idf: Vec<f64> = vocabulary
            .iter()
            .map(|term| {
                let df = doc_freq.get(term.as_str()).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, term)| (term.as_str(), i))
            .collect();

        let rows = counts
            .iter()
            .map(|doc| {
                let mut row: Vec<(usize, f64)> = doc
                    .iter()
                    .filter_map(|(term, &count)| {
                        index
                            .get(term.as_str())
                            .map(|&j| (j, count as f64 * idf[j]))
                    })
                    .collect();
                row.sort_by_key(|(j, _)| *j);

                let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for (_, w) in row.iter_mut() {
                        *w /= norm;
                    }
                }
                row
            })
            .collect();

        TfidfMatrix {
            vocabulary,
            idf,
            rows,
        }
    }

    /// Weight every vocabulary term of a single document, in vocabulary order
    pub fn score_terms(&self, document: &str) -> Vec<ScoredTerm> {
        let matrix = self.fit_transform(&[document]);
        let mut weights = vec![0.0; matrix.vocabulary.len()];
        if let Some(row) = matrix.rows.first() {
            for &(j, w) in row {
                weights[j] = w;
            }
        }

        matrix
            .vocabulary
            .into_iter()
            .zip(weights)
            .map(|(term, score)| ScoredTerm { term, score })
            .collect()
    }

    /// One score per sentence: the sum of its term weights.
    ///
    /// Every sentence is a document of the fitted corpus. A corpus without
    /// any content terms scores all zeros.
    pub fn score_sentences<S: AsRef<str>>(&self, sentences: &[S]) -> Vec<f64> {
        if sentences.is_empty() {
            return Vec::new();
        }
        self.fit_transform(sentences).row_sums()
    }
}

/// Indices ordered by score, highest first; equal scores keep index order
pub fn rank_descending(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
}
