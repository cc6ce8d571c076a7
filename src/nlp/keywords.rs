//! Keyword extraction from a single document.

use super::tfidf::TermScorer;

/// Documents with fewer whitespace tokens than this yield no keywords
pub const MIN_KEYWORD_TOKENS: usize = 20;

/// Top `top_k` unigrams/bigrams by TF-IDF weight, zero weights excluded
pub fn extract_keywords(text: &str, top_k: usize) -> Vec<String> {
    if text.split_whitespace().count() < MIN_KEYWORD_TOKENS {
        return Vec::new();
    }

    let mut terms = TermScorer::new().score_terms(text);
    terms.sort_by(|a, b| b.score.total_cmp(&a.score));

    terms
        .into_iter()
        .take(top_k)
        .filter(|t| t.score > 0.0)
        .map(|t| t.term)
        .collect()
}
