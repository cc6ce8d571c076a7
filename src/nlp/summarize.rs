//! Extractive summaries: the best scoring sentences, in source order.

use super::sentences::split_sentences;
use super::tfidf::{rank_descending, ScoredSentence, TermScorer};

/// Score every sentence of `text`
pub fn score_sentences(text: &str) -> Vec<ScoredSentence> {
    let sentences = split_sentences(text);
    let texts: Vec<&str> = sentences.iter().map(|s| s.text.as_str()).collect();
    let scores = TermScorer::new().score_sentences(&texts);

    sentences
        .into_iter()
        .zip(scores)
        .map(|(sentence, score)| ScoredSentence {
            index: sentence.index,
            text: sentence.text,
            score,
        })
        .collect()
}

/// Summarize `text` down to at most `num_sentences` sentences.
///
/// Text that already fits is returned trimmed and otherwise untouched.
pub fn summarize(text: &str, num_sentences: usize) -> String {
    let scored = score_sentences(text);
    if scored.len() <= num_sentences {
        return text.trim().to_string();
    }

    let scores: Vec<f64> = scored.iter().map(|s| s.score).collect();
    let mut selected: Vec<usize> = rank_descending(&scores)
        .into_iter()
        .take(num_sentences)
        .collect();
    selected.sort_unstable();

    tracing::debug!(
        "Summary keeps sentences {:?} of {}",
        selected,
        scored.len()
    );

    selected
        .iter()
        .map(|&i| scored[i].text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}
