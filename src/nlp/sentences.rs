//! Heuristic sentence splitting for OCR text.

/// Fragments must be longer than this (in characters) to count as sentences
pub const MIN_SENTENCE_CHARS: usize = 10;

/// A sentence with its position in the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub index: usize,
    pub text: String,
}

/// Split text into sentences.
///
/// Line breaks always end a sentence. Inside a line, `.`, `!` or `?` followed
/// by whitespace ends one and stays attached to it. Fragments of
/// `MIN_SENTENCE_CHARS` characters or fewer are dropped as noise.
pub fn split_sentences(text: &str) -> Vec<Sentence> {
    text.lines()
        .flat_map(|line| {
            let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
            split_line(&collapsed)
        })
        .filter(|fragment| fragment.chars().count() > MIN_SENTENCE_CHARS)
        .enumerate()
        .map(|(index, text)| Sentence { index, text })
        .collect()
}

/// Sentence texts only, in source order
pub fn sentence_texts(text: &str) -> Vec<String> {
    split_sentences(text).into_iter().map(|s| s.text).collect()
}

fn split_line(line: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let terminal = matches!(c, '.' | '!' | '?');
        if terminal && chars.peek().is_some_and(|next| next.is_whitespace()) {
            fragments.push(current.trim().to_string());
            current.clear();
        }
    }
    let tail = current.trim();
    if !tail.is_empty() {
        fragments.push(tail.to_string());
    }

    fragments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n  ").is_empty());
    }

    #[test]
    fn test_splits_on_terminal_punctuation() {
        let got = sentence_texts("The cat sat on the mat. Did the dog bark? It surely did!");
        assert_eq!(
            got,
            vec!["The cat sat on the mat.", "Did the dog bark?", "It surely did!"]
        );
    }

    #[test]
    fn test_newlines_are_boundaries() {
        let got = sentence_texts("Quarterly revenue report\nPrepared by the finance team");
        assert_eq!(
            got,
            vec!["Quarterly revenue report", "Prepared by the finance team"]
        );
    }

    #[test]
    fn test_punctuation_without_space_does_not_split() {
        let got = sentence_texts("Version 3.14 shipped at example.com today");
        assert_eq!(got, vec!["Version 3.14 shipped at example.com today"]);
    }

    #[test]
    fn test_short_fragments_dropped() {
        // "Hi there." is 9 chars, "Exactly 10" is 10, both dropped
        let got = sentence_texts("Hi there. Exactly 10\nThis line is long enough.");
        assert_eq!(got, vec!["This line is long enough."]);
    }

    #[test]
    fn test_indices_follow_source_order() {
        let got = split_sentences("Alpha beta gamma. Delta epsilon zeta.\nEta theta iota kappa");
        let indices: Vec<_> = got.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(got[2].text, "Eta theta iota kappa");
    }

    #[test]
    fn test_collapses_inner_whitespace() {
        let got = sentence_texts("Too    many\tspaces   in here.");
        assert_eq!(got, vec!["Too many spaces in here."]);
    }
}
