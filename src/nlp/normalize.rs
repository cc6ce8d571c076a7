//! Cleanup of raw OCR output.
//!
//! Line structure is kept because entity chunking works line by line; inside
//! a line whitespace runs collapse to a single space.

/// Characters OCR engines emit that carry no text
const STRAY_SYMBOLS: &[char] = &[
    '\u{FFFD}', // replacement character
    '\u{00AD}', // soft hyphen
    '\u{200B}', // zero width space
    '\u{200C}', // zero width non-joiner
    '\u{200D}', // zero width joiner
    '\u{2060}', // word joiner
    '\u{FEFF}', // byte order mark
];

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

fn is_stray(c: char) -> bool {
    (c.is_control() && !c.is_whitespace()) || STRAY_SYMBOLS.contains(&c)
}

/// Normalize raw OCR text.
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(raw: &str) -> String {
    raw.split(is_line_break)
        .map(|line| {
            let kept: String = line.chars().filter(|c| !is_stray(*c)).collect();
            kept.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
