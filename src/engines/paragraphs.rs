//! Grouping of recognized text lines into paragraph blocks.

/// Vertical gap, relative to the previous line's height, that starts a new paragraph
pub const PARAGRAPH_GAP_RATIO: f32 = 0.8;

/// One recognized line with its vertical extent in pixels
#[derive(Debug, Clone, PartialEq)]
pub struct LineBox {
    pub text: String,
    pub top: f32,
    pub bottom: f32,
}

impl LineBox {
    fn height(&self) -> f32 {
        (self.bottom - self.top).max(1.0)
    }
}

/// Merge consecutive lines into paragraphs.
///
/// Lines are taken in reading order. A gap larger than
/// `PARAGRAPH_GAP_RATIO` times the previous line's height, or a line that
/// starts above the previous one (new column), begins a new paragraph. Lines
/// within a paragraph are joined with a space; blank lines are ignored.
pub fn group_paragraphs(lines: &[LineBox]) -> Vec<String> {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut previous: Option<&LineBox> = None;

    for line in lines {
        let text = line.text.trim();
        if text.is_empty() {
            continue;
        }

        let continues = previous.is_some_and(|prev| {
            let gap = line.top - prev.bottom;
            line.top >= prev.top && gap <= prev.height() * PARAGRAPH_GAP_RATIO
        });

        match paragraphs.last_mut() {
            Some(current) if continues => {
                current.push(' ');
                current.push_str(text);
            }
            _ => paragraphs.push(text.to_string()),
        }
        previous = Some(line);
    }

    paragraphs
}
