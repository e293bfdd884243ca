//! Word geometry and finding-to-word matching

use serde::{Deserialize, Serialize};

/// Axis-aligned box in page units, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f32,
    pub top: f32,
    pub x1: f32,
    pub bottom: f32,
}

impl BoundingBox {
    pub fn new(x0: f32, top: f32, x1: f32, bottom: f32) -> Self {
        Self { x0, top, x1, bottom }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Grow by `padding` on every side, clipped to `[0, width] x [0, height]`
    pub fn padded(&self, padding: f32, width: f32, height: f32) -> Self {
        Self {
            x0: (self.x0 - padding).clamp(0.0, width),
            top: (self.top - padding).clamp(0.0, height),
            x1: (self.x1 + padding).clamp(0.0, width),
            bottom: (self.bottom + padding).clamp(0.0, height),
        }
    }
}

/// One word supplied by the extraction layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub bbox: BoundingBox,
}

impl Word {
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// Words and dimensions of one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageWords {
    /// 1-based page number
    pub number: u32,
    pub width: f32,
    pub height: f32,
    /// Full page text (or a diagnostic placeholder for unreadable pages)
    pub text: String,
    pub words: Vec<Word>,
}

impl PageWords {
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            text: String::new(),
            words: Vec::new(),
        }
    }

    /// Append a word, extending the page text
    pub fn push_word(&mut self, word: Word) {
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push(' ');
        }
        self.text.push_str(&word.text);
        self.words.push(word);
    }

    /// End the current line of page text
    pub fn break_line(&mut self) {
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
    }
}

/// Word region to paint, with the finding that matched it
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedBox {
    pub bbox: BoundingBox,
    pub finding: String,
}

/// Find the words covered by `findings` on one page
///
/// A word matches when its text equals a finding or contains it. Findings
/// shorter than `min_length` characters are ignored. `findings` should be
/// ordered longest first: each word is reported once, for the first finding
/// that matches it. Returned boxes are padded and clipped to the page.
pub fn match_words(
    page: &PageWords,
    findings: &[&str],
    min_length: usize,
    padding: f32,
) -> Vec<MatchedBox> {
    let eligible: Vec<&str> = findings
        .iter()
        .copied()
        .filter(|f| f.chars().count() >= min_length)
        .collect();

    page.words
        .iter()
        .filter_map(|word| {
            eligible
                .iter()
                .find(|finding| word.text.contains(**finding))
                .map(|finding| MatchedBox {
                    bbox: word.bbox.padded(padding, page.width, page.height),
                    finding: (*finding).to_string(),
                })
        })
        .collect()
}
