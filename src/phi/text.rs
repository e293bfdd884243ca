//! Character-based windowing helpers
//!
//! Sizes here are counted in characters, offsets are byte offsets into the
//! `&str` being windowed. Every slice returned lies on char boundaries.

/// Split `text` into consecutive, non-overlapping windows of at most
/// `size` characters. A `size` of zero is treated as one.
pub fn chunks(text: &str, size: usize) -> Vec<&str> {
    let size = size.max(1);
    let mut windows = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == size {
            windows.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        windows.push(&text[start..]);
    }

    windows
}

/// Window of up to `radius` characters on each side of `start..end`
pub fn surrounding(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let start = floor_boundary(text, start.min(text.len()));
    let end = floor_boundary(text, end.min(text.len())).max(start);

    let left = text[..start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(start, |(idx, _)| idx);
    let right = advance(text, end, radius);

    &text[left..right]
}

/// Up to `len` characters immediately following byte offset `offset`
pub fn following(text: &str, offset: usize, len: usize) -> &str {
    let offset = floor_boundary(text, offset.min(text.len()));
    &text[offset..advance(text, offset, len)]
}

fn advance(text: &str, from: usize, chars: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(chars)
        .map_or(text.len(), |(idx, _)| from + idx)
}

fn floor_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
