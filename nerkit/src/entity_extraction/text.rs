//! Character-offset view of an utterance.
//!
//! Edges are expressed in characters, while `regex` and `str` slicing work in
//! bytes. `TextIndex` converts between the two.

/// Character view of an utterance with a byte-offset lookup table.
#[derive(Debug, Clone)]
pub struct TextIndex<'a> {
    text: &'a str,
    chars: Vec<char>,
    byte_starts: Vec<usize>,
}

impl<'a> TextIndex<'a> {
    /// Index the given text.
    pub fn new(text: &'a str) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut byte_starts = Vec::with_capacity(text.len() + 1);
        for (idx, c) in text.char_indices() {
            byte_starts.push(idx);
            chars.push(c);
        }
        byte_starts.push(text.len());
        Self {
            text,
            chars,
            byte_starts,
        }
    }

    /// The indexed text.
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// The characters of the text.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Number of characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Check if the text is empty.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Convert a byte offset (on a char boundary) into a character offset.
    pub fn char_offset(&self, byte: usize) -> usize {
        match self.byte_starts.binary_search(&byte) {
            Ok(pos) => pos,
            Err(pos) => pos.saturating_sub(1),
        }
    }

    /// Convert a character offset into a byte offset.
    pub fn byte_offset(&self, char_offset: usize) -> usize {
        let last = self.byte_starts.len() - 1;
        self.byte_starts[char_offset.min(last)]
    }

    /// Substring covering the characters `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let end = end.min(self.len());
        let start = start.min(end);
        &self.text[self.byte_offset(start)..self.byte_offset(end)]
    }

    /// Shrink `start..end` so it neither starts nor ends with whitespace.
    pub fn trim_span(&self, mut start: usize, mut end: usize) -> (usize, usize) {
        while start < end && self.chars[start].is_whitespace() {
            start += 1;
        }
        while end > start && self.chars[end - 1].is_whitespace() {
            end -= 1;
        }
        (start, end)
    }
}
