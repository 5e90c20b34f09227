//! Anchor-word conditions and the spans they cut out of an utterance.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::entity_extraction::text::TextIndex;
use crate::entity_extraction::types::{Edge, EdgeType, TrimType};
use crate::{NerError, Result};

/// Options shared by every trim condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrimOptions {
    /// Edges whose text equals one of these words are dropped
    pub skip: Vec<String>,
    /// Match anchors with case sensitivity
    pub case_sensitive: bool,
    /// Match anchors anywhere instead of as whitespace-delimited words, and
    /// keep the whitespace around produced spans
    pub no_spaces: bool,
    /// Between conditions span from the first left anchor to the last right
    /// anchor instead of between the nearest pair
    pub widest: bool,
}

impl TrimOptions {
    /// Default options: case-insensitive, whitespace-delimited anchors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the skip list.
    pub fn with_skip<S: AsRef<str>>(mut self, skip: &[S]) -> Self {
        self.skip = skip.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Set case sensitivity.
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Set whether anchors may match inside words.
    pub fn with_no_spaces(mut self, no_spaces: bool) -> Self {
        self.no_spaces = no_spaces;
        self
    }

    /// Set whether between conditions take the widest span.
    pub fn with_widest(mut self, widest: bool) -> Self {
        self.widest = widest;
        self
    }

    fn must_skip(&self, text: &str) -> bool {
        self.skip.iter().any(|word| {
            if self.case_sensitive {
                word == text
            } else {
                word.to_lowercase() == text.to_lowercase()
            }
        })
    }
}

/// Occurrence of an anchor word, in character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorMatch {
    /// First character of the anchor
    pub start: usize,
    /// One past the last character of the anchor
    pub end: usize,
}

#[derive(Debug, Clone)]
struct Anchor {
    word: String,
    regex: Regex,
}

impl Anchor {
    fn compile(word: &str, options: &TrimOptions) -> Result<Self> {
        let regex = RegexBuilder::new(&regex::escape(word))
            .case_insensitive(!options.case_sensitive)
            .build()
            .map_err(|e| NerError::InvalidPattern {
                pattern: word.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            word: word.to_string(),
            regex,
        })
    }

    /// Every occurrence, including overlapping ones, left to right.
    fn find(&self, index: &TextIndex<'_>, no_spaces: bool) -> Vec<AnchorMatch> {
        let text = index.as_str();
        let chars = index.chars();
        let mut found = Vec::new();
        let mut cursor = 0;
        while cursor <= text.len() {
            let Some(m) = self.regex.find_at(text, cursor) else {
                break;
            };
            let start = index.char_offset(m.start());
            let end = index.char_offset(m.end());
            let bounded = no_spaces
                || ((start == 0 || chars[start - 1].is_whitespace())
                    && (end == chars.len() || chars[end].is_whitespace()));
            if bounded && end > start {
                found.push(AnchorMatch { start, end });
            }
            cursor = index.byte_offset(start + 1);
            if m.start() >= text.len() {
                break;
            }
        }
        found
    }
}

/// A positional rule cutting an entity out of an utterance.
#[derive(Debug, Clone)]
pub struct TrimCondition {
    trim_type: TrimType,
    left: Vec<Anchor>,
    right: Vec<Anchor>,
    words: Vec<Anchor>,
    options: TrimOptions,
}

impl TrimCondition {
    /// Span between any of `left_words` and any of `right_words`.
    pub fn between<L, R>(left_words: &[L], right_words: &[R], options: TrimOptions) -> Result<Self>
    where
        L: AsRef<str>,
        R: AsRef<str>,
    {
        let left = compile_anchors(left_words, &options, "left")?;
        let right = compile_anchors(right_words, &options, "right")?;
        Ok(Self {
            trim_type: TrimType::Between,
            left,
            right,
            words: Vec::new(),
            options,
        })
    }

    /// Span before or after the anchor words, depending on `trim_type`.
    pub fn position<W: AsRef<str>>(
        trim_type: TrimType,
        words: &[W],
        options: TrimOptions,
    ) -> Result<Self> {
        if trim_type == TrimType::Between {
            return Err(NerError::InvalidCondition(
                "between conditions need left and right words".to_string(),
            ));
        }
        let words = compile_anchors(words, &options, "anchor")?;
        Ok(Self {
            trim_type,
            left: Vec::new(),
            right: Vec::new(),
            words,
            options,
        })
    }

    /// Type of the condition.
    pub fn trim_type(&self) -> TrimType {
        self.trim_type
    }

    /// Left anchor words (between only).
    pub fn left_words(&self) -> Vec<&str> {
        self.left.iter().map(|a| a.word.as_str()).collect()
    }

    /// Right anchor words (between only).
    pub fn right_words(&self) -> Vec<&str> {
        self.right.iter().map(|a| a.word.as_str()).collect()
    }

    /// Anchor words of position conditions.
    pub fn words(&self) -> Vec<&str> {
        self.words.iter().map(|a| a.word.as_str()).collect()
    }

    /// Options of the condition.
    pub fn options(&self) -> &TrimOptions {
        &self.options
    }

    /// Replace the options and recompile every anchor.
    pub fn set_options(&mut self, options: TrimOptions) -> Result<()> {
        let recompile = |anchors: &[Anchor]| -> Result<Vec<Anchor>> {
            anchors
                .iter()
                .map(|a| Anchor::compile(&a.word, &options))
                .collect()
        };
        let left = recompile(&self.left)?;
        let right = recompile(&self.right)?;
        let words = recompile(&self.words)?;
        self.left = left;
        self.right = right;
        self.words = words;
        self.options = options;
        Ok(())
    }

    /// Occurrences of `word` in the indexed utterance under this condition's
    /// case and spacing rules.
    pub fn find_word(&self, index: &TextIndex<'_>, word: &str) -> Result<Vec<AnchorMatch>> {
        let anchor = Anchor::compile(word, &self.options)?;
        Ok(anchor.find(index, self.options.no_spaces))
    }

    /// Apply the condition to an utterance.
    pub fn apply(&self, entity_name: &str, index: &TextIndex<'_>) -> Vec<Edge> {
        let spans = match self.trim_type {
            TrimType::Between => self.between_spans(index),
            _ => self.position_spans(index),
        };

        spans
            .into_iter()
            .filter_map(|(start, end)| {
                let (start, end) = if self.options.no_spaces {
                    (start, end)
                } else {
                    index.trim_span(start, end)
                };
                if start >= end {
                    return None;
                }
                let text = index.slice(start, end);
                if self.options.must_skip(text) {
                    return None;
                }
                let source = self.trim_type.source_text(text);
                Some(
                    Edge::new(
                        EdgeType::Trim,
                        entity_name,
                        start,
                        end,
                        self.trim_type.accuracy(),
                        text,
                    )
                    .with_source_text(source)
                    .with_subtype(self.trim_type),
                )
            })
            .collect()
    }

    fn between_spans(&self, index: &TextIndex<'_>) -> Vec<(usize, usize)> {
        let no_spaces = self.options.no_spaces;
        let lefts = collect_sorted(&self.left, index, no_spaces);
        let rights = collect_sorted(&self.right, index, no_spaces);

        let mut spans = Vec::new();
        let mut cursor = 0;
        loop {
            let Some(first_left) = lefts.iter().find(|l| l.start >= cursor) else {
                break;
            };
            if self.options.widest {
                let Some(right) = rights.iter().rev().find(|r| r.start >= first_left.end) else {
                    break;
                };
                spans.push((first_left.end, right.start));
                cursor = right.start;
                continue;
            }
            let Some(right) = rights.iter().find(|r| r.start >= first_left.end) else {
                break;
            };
            // nearest left anchor still before the right one
            let left = lefts
                .iter()
                .filter(|l| l.start >= cursor && l.end <= right.start)
                .max_by_key(|l| l.end)
                .unwrap_or(first_left);
            spans.push((left.end, right.start));
            cursor = right.start;
        }
        spans
    }

    fn position_spans(&self, index: &TextIndex<'_>) -> Vec<(usize, usize)> {
        let len = index.len();
        let mut spans = Vec::new();
        for anchor in &self.words {
            let found = anchor.find(index, self.options.no_spaces);
            let (Some(first), Some(last)) = (found.first(), found.last()) else {
                continue;
            };
            match self.trim_type {
                TrimType::Before => {
                    let mut start = 0;
                    for occurrence in &found {
                        spans.push((start, occurrence.start));
                        start = occurrence.end;
                    }
                }
                TrimType::BeforeFirst => spans.push((0, first.start)),
                TrimType::BeforeLast => spans.push((0, last.start)),
                TrimType::After => {
                    let mut end = len;
                    let mut after = Vec::with_capacity(found.len());
                    for occurrence in found.iter().rev() {
                        after.push((occurrence.end, end));
                        end = occurrence.start;
                    }
                    after.reverse();
                    spans.extend(after);
                }
                TrimType::AfterFirst => spans.push((first.end, len)),
                TrimType::AfterLast => spans.push((last.end, len)),
                TrimType::Between => {}
            }
        }
        spans
    }
}

fn compile_anchors<W: AsRef<str>>(
    words: &[W],
    options: &TrimOptions,
    side: &str,
) -> Result<Vec<Anchor>> {
    if words.is_empty() {
        return Err(NerError::InvalidCondition(format!(
            "{} anchor list is empty",
            side
        )));
    }
    words
        .iter()
        .map(|word| {
            let word = word.as_ref();
            if word.trim().is_empty() {
                return Err(NerError::InvalidCondition(format!(
                    "{} anchor word is empty",
                    side
                )));
            }
            Anchor::compile(word, options)
        })
        .collect()
}

fn collect_sorted(anchors: &[Anchor], index: &TextIndex<'_>, no_spaces: bool) -> Vec<AnchorMatch> {
    let mut found: Vec<AnchorMatch> = anchors
        .iter()
        .flat_map(|a| a.find(index, no_spaces))
        .collect();
    found.sort_by_key(|m| (m.start, m.end));
    found
}
