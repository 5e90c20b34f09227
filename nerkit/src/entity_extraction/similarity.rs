//! Approximate string matching used by dictionary entities.
//!
//! Provides Levenshtein distance, word-span scanning, best fuzzy substring
//! search and the multi-entity scan that turns dictionary texts into edges.

use serde::{Deserialize, Serialize};
use tracing::trace;
use unicode_normalization::UnicodeNormalization;

use super::enum_entity::EnumEntity;
use super::text::TextIndex;
use super::types::{Edge, EdgeType};

/// How characters are compared when computing distances.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMode {
    /// Code points compared as-is
    #[default]
    Exact,
    /// Both strings stripped of diacritics and lowercased before comparing
    Normalized,
    /// Characters compared by base letter, ignoring accents and case
    Collator,
}

/// A maximal run of alphanumeric characters, in character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSpan {
    /// First character of the word
    pub start: usize,
    /// One past the last character of the word
    pub end: usize,
    /// `end - start`
    pub len: usize,
}

/// A word-aligned span of a haystack and its distance to a needle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubstringMatch {
    /// First character of the span
    pub start: usize,
    /// One past the last character of the span
    pub end: usize,
    /// `end - start`
    pub len: usize,
    /// Edit distance between the span and the needle
    pub levenshtein: usize,
    /// `1 - levenshtein / len(needle)`, clamped to `[0, 1]`
    pub accuracy: f64,
}

/// An utterance prepared once and shared by every dictionary text scanned
/// against it.
#[derive(Debug, Clone)]
pub struct PreparedText<'a> {
    index: TextIndex<'a>,
    spans: Vec<WordSpan>,
    folded: Vec<char>,
    // folded[fold_starts[i]..fold_starts[i + 1]] is the folded form of char i
    fold_starts: Vec<usize>,
}

impl<'a> PreparedText<'a> {
    /// Character index of the utterance.
    pub fn index(&self) -> &TextIndex<'a> {
        &self.index
    }

    /// Word spans of the utterance.
    pub fn word_spans(&self) -> &[WordSpan] {
        &self.spans
    }

    fn folded_range(&self, start: usize, end: usize) -> &[char] {
        &self.folded[self.fold_starts[start]..self.fold_starts[end]]
    }
}

/// Similarity engine: distances, word spans and fuzzy substring search.
#[derive(Debug, Clone, Default)]
pub struct SimilarityMatcher {
    mode: ComparisonMode,
}

impl SimilarityMatcher {
    /// Create a matcher comparing code points exactly.
    pub fn new() -> Self {
        Self::with_mode(ComparisonMode::Exact)
    }

    /// Create a matcher that ignores diacritics and case.
    pub fn normalized() -> Self {
        Self::with_mode(ComparisonMode::Normalized)
    }

    /// Create a matcher with the given comparison mode.
    pub fn with_mode(mode: ComparisonMode) -> Self {
        Self { mode }
    }

    /// The comparison mode in use.
    pub fn mode(&self) -> ComparisonMode {
        self.mode
    }

    /// Levenshtein distance between `a` and `b` under the configured mode.
    pub fn distance(&self, a: &str, b: &str) -> usize {
        let left: Vec<char> = a.chars().collect();
        let right: Vec<char> = b.chars().collect();
        let left = self.fold_all(&left);
        let right = self.fold_all(&right);
        self.distance_chars(&left, &right)
    }

    /// Group maximal runs of alphanumeric characters into spans.
    pub fn word_spans(&self, text: &str) -> Vec<WordSpan> {
        let chars: Vec<char> = text.chars().collect();
        scan_word_spans(&chars)
    }

    /// Index an utterance for repeated searches.
    pub fn prepare<'a>(&self, text: &'a str) -> PreparedText<'a> {
        let index = TextIndex::new(text);
        let spans = scan_word_spans(index.chars());
        let mut folded = Vec::with_capacity(index.len());
        let mut fold_starts = Vec::with_capacity(index.len() + 1);
        for &c in index.chars() {
            fold_starts.push(folded.len());
            match self.mode {
                ComparisonMode::Normalized => folded.extend(fold_char(c)),
                _ => folded.push(c),
            }
        }
        fold_starts.push(folded.len());
        PreparedText {
            index,
            spans,
            folded,
            fold_starts,
        }
    }

    /// Find the word-aligned span of `haystack` closest to `needle`.
    ///
    /// Ties keep the leftmost span, and for the same start the widest one.
    pub fn best_substring(&self, haystack: &str, needle: &str) -> SubstringMatch {
        let prepared = self.prepare(haystack);
        self.best_substring_in(&prepared, needle)
    }

    /// `best_substring` against an already prepared haystack.
    pub fn best_substring_in(&self, prepared: &PreparedText<'_>, needle: &str) -> SubstringMatch {
        let needle_chars: Vec<char> = needle.chars().collect();
        let needle_len = needle_chars.len();
        if needle_len == 0 {
            return SubstringMatch {
                start: 0,
                end: 0,
                len: 0,
                levenshtein: 0,
                accuracy: 1.0,
            };
        }
        let folded_needle = self.fold_all(&needle_chars);

        let mut best: Option<SubstringMatch> = None;
        let spans = &prepared.spans;
        for i in 0..spans.len() {
            for j in i..spans.len() {
                let (start, end) = (spans[i].start, spans[j].end);
                let candidate = prepared.folded_range(start, end);
                if let Some(ref b) = best
                    && candidate.len() > folded_needle.len() + b.levenshtein
                {
                    break;
                }
                let levenshtein = self.distance_chars(candidate, &folded_needle);
                let better = match best {
                    None => true,
                    Some(ref b) => {
                        levenshtein < b.levenshtein
                            || (levenshtein == b.levenshtein && start == b.start && end > b.end)
                    }
                };
                if better {
                    best = Some(SubstringMatch {
                        start,
                        end,
                        len: end - start,
                        levenshtein,
                        accuracy: accuracy_for(levenshtein, needle_len),
                    });
                }
            }
        }

        best.unwrap_or(SubstringMatch {
            start: 0,
            end: 0,
            len: 0,
            levenshtein: needle_len,
            accuracy: 0.0,
        })
    }

    /// Every word-aligned span of `haystack` whose accuracy against `needle`
    /// reaches `threshold`, ordered by start then end.
    pub fn substring_matches(
        &self,
        haystack: &str,
        needle: &str,
        threshold: f64,
    ) -> Vec<SubstringMatch> {
        let prepared = self.prepare(haystack);
        self.substring_matches_in(&prepared, needle, threshold)
    }

    /// `substring_matches` against an already prepared haystack.
    pub fn substring_matches_in(
        &self,
        prepared: &PreparedText<'_>,
        needle: &str,
        threshold: f64,
    ) -> Vec<SubstringMatch> {
        let needle_chars: Vec<char> = needle.chars().collect();
        let needle_len = needle_chars.len();
        let mut result = Vec::new();
        if needle_len == 0 {
            return result;
        }
        let folded_needle = self.fold_all(&needle_chars);
        // levenshtein >= length difference, so longer candidates cannot pass
        let budget = if threshold > 0.0 {
            Some(((1.0 - threshold) * needle_len as f64).floor() as usize + 1)
        } else {
            None
        };

        let spans = &prepared.spans;
        for i in 0..spans.len() {
            for j in i..spans.len() {
                let (start, end) = (spans[i].start, spans[j].end);
                let candidate = prepared.folded_range(start, end);
                if let Some(budget) = budget
                    && candidate.len() > folded_needle.len() + budget
                {
                    break;
                }
                let levenshtein = self.distance_chars(candidate, &folded_needle);
                let accuracy = accuracy_for(levenshtein, needle_len);
                if accuracy >= threshold {
                    result.push(SubstringMatch {
                        start,
                        end,
                        len: end - start,
                        levenshtein,
                        accuracy,
                    });
                }
            }
        }
        result
    }

    /// Edges of a single dictionary entity inside a prepared utterance.
    ///
    /// Every option text contributes all candidates above `threshold`;
    /// overlapping candidates keep the lowest edit distance, ties going to
    /// the one generated first.
    pub fn entity_edges(
        &self,
        prepared: &PreparedText<'_>,
        entity_name: &str,
        entity: &EnumEntity,
        locale: &str,
        threshold: f64,
        option_whitelist: Option<&[&str]>,
    ) -> Vec<Edge> {
        let mut candidates = Vec::new();
        for option in entity.options() {
            if let Some(whitelist) = option_whitelist
                && !whitelist.contains(&option.name())
            {
                continue;
            }
            let Some(texts) = option.texts_for(locale, entity.locale_fallbacks()) else {
                continue;
            };
            for text in texts {
                for m in self.substring_matches_in(prepared, text, threshold) {
                    candidates.push(
                        Edge::new(
                            EdgeType::Enum,
                            entity_name,
                            m.start,
                            m.end,
                            m.accuracy,
                            prepared.index.slice(m.start, m.end),
                        )
                        .with_source_text(text.as_str())
                        .with_option(option.name())
                        .with_levenshtein(m.levenshtein),
                    );
                }
            }
        }

        candidates.sort_by_key(|edge| edge.levenshtein.unwrap_or(usize::MAX));
        let mut kept = keep_non_overlapping(candidates);
        kept.sort_by_key(|edge| edge.start);
        trace!(entity = entity_name, edges = kept.len(), "Dictionary entity scanned");
        kept
    }

    /// Scan every dictionary entity against the utterance.
    ///
    /// `definitions` is in registration order. When kept matches of
    /// different entities overlap, the lower accuracy one is dropped, ties
    /// dropping the later registered entity. The result is sorted by start.
    pub fn best_entity_matches(
        &self,
        text: &str,
        definitions: &[(&str, &EnumEntity)],
        locale: &str,
        threshold: f64,
    ) -> Vec<Edge> {
        if text.is_empty() || definitions.is_empty() {
            return Vec::new();
        }
        let prepared = self.prepare(text);
        let mut edges: Vec<Edge> = definitions
            .iter()
            .flat_map(|(name, entity)| {
                self.entity_edges(&prepared, name, entity, locale, threshold, None)
            })
            .collect();

        // Stable: equal accuracies keep registration order
        edges.sort_by(|a, b| {
            b.accuracy
                .partial_cmp(&a.accuracy)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut kept = keep_non_overlapping(edges);
        kept.sort_by_key(|edge| edge.start);
        kept
    }

    fn fold_all(&self, chars: &[char]) -> Vec<char> {
        match self.mode {
            ComparisonMode::Normalized => chars.iter().flat_map(|&c| fold_char(c)).collect(),
            _ => chars.to_vec(),
        }
    }

    fn distance_chars(&self, a: &[char], b: &[char]) -> usize {
        match self.mode {
            ComparisonMode::Collator => levenshtein(a, b, same_base_letter),
            _ => levenshtein(a, b, |x, y| x == y),
        }
    }
}

/// Edit distance between two character slices under a custom equality.
pub fn levenshtein<F>(a: &[char], b: &[char], eq: F) -> usize
where
    F: Fn(char, char) -> bool,
{
    let (a, b) = if a.len() > b.len() { (b, a) } else { (a, b) };

    let prefix = a.iter().zip(b.iter()).take_while(|(x, y)| eq(**x, **y)).count();
    let (a, b) = (&a[prefix..], &b[prefix..]);
    let suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| eq(**x, **y))
        .count();
    let (a, b) = (&a[..a.len() - suffix], &b[..b.len() - suffix]);

    if a.is_empty() {
        return b.len();
    }

    let mut row: Vec<usize> = (1..=a.len()).collect();
    for (j, &bc) in b.iter().enumerate() {
        let mut diagonal = j;
        let mut left = j + 1;
        for (i, &ac) in a.iter().enumerate() {
            let substitution = diagonal + usize::from(!eq(ac, bc));
            diagonal = row[i];
            let value = substitution.min(diagonal + 1).min(left + 1);
            row[i] = value;
            left = value;
        }
    }
    row[a.len() - 1]
}

fn accuracy_for(levenshtein: usize, needle_len: usize) -> f64 {
    if needle_len == 0 {
        return 1.0;
    }
    (needle_len.saturating_sub(levenshtein)) as f64 / needle_len as f64
}

fn scan_word_spans(chars: &[char]) -> Vec<WordSpan> {
    let mut spans = Vec::new();
    let mut current: Option<usize> = None;
    for (idx, c) in chars.iter().enumerate() {
        match (c.is_alphanumeric(), current) {
            (true, None) => current = Some(idx),
            (false, Some(start)) => {
                spans.push(WordSpan {
                    start,
                    end: idx,
                    len: idx - start,
                });
                current = None;
            }
            _ => {}
        }
    }
    if let Some(start) = current {
        spans.push(WordSpan {
            start,
            end: chars.len(),
            len: chars.len() - start,
        });
    }
    spans
}

fn keep_non_overlapping(ranked: Vec<Edge>) -> Vec<Edge> {
    let mut kept: Vec<Edge> = Vec::new();
    for edge in ranked {
        if !kept.iter().any(|k| k.overlaps(&edge)) {
            kept.push(edge);
        }
    }
    kept
}

/// Decompose, drop combining diacritics and lowercase a single character.
fn fold_char(c: char) -> impl Iterator<Item = char> {
    std::iter::once(c)
        .nfd()
        .filter(|d| !('\u{0300}'..='\u{036f}').contains(d))
        .flat_map(char::to_lowercase)
}

fn same_base_letter(a: char, b: char) -> bool {
    a == b || fold_char(a).eq(fold_char(b))
}
