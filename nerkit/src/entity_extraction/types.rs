//! Edge and kind types shared by every matcher.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::NerError;

/// Which matcher produced an edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    /// Fuzzy dictionary match
    Enum,
    /// Regular expression match
    Regex,
    /// Anchor-word trim match
    Trim,
    /// Opaque edge supplied by the caller (dates, numbers, ...)
    Builtin,
}

impl EdgeType {
    /// Get a string representation of the edge type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Enum => "enum",
            EdgeType::Regex => "regex",
            EdgeType::Trim => "trim",
            EdgeType::Builtin => "builtin",
        }
    }
}

/// Positional condition types of trim entities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TrimType {
    /// Text between a left and a right anchor
    Between,
    /// Text before every anchor occurrence
    Before,
    /// Text before the first anchor occurrence
    BeforeFirst,
    /// Text before the last anchor occurrence
    BeforeLast,
    /// Text after every anchor occurrence
    After,
    /// Text after the first anchor occurrence
    AfterFirst,
    /// Text after the last anchor occurrence
    AfterLast,
}

impl TrimType {
    /// Every trim type, in declaration order.
    pub const ALL: [TrimType; 7] = [
        TrimType::Between,
        TrimType::Before,
        TrimType::BeforeFirst,
        TrimType::BeforeLast,
        TrimType::After,
        TrimType::AfterFirst,
        TrimType::AfterLast,
    ];

    /// Get a string representation of the trim type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrimType::Between => "between",
            TrimType::Before => "before",
            TrimType::BeforeFirst => "beforeFirst",
            TrimType::BeforeLast => "beforeLast",
            TrimType::After => "after",
            TrimType::AfterFirst => "afterFirst",
            TrimType::AfterLast => "afterLast",
        }
    }

    /// Fixed accuracy reported for edges of this type.
    ///
    /// Between is delimited on both sides; every other type infers one of its
    /// boundaries from the utterance edge.
    pub fn accuracy(&self) -> f64 {
        match self {
            TrimType::Between => 1.0,
            _ => 0.99,
        }
    }

    /// Canonical text of a span cut by this type.
    ///
    /// Position types run up to an utterance edge and so tend to drag
    /// punctuation along; it is stripped from both ends. Between spans are
    /// kept as they are.
    pub fn source_text<'a>(&self, text: &'a str) -> &'a str {
        match self {
            TrimType::Between => text,
            _ => text.trim_matches(|c: char| c.is_whitespace() || SOURCE_PUNCTUATION.contains(&c)),
        }
    }
}

/// Characters stripped from both ends of the canonical text of position edges.
const SOURCE_PUNCTUATION: &[char] = &[
    ',', '.', '!', '?', ';', ':', '(', ')', '[', ']', '\'', '"', '¡', '¿', '/',
];

impl fmt::Display for TrimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrimType {
    type Err = NerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrimType::ALL
            .iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| NerError::InvalidCondition(format!("Unknown trim type: {}", s)))
    }
}

/// Kind of an entity definition, used when registering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityKindTag {
    /// Dictionary of options matched approximately
    Enum,
    /// Per-locale regular expression
    Regex,
    /// Per-locale anchor conditions
    Trim,
}

impl EntityKindTag {
    /// Get a string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKindTag::Enum => "enum",
            EntityKindTag::Regex => "regex",
            EntityKindTag::Trim => "trim",
        }
    }
}

impl fmt::Display for EntityKindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKindTag {
    type Err = NerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "enum" => Ok(EntityKindTag::Enum),
            "regex" => Ok(EntityKindTag::Regex),
            "trim" => Ok(EntityKindTag::Trim),
            other => Err(NerError::Other(format!("Unknown entity kind: {}", other))),
        }
    }
}

/// A single located match of an entity inside an utterance.
///
/// Offsets are half-open character (code point) offsets into the utterance,
/// so `utterance_text` is always the characters `start..end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// First character of the match
    pub start: usize,
    /// One past the last character of the match
    pub end: usize,
    /// `end - start`
    pub len: usize,
    /// Confidence in `[0, 1]`, 1.0 meaning exact
    pub accuracy: f64,
    /// Edit distance to the dictionary text (enum edges only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levenshtein: Option<usize>,
    /// Output entity name, possibly numbered (`hero_2`)
    pub entity: String,
    /// Dictionary option that matched (enum edges only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    /// Canonical form that matched
    pub source_text: String,
    /// Literal substring of the utterance
    pub utterance_text: String,
    /// Matcher kind
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    /// Trim condition type (trim edges only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<TrimType>,
}

impl Edge {
    /// Create a new edge covering `start..end`.
    pub fn new(
        edge_type: EdgeType,
        entity: impl Into<String>,
        start: usize,
        end: usize,
        accuracy: f64,
        utterance_text: impl Into<String>,
    ) -> Self {
        let utterance_text = utterance_text.into();
        Self {
            start,
            end,
            len: end.saturating_sub(start),
            accuracy,
            levenshtein: None,
            entity: entity.into(),
            option: None,
            source_text: utterance_text.clone(),
            utterance_text,
            edge_type,
            subtype: None,
        }
    }

    /// Set the canonical text.
    pub fn with_source_text(mut self, source_text: impl Into<String>) -> Self {
        self.source_text = source_text.into();
        self
    }

    /// Set the matched dictionary option.
    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.option = Some(option.into());
        self
    }

    /// Set the edit distance.
    pub fn with_levenshtein(mut self, levenshtein: usize) -> Self {
        self.levenshtein = Some(levenshtein);
        self
    }

    /// Set the trim condition type.
    pub fn with_subtype(mut self, subtype: TrimType) -> Self {
        self.subtype = Some(subtype);
        self
    }

    /// Check whether two edges share at least one character.
    pub fn overlaps(&self, other: &Edge) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check whether `other` lies entirely inside this edge.
    pub fn contains(&self, other: &Edge) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Check if the edge covers no characters.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get a formatted string representation of the edge.
    pub fn format(&self) -> String {
        format!(
            "{} [{}] {}..{} (accuracy: {:.2}, type: {})",
            self.utterance_text,
            self.entity,
            self.start,
            self.end,
            self.accuracy,
            self.edge_type.as_str()
        )
    }
}
