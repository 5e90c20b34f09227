//! Regular expression entities: one compiled pattern per locale.

use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

use super::locale::LocaleMap;
use super::text::TextIndex;
use super::types::{Edge, EdgeType};
use crate::{NerError, Result};

/// Entity extracted by applying a per-locale regular expression.
#[derive(Debug, Clone, Default)]
pub struct RegexEntity {
    patterns: LocaleMap<Option<Regex>>,
    locale_fallbacks: HashMap<String, String>,
}

impl RegexEntity {
    /// Create an entity without patterns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `source` and assign it to each of the given locales.
    ///
    /// `source` is either a plain pattern or a `/pattern/flags` literal. The
    /// `i`, `m`, `s` and `x` flags are honoured; `g`, `u` and `y` are accepted
    /// and ignored since matching always collects every occurrence.
    pub fn add_regex<L: AsRef<str>>(&mut self, locales: &[L], source: &str) -> Result<()> {
        let regex = compile_source(source)?;
        self.add_compiled(locales, regex);
        Ok(())
    }

    /// Assign an already compiled regex to each of the given locales.
    pub fn add_compiled<L: AsRef<str>>(&mut self, locales: &[L], regex: Regex) {
        for locale in locales {
            *self.patterns.ensure(locale.as_ref()) = Some(regex.clone());
        }
    }

    /// Pattern registered for exactly `locale`.
    pub fn pattern(&self, locale: &str) -> Option<&Regex> {
        self.patterns.try_get(locale).and_then(Option::as_ref)
    }

    /// Locales with a pattern, in registration order.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.patterns.locales()
    }

    /// Explicit locale fallbacks consulted before the first registered locale.
    pub fn locale_fallbacks(&self) -> &HashMap<String, String> {
        &self.locale_fallbacks
    }

    /// Resolve `locale` to `fallback` when `locale` has no pattern.
    pub fn set_locale_fallback(&mut self, locale: impl Into<String>, fallback: impl Into<String>) {
        self.locale_fallbacks.insert(locale.into(), fallback.into());
    }

    /// Extract every non-overlapping match, left to right, with accuracy 1.
    pub fn extract(&self, entity_name: &str, utterance: &str, locale: &str) -> Vec<Edge> {
        let Some(regex) = self
            .patterns
            .resolve(locale, &self.locale_fallbacks)
            .and_then(Option::as_ref)
        else {
            return Vec::new();
        };

        let index = TextIndex::new(utterance);
        regex
            .find_iter(utterance)
            .filter(|m| !m.as_str().is_empty())
            .map(|m| {
                Edge::new(
                    EdgeType::Regex,
                    entity_name,
                    index.char_offset(m.start()),
                    index.char_offset(m.end()),
                    1.0,
                    m.as_str(),
                )
            })
            .collect()
    }
}

/// Compile a plain pattern or a `/pattern/flags` literal.
pub fn compile_source(source: &str) -> Result<Regex> {
    let (pattern, flags) = split_literal(source);
    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            'g' | 'u' | 'y' => {}
            other => {
                return Err(NerError::InvalidPattern {
                    pattern: source.to_string(),
                    reason: format!("unsupported flag '{}'", other),
                });
            }
        }
    }
    builder.build().map_err(|e| NerError::InvalidPattern {
        pattern: source.to_string(),
        reason: e.to_string(),
    })
}

fn split_literal(source: &str) -> (&str, &str) {
    if let Some(rest) = source.strip_prefix('/')
        && let Some(close) = rest.rfind('/')
    {
        let flags = &rest[close + 1..];
        if flags.chars().all(|c| c.is_ascii_alphabetic()) {
            return (&rest[..close], flags);
        }
    }
    (source, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_every_email() {
        let mut entity = RegexEntity::new();
        entity
            .add_regex(&["en"], r"/[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}/gi")
            .unwrap();
        let text = "My email is a@b.com and yours is c@d.com";
        let edges = entity.extract("email", text, "en");
        assert_eq!(edges.len(), 2);
        assert_eq!((edges[0].start, edges[0].end), (12, 19));
        assert_eq!(edges[0].utterance_text, "a@b.com");
        assert_eq!((edges[1].start, edges[1].end), (33, 40));
        assert_eq!(edges[1].source_text, "c@d.com");
        assert!(edges.iter().all(|e| e.accuracy == 1.0));
        assert!(edges.iter().all(|e| e.edge_type == EdgeType::Regex));
    }

    #[test]
    fn test_literal_flags() {
        let regex = compile_source("/HELLO/gi").unwrap();
        assert!(regex.is_match("well hello there"));

        let regex = compile_source("/HELLO/g").unwrap();
        assert!(!regex.is_match("well hello there"));

        assert!(compile_source("/a/q").is_err());
        assert!(compile_source("(unclosed").is_err());
    }

    #[test]
    fn test_plain_pattern_with_slashes() {
        let regex = compile_source(r"\d+/\d+").unwrap();
        assert!(regex.is_match("10/12"));
    }

    #[test]
    fn test_char_offsets_for_multibyte_text() {
        let mut entity = RegexEntity::new();
        entity.add_regex(&["es"], r"\d+").unwrap();
        let edges = entity.extract("number", "año 2024", "es");
        assert_eq!(edges.len(), 1);
        assert_eq!((edges[0].start, edges[0].end), (4, 8));
    }

    #[test]
    fn test_locale_resolution() {
        let mut entity = RegexEntity::new();
        assert!(entity.extract("n", "42", "en").is_empty());

        entity.add_regex(&["fr"], r"\d+").unwrap();
        assert_eq!(entity.extract("n", "42", "en").len(), 1);
        assert!(entity.pattern("en").is_none());
        assert!(entity.pattern("fr").is_some());
    }
}
