//! Trim entities: spans located relative to anchor words.
//!
//! A trim entity holds an ordered list of conditions per locale. Every
//! condition is applied independently, so several conditions of the same
//! entity may produce overlapping edges; reconciling them is left to the
//! manager.

mod condition;

pub use condition::{AnchorMatch, TrimCondition, TrimOptions};

use std::collections::HashMap;

use super::locale::LocaleMap;
use super::text::TextIndex;
use super::types::{Edge, TrimType};
use crate::Result;

/// Entity extracted through positional conditions.
#[derive(Debug, Clone, Default)]
pub struct TrimEntity {
    conditions: LocaleMap<Vec<TrimCondition>>,
    locale_fallbacks: HashMap<String, String>,
}

impl TrimEntity {
    /// Create an entity without conditions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a condition to each of the given locales.
    pub fn add_condition<L: AsRef<str>>(&mut self, locales: &[L], condition: TrimCondition) {
        for locale in locales {
            self.conditions
                .ensure(locale.as_ref())
                .push(condition.clone());
        }
    }

    /// Build and append a `between` condition.
    pub fn add_between_condition<L, W, R>(
        &mut self,
        locales: &[L],
        left_words: &[W],
        right_words: &[R],
        options: TrimOptions,
    ) -> Result<()>
    where
        L: AsRef<str>,
        W: AsRef<str>,
        R: AsRef<str>,
    {
        let condition = TrimCondition::between(left_words, right_words, options)?;
        self.add_condition(locales, condition);
        Ok(())
    }

    /// Build and append a position condition (`before*` / `after*`).
    pub fn add_position_condition<L, W>(
        &mut self,
        trim_type: TrimType,
        locales: &[L],
        words: &[W],
        options: TrimOptions,
    ) -> Result<()>
    where
        L: AsRef<str>,
        W: AsRef<str>,
    {
        let condition = TrimCondition::position(trim_type, words, options)?;
        self.add_condition(locales, condition);
        Ok(())
    }

    /// Conditions registered for exactly `locale`, in registration order.
    pub fn conditions(&self, locale: &str) -> &[TrimCondition] {
        self.conditions
            .try_get(locale)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Remove every condition of a locale.
    pub fn clear_conditions(&mut self, locale: &str) -> usize {
        self.conditions.remove(locale).map_or(0, |c| c.len())
    }

    /// Locales with conditions, in registration order.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.conditions.locales()
    }

    /// Explicit locale fallbacks consulted before the first registered locale.
    pub fn locale_fallbacks(&self) -> &HashMap<String, String> {
        &self.locale_fallbacks
    }

    /// Resolve `locale` to `fallback` when `locale` has no conditions.
    pub fn set_locale_fallback(&mut self, locale: impl Into<String>, fallback: impl Into<String>) {
        self.locale_fallbacks.insert(locale.into(), fallback.into());
    }

    /// Apply every condition of the resolved locale and concatenate the edges.
    pub fn extract(&self, entity_name: &str, utterance: &str, locale: &str) -> Vec<Edge> {
        if utterance.is_empty() {
            return Vec::new();
        }
        let Some(conditions) = self.conditions.resolve(locale, &self.locale_fallbacks) else {
            return Vec::new();
        };
        let index = TextIndex::new(utterance);
        conditions
            .iter()
            .flat_map(|condition| condition.apply(entity_name, &index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conditions_are_not_deduplicated() {
        let mut entity = TrimEntity::new();
        entity
            .add_between_condition(&["en"], &["from"], &["to"], TrimOptions::new())
            .unwrap();
        entity
            .add_position_condition(TrimType::AfterLast, &["en"], &["from"], TrimOptions::new())
            .unwrap();

        let edges = entity.extract("city", "I must go from Barcelona to Madrid", "en");
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].source_text, "Barcelona");
        assert_eq!(edges[1].source_text, "Barcelona to Madrid");
        assert!(edges[0].overlaps(&edges[1]));
    }

    #[test]
    fn test_locale_fallback() {
        let mut entity = TrimEntity::new();
        entity
            .add_between_condition(&["es"], &["desde"], &["hasta"], TrimOptions::new())
            .unwrap();
        entity
            .add_between_condition(&["en"], &["from"], &["to"], TrimOptions::new())
            .unwrap();

        let edges = entity.extract("city", "desde Lima hasta Quito", "fr");
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].source_text, "Lima");

        entity.set_locale_fallback("en-GB", "en");
        let edges = entity.extract("city", "from Leeds to York", "en-GB");
        assert_eq!(edges[0].source_text, "Leeds");
    }

    #[test]
    fn test_invalid_condition_is_not_registered() {
        let mut entity = TrimEntity::new();
        let empty: &[&str] = &[];
        assert!(
            entity
                .add_position_condition(TrimType::After, &["en"], empty, TrimOptions::new())
                .is_err()
        );
        assert!(entity.conditions("en").is_empty());
        assert_eq!(entity.locales().count(), 0);
    }

    #[test]
    fn test_empty_utterance_and_unknown_entity_data() {
        let entity = TrimEntity::new();
        assert!(entity.extract("city", "from a to b", "en").is_empty());

        let mut entity = TrimEntity::new();
        entity
            .add_between_condition(&["en"], &["from"], &["to"], TrimOptions::new())
            .unwrap();
        assert!(entity.extract("city", "", "en").is_empty());
        assert_eq!(entity.clear_conditions("en"), 1);
    }
}
