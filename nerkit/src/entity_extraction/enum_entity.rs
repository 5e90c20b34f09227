//! Dictionary entities: named options with per-locale surface texts.

use std::collections::HashMap;

use super::locale::LocaleMap;
use super::similarity::SimilarityMatcher;
use super::types::Edge;

/// One option of a dictionary entity, e.g. `spiderman` of entity `hero`.
#[derive(Debug, Clone)]
pub struct EnumOption {
    name: String,
    texts: LocaleMap<Vec<String>>,
}

impl EnumOption {
    /// Create an option without texts.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            texts: LocaleMap::new(),
        }
    }

    /// Name of the option.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Texts registered for exactly `locale`.
    pub fn texts(&self, locale: &str) -> Option<&[String]> {
        self.texts.try_get(locale).map(Vec::as_slice)
    }

    /// Texts for `locale` after fallback resolution.
    pub fn texts_for(
        &self,
        locale: &str,
        fallbacks: &HashMap<String, String>,
    ) -> Option<&[String]> {
        self.texts.resolve(locale, fallbacks).map(Vec::as_slice)
    }

    /// Locales this option has texts for, in registration order.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.texts.locales()
    }

    /// Add a text for a locale; adding an already present text is a no-op.
    pub fn add_text(&mut self, locale: &str, text: &str) {
        let texts = self.texts.ensure(locale);
        if !texts.iter().any(|t| t == text) {
            texts.push(text.to_string());
        }
    }

    /// Remove a text from a locale; the locale itself is kept.
    pub fn remove_text(&mut self, locale: &str, text: &str) -> bool {
        match self.texts.try_get_mut(locale) {
            Some(texts) => {
                let before = texts.len();
                texts.retain(|t| t != text);
                before != texts.len()
            }
            None => false,
        }
    }
}

/// Dictionary entity matched approximately against utterances.
#[derive(Debug, Clone, Default)]
pub struct EnumEntity {
    options: Vec<EnumOption>,
    locale_fallbacks: HashMap<String, String>,
}

impl EnumEntity {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options in registration order.
    pub fn options(&self) -> &[EnumOption] {
        &self.options
    }

    /// Look up an option by name.
    pub fn option(&self, name: &str) -> Option<&EnumOption> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Get an option by name, creating it if absent.
    pub fn ensure_option(&mut self, name: &str) -> &mut EnumOption {
        let pos = match self.options.iter().position(|o| o.name == name) {
            Some(pos) => pos,
            None => {
                self.options.push(EnumOption::new(name));
                self.options.len() - 1
            }
        };
        &mut self.options[pos]
    }

    /// Add texts for an option in each of the given locales.
    pub fn add_texts<L, T>(&mut self, option: &str, locales: &[L], texts: &[T])
    where
        L: AsRef<str>,
        T: AsRef<str>,
    {
        let option = self.ensure_option(option);
        for locale in locales {
            for text in texts {
                option.add_text(locale.as_ref(), text.as_ref());
            }
        }
    }

    /// Remove texts of an option in each of the given locales.
    ///
    /// Unknown options and locales are ignored.
    pub fn remove_texts<L, T>(&mut self, option: &str, locales: &[L], texts: &[T])
    where
        L: AsRef<str>,
        T: AsRef<str>,
    {
        let Some(option) = self.options.iter_mut().find(|o| o.name == option) else {
            return;
        };
        for locale in locales {
            for text in texts {
                option.remove_text(locale.as_ref(), text.as_ref());
            }
        }
    }

    /// Remove a whole option.
    pub fn remove_option(&mut self, name: &str) -> Option<EnumOption> {
        let pos = self.options.iter().position(|o| o.name == name)?;
        Some(self.options.remove(pos))
    }

    /// Explicit locale fallbacks consulted before the first registered locale.
    pub fn locale_fallbacks(&self) -> &HashMap<String, String> {
        &self.locale_fallbacks
    }

    /// Resolve `locale` to `fallback` when `locale` has no texts.
    pub fn set_locale_fallback(&mut self, locale: impl Into<String>, fallback: impl Into<String>) {
        self.locale_fallbacks.insert(locale.into(), fallback.into());
    }

    /// Extract the occurrences of this entity from an utterance.
    ///
    /// Only options named in `option_whitelist` are considered when it is
    /// given; candidates below `threshold` are dropped. Every edge carries
    /// `entity_name`.
    pub fn extract(
        &self,
        entity_name: &str,
        utterance: &str,
        locale: &str,
        matcher: &SimilarityMatcher,
        option_whitelist: Option<&[&str]>,
        threshold: f64,
    ) -> Vec<Edge> {
        if utterance.is_empty() {
            return Vec::new();
        }
        let prepared = matcher.prepare(utterance);
        matcher.entity_edges(
            &prepared,
            entity_name,
            self,
            locale,
            threshold,
            option_whitelist,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heroes() -> EnumEntity {
        let mut entity = EnumEntity::new();
        entity.add_texts("spiderman", &["en"], &["Spiderman", "Spider-man"]);
        entity.add_texts("iron man", &["en"], &["iron man", "iron-man"]);
        entity.add_texts("thor", &["en"], &["Thor"]);
        entity.add_texts("spiderman", &["es"], &["Hombre araña"]);
        entity
    }

    #[test]
    fn test_add_text_is_idempotent() {
        let mut entity = EnumEntity::new();
        entity.add_texts("food", &["en"], &["pizza", "pizza", "burger"]);
        entity.add_texts("food", &["en"], &["pizza"]);
        assert_eq!(
            entity.option("food").unwrap().texts("en").unwrap(),
            &["pizza".to_string(), "burger".to_string()]
        );
    }

    #[test]
    fn test_remove_text_keeps_locale() {
        let mut entity = EnumEntity::new();
        entity.add_texts("food", &["en"], &["pizza"]);
        entity.remove_texts("food", &["en"], &["pizza"]);
        entity.remove_texts("drink", &["en"], &["water"]);
        let option = entity.option("food").unwrap();
        assert_eq!(option.texts("en"), Some(&[][..]));
    }

    #[test]
    fn test_extract_misspelled_option() {
        let entity = heroes();
        let matcher = SimilarityMatcher::normalized();
        let edges = entity.extract("hero", "I saw spederman in the city", "en", &matcher, None, 0.8);

        assert_eq!(edges.len(), 1);
        let edge = &edges[0];
        assert_eq!((edge.start, edge.end, edge.len), (6, 15, 9));
        assert_eq!(edge.levenshtein, Some(1));
        assert_eq!(edge.option.as_deref(), Some("spiderman"));
        assert_eq!(edge.source_text, "Spiderman");
        assert_eq!(edge.utterance_text, "spederman");
        assert_eq!(edge.entity, "hero");
    }

    #[test]
    fn test_extract_multiple_options() {
        let entity = heroes();
        let matcher = SimilarityMatcher::normalized();
        let edges = entity.extract("hero", "thor and iron man fight", "en", &matcher, None, 0.8);
        let options: Vec<&str> = edges.iter().filter_map(|e| e.option.as_deref()).collect();
        assert_eq!(options, vec!["thor", "iron man"]);
    }

    #[test]
    fn test_extract_with_option_whitelist() {
        let entity = heroes();
        let matcher = SimilarityMatcher::normalized();
        let edges = entity.extract(
            "hero",
            "thor and iron man fight",
            "en",
            &matcher,
            Some(&["thor"]),
            0.8,
        );
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].option.as_deref(), Some("thor"));
    }

    #[test]
    fn test_locale_fallback_to_first_registered() {
        let entity = heroes();
        let matcher = SimilarityMatcher::normalized();
        let edges = entity.extract("hero", "ich mag thor", "de", &matcher, None, 0.8);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].source_text, "Thor");
    }

    #[test]
    fn test_explicit_locale_fallback() {
        let mut entity = heroes();
        entity.set_locale_fallback("es-MX", "es");
        let matcher = SimilarityMatcher::normalized();
        let edges = entity.extract("hero", "vi al hombre arana", "es-MX", &matcher, None, 0.8);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].source_text, "Hombre araña");
    }

    #[test]
    fn test_empty_utterance() {
        let entity = heroes();
        let matcher = SimilarityMatcher::normalized();
        assert!(entity.extract("hero", "", "en", &matcher, None, 0.8).is_empty());
    }
}
