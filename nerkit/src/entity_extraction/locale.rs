//! Per-locale storage with explicit creation and deterministic fallback.

use std::collections::HashMap;

/// Ordered map from locale to per-locale data.
///
/// Locales keep their registration order, which is what the fallback uses
/// when neither the requested locale nor a configured fallback exists. Reads
/// never create entries; `ensure` is the only way to add a locale.
#[derive(Debug, Clone)]
pub struct LocaleMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> LocaleMap<T> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Get the data for `locale`, creating it with `T::default()` if absent.
    pub fn ensure(&mut self, locale: &str) -> &mut T
    where
        T: Default,
    {
        let pos = match self.position(locale) {
            Some(pos) => pos,
            None => {
                self.entries.push((locale.to_string(), T::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos].1
    }

    /// Get the data for exactly `locale`.
    pub fn try_get(&self, locale: &str) -> Option<&T> {
        self.position(locale).map(|pos| &self.entries[pos].1)
    }

    /// Get mutable data for exactly `locale`.
    pub fn try_get_mut(&mut self, locale: &str) -> Option<&mut T> {
        self.position(locale).map(move |pos| &mut self.entries[pos].1)
    }

    /// Resolve `locale`: exact match, then the configured fallback for it,
    /// then the first registered locale.
    pub fn resolve(&self, locale: &str, fallbacks: &HashMap<String, String>) -> Option<&T> {
        self.try_get(locale)
            .or_else(|| {
                fallbacks
                    .get(locale)
                    .and_then(|fallback| self.try_get(fallback))
            })
            .or_else(|| self.entries.first().map(|(_, value)| value))
    }

    /// Remove `locale` and return its data.
    pub fn remove(&mut self, locale: &str) -> Option<T> {
        self.position(locale).map(|pos| self.entries.remove(pos).1)
    }

    /// Registered locales, in registration order.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(locale, _)| locale.as_str())
    }

    /// Number of registered locales.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no locale has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, locale: &str) -> Option<usize> {
        self.entries.iter().position(|(l, _)| l == locale)
    }
}

impl<T> Default for LocaleMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_do_not_create() {
        let map: LocaleMap<Vec<String>> = LocaleMap::new();
        assert!(map.try_get("en").is_none());
        assert!(map.resolve("en", &HashMap::new()).is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn test_ensure_persists_empty_locale() {
        let mut map: LocaleMap<Vec<String>> = LocaleMap::new();
        map.ensure("es");
        assert_eq!(map.len(), 1);
        assert_eq!(map.try_get("es"), Some(&Vec::new()));
    }

    #[test]
    fn test_resolution_order() {
        let mut map: LocaleMap<u32> = LocaleMap::new();
        *map.ensure("fr") = 1;
        *map.ensure("pt") = 2;
        *map.ensure("en") = 3;

        let mut fallbacks = HashMap::new();
        fallbacks.insert("pt-BR".to_string(), "pt".to_string());

        assert_eq!(map.resolve("en", &fallbacks), Some(&3));
        assert_eq!(map.resolve("pt-BR", &fallbacks), Some(&2));
        // Unknown locale falls back to the first registered one
        assert_eq!(map.resolve("de", &fallbacks), Some(&1));
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut map: LocaleMap<u32> = LocaleMap::new();
        map.ensure("a");
        map.ensure("b");
        map.ensure("c");
        assert_eq!(map.remove("a"), Some(0));
        assert_eq!(map.locales().collect::<Vec<_>>(), vec!["b", "c"]);
    }
}
