//! Registry of entity definitions and the extraction entry points.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

use super::definition::{EntityDefinition, EntityKind};
use super::enum_entity::EnumEntity;
use super::pipeline::{EdgeContext, EdgePipeline};
use super::similarity::{ComparisonMode, SimilarityMatcher};
use super::text::TextIndex;
use super::trim::{TrimCondition, TrimOptions};
use super::types::{Edge, EntityKindTag, TrimType};
use super::whitelist::{SlotName, Whitelist};
use crate::config::MatchingConfig;
use crate::{NerError, Result};

lazy_static! {
    static ref TEMPLATE_PLACEHOLDER: Regex = Regex::new(r"%([\p{Alphabetic}\p{Nd}_]+)%").unwrap();
}

/// Registry of named entity definitions.
///
/// Definitions are kept in registration order, which decides ties when
/// dictionary matches of different entities overlap. Extraction only reads
/// the registry; the manager holds no locks, so it is `Send + Sync` and can
/// be cloned into a snapshot or wrapped in a `RwLock` by the caller.
#[derive(Debug, Clone)]
pub struct EntityManager {
    definitions: Vec<EntityDefinition>,
    matcher: SimilarityMatcher,
    threshold: f64,
    pipeline: EdgePipeline,
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityManager {
    /// Create a manager with the default matching settings.
    pub fn new() -> Self {
        Self::with_config(&MatchingConfig::default())
    }

    /// Create a manager from matching settings.
    pub fn with_config(config: &MatchingConfig) -> Self {
        let mode = if config.use_collator {
            ComparisonMode::Collator
        } else if config.normalize {
            ComparisonMode::Normalized
        } else {
            ComparisonMode::Exact
        };
        Self {
            definitions: Vec::new(),
            matcher: SimilarityMatcher::with_mode(mode),
            threshold: config.threshold,
            pipeline: EdgePipeline::reconciliation(),
        }
    }

    /// Replace the reconciliation pipeline.
    pub fn with_pipeline(mut self, pipeline: EdgePipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Minimum accuracy for dictionary matches.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Set the minimum accuracy for dictionary matches.
    pub fn set_threshold(&mut self, threshold: f64) -> Result<()> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(NerError::Configuration(format!(
                "Threshold must be between 0 and 1, got {}",
                threshold
            )));
        }
        self.threshold = threshold;
        Ok(())
    }

    /// The similarity matcher used for dictionary entities.
    pub fn matcher(&self) -> &SimilarityMatcher {
        &self.matcher
    }

    /// Register an entity, or return the existing one with the same kind.
    pub fn add_entity(&mut self, name: &str, kind: EntityKindTag) -> Result<&mut EntityDefinition> {
        validate_entity_name(name)?;
        let pos = match self.position(name) {
            Some(pos) => {
                let existing = self.definitions[pos].tag();
                if existing != kind {
                    return Err(NerError::KindMismatch {
                        entity: name.to_string(),
                        expected: kind.to_string(),
                        actual: existing.to_string(),
                    });
                }
                pos
            }
            None => {
                debug!("Registering {} entity: {}", kind, name);
                self.definitions.push(EntityDefinition::new(name, kind));
                self.definitions.len() - 1
            }
        };
        Ok(&mut self.definitions[pos])
    }

    /// Look up a definition by name.
    pub fn entity(&self, name: &str) -> Option<&EntityDefinition> {
        self.definitions.iter().find(|d| d.name() == name)
    }

    /// Look up a definition by name for modification.
    pub fn entity_mut(&mut self, name: &str) -> Option<&mut EntityDefinition> {
        self.definitions.iter_mut().find(|d| d.name() == name)
    }

    /// Remove a definition.
    pub fn remove_entity(&mut self, name: &str) -> Option<EntityDefinition> {
        let pos = self.position(name)?;
        debug!("Removing entity: {}", name);
        Some(self.definitions.remove(pos))
    }

    /// Registered names, in registration order.
    pub fn entity_names(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name()).collect()
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if no definition is registered.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Add texts to an option of a dictionary entity, registering both if needed.
    pub fn add_option_text<L, T>(
        &mut self,
        entity: &str,
        option: &str,
        locales: &[L],
        texts: &[T],
    ) -> Result<()>
    where
        L: AsRef<str>,
        T: AsRef<str>,
    {
        let dictionary = self.enum_payload(entity)?;
        dictionary.add_texts(option, locales, texts);
        Ok(())
    }

    /// Remove texts from an option. Unknown entities, options and locales are ignored.
    pub fn remove_option_text<L, T>(&mut self, entity: &str, option: &str, locales: &[L], texts: &[T])
    where
        L: AsRef<str>,
        T: AsRef<str>,
    {
        if let Some(EntityKind::Enum(dictionary)) = self.entity_mut(entity).map(|d| d.kind_mut()) {
            dictionary.remove_texts(option, locales, texts);
        }
    }

    /// Remove a whole option from a dictionary entity.
    pub fn remove_option(&mut self, entity: &str, option: &str) -> bool {
        match self.entity_mut(entity).map(|d| d.kind_mut()) {
            Some(EntityKind::Enum(dictionary)) => dictionary.remove_option(option).is_some(),
            _ => false,
        }
    }

    /// Set the pattern of a regex entity for the given locales.
    pub fn add_regex<L: AsRef<str>>(&mut self, entity: &str, locales: &[L], pattern: &str) -> Result<()> {
        match self.add_entity(entity, EntityKindTag::Regex)?.kind_mut() {
            EntityKind::Regex(payload) => payload.add_regex(locales, pattern),
            other => Err(kind_mismatch(entity, EntityKindTag::Regex, other.tag())),
        }
    }

    /// Set an already compiled pattern of a regex entity for the given locales.
    pub fn add_compiled_regex<L: AsRef<str>>(
        &mut self,
        entity: &str,
        locales: &[L],
        regex: Regex,
    ) -> Result<()> {
        match self.add_entity(entity, EntityKindTag::Regex)?.kind_mut() {
            EntityKind::Regex(payload) => {
                payload.add_compiled(locales, regex);
                Ok(())
            }
            other => Err(kind_mismatch(entity, EntityKindTag::Regex, other.tag())),
        }
    }

    /// Append a built condition to a trim entity for the given locales.
    pub fn add_condition<L: AsRef<str>>(
        &mut self,
        entity: &str,
        locales: &[L],
        condition: TrimCondition,
    ) -> Result<()> {
        match self.add_entity(entity, EntityKindTag::Trim)?.kind_mut() {
            EntityKind::Trim(payload) => {
                payload.add_condition(locales, condition);
                Ok(())
            }
            other => Err(kind_mismatch(entity, EntityKindTag::Trim, other.tag())),
        }
    }

    /// Append a `between` condition to a trim entity.
    pub fn add_between_condition<L, W, R>(
        &mut self,
        entity: &str,
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
        self.add_condition(entity, locales, condition)
    }

    /// Append a position condition (`before*` / `after*`) to a trim entity.
    pub fn add_position_condition<L, W>(
        &mut self,
        entity: &str,
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
        self.add_condition(entity, locales, condition)
    }

    /// Resolve `locale` to `fallback` for one entity. Returns false when the
    /// entity is not registered.
    pub fn set_locale_fallback(&mut self, entity: &str, locale: &str, fallback: &str) -> bool {
        match self.entity_mut(entity) {
            Some(definition) => {
                definition.set_locale_fallback(locale, fallback);
                true
            }
            None => false,
        }
    }

    /// Placeholder names in a template utterance (`%hero%`, `%hero_2%`) whose
    /// base name is a registered entity, in order of appearance.
    pub fn entities_in_template(&self, utterance: &str) -> Vec<String> {
        TEMPLATE_PLACEHOLDER
            .captures_iter(utterance)
            .filter_map(|caps| caps.get(1))
            .map(|token| token.as_str())
            .filter(|token| {
                self.position(token).is_some()
                    || self.position(&SlotName::parse(token).base).is_some()
            })
            .map(str::to_string)
            .collect()
    }

    /// Extract every registered entity, with bare entity names.
    pub fn find_entities(&self, text: &str, locale: &str) -> Vec<Edge> {
        self.extract(text, locale, None, Vec::new())
    }

    /// Extract the entities named by `whitelist` and number repeated
    /// occurrences onto its slots.
    pub fn find_entities_with_whitelist(
        &self,
        text: &str,
        locale: &str,
        whitelist: &Whitelist,
    ) -> Vec<Edge> {
        self.extract(text, locale, Some(whitelist), Vec::new())
    }

    /// Like the other `find_entities*` operations, with caller-supplied edges
    /// (dates, numbers, ...) sorted and reconciled alongside.
    pub fn find_entities_with_builtins(
        &self,
        text: &str,
        locale: &str,
        whitelist: Option<&Whitelist>,
        builtins: Vec<Edge>,
    ) -> Vec<Edge> {
        self.extract(text, locale, whitelist, builtins)
    }

    /// Replace every matched span with `%<entity>%`.
    ///
    /// Spans are replaced from the right; an edge overlapping a span already
    /// replaced is left alone.
    pub fn placeholderize(&self, text: &str, locale: &str) -> String {
        let edges = self.find_entities(text, locale);
        if edges.is_empty() {
            return text.to_string();
        }

        let index = TextIndex::new(text);
        let mut result = text.to_string();
        let mut boundary = index.len();
        for edge in edges.iter().rev() {
            if edge.end > boundary || edge.is_empty() {
                continue;
            }
            let range = index.byte_offset(edge.start)..index.byte_offset(edge.end);
            result.replace_range(range, &format!("%{}%", edge.entity));
            boundary = edge.start;
        }
        result
    }

    fn extract(
        &self,
        text: &str,
        locale: &str,
        whitelist: Option<&Whitelist>,
        builtins: Vec<Edge>,
    ) -> Vec<Edge> {
        if text.is_empty() {
            return Vec::new();
        }

        let active: Vec<&EntityDefinition> = self
            .definitions
            .iter()
            .filter(|d| whitelist.is_none_or(|w| w.contains_base(d.name())))
            .collect();

        let dictionaries: Vec<(&str, &EnumEntity)> = active
            .iter()
            .filter_map(|d| d.as_enum().map(|e| (d.name(), e)))
            .collect();
        let mut edges =
            self.matcher
                .best_entity_matches(text, &dictionaries, locale, self.threshold);
        trace!(edges = edges.len(), "Dictionary entities matched");

        for definition in &active {
            let found = definition.extract_exact(text, locale);
            if !found.is_empty() {
                trace!(entity = definition.name(), edges = found.len(), "Entity matched");
            }
            edges.extend(found);
        }

        let len = text.chars().count();
        edges.extend(
            builtins
                .into_iter()
                .filter(|e| e.start <= e.end && e.end <= len),
        );

        edges.sort_by_key(|e| e.start);
        let context = EdgeContext::new(text, locale);
        let mut edges = self.pipeline.run(edges, &context);
        edges.sort_by_key(|e| e.start);

        if let Some(whitelist) = whitelist {
            assign_slots(&mut edges, whitelist);
        }

        for edge in &edges {
            trace!("Extracted {}", edge.format());
        }
        debug!(
            "Found {} entities in {} chars (locale: {})",
            edges.len(),
            len,
            locale
        );
        edges
    }

    fn enum_payload(&mut self, entity: &str) -> Result<&mut EnumEntity> {
        match self.add_entity(entity, EntityKindTag::Enum)?.kind_mut() {
            EntityKind::Enum(payload) => Ok(payload),
            other => Err(kind_mismatch(entity, EntityKindTag::Enum, other.tag())),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.definitions.iter().position(|d| d.name() == name)
    }
}

/// Give the edges of each whitelisted base the base's slots in document
/// order; edges beyond the available slots keep the bare base name.
fn assign_slots(edges: &mut [Edge], whitelist: &Whitelist) {
    let bases: Vec<String> = edges.iter().map(|e| e.entity.clone()).collect();
    for base in whitelist.bases() {
        let mut slots = whitelist.slots_for(base);
        for (edge, _) in edges
            .iter_mut()
            .zip(&bases)
            .filter(|(_, name)| name.as_str() == base)
        {
            match slots.next() {
                Some(slot) => edge.entity = slot.to_string(),
                None => break,
            }
        }
    }
}

fn validate_entity_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.contains('%') {
        return Err(NerError::InvalidEntityName(name.to_string()));
    }
    Ok(())
}

fn kind_mismatch(entity: &str, expected: EntityKindTag, actual: EntityKindTag) -> NerError {
    NerError::KindMismatch {
        entity: entity.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}
