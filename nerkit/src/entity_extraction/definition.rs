//! Registered entity definitions: a name plus one kind-specific payload.

use super::enum_entity::EnumEntity;
use super::regex_entity::RegexEntity;
use super::similarity::SimilarityMatcher;
use super::trim::TrimEntity;
use super::types::{Edge, EntityKindTag};

/// Kind-specific payload of a definition.
#[derive(Debug, Clone)]
pub enum EntityKind {
    /// Dictionary of options matched approximately
    Enum(EnumEntity),
    /// Per-locale regular expression
    Regex(RegexEntity),
    /// Per-locale positional conditions
    Trim(TrimEntity),
}

impl EntityKind {
    /// Empty payload of the given kind.
    pub fn empty(tag: EntityKindTag) -> Self {
        match tag {
            EntityKindTag::Enum => EntityKind::Enum(EnumEntity::new()),
            EntityKindTag::Regex => EntityKind::Regex(RegexEntity::new()),
            EntityKindTag::Trim => EntityKind::Trim(TrimEntity::new()),
        }
    }

    /// Kind tag of the payload.
    pub fn tag(&self) -> EntityKindTag {
        match self {
            EntityKind::Enum(_) => EntityKindTag::Enum,
            EntityKind::Regex(_) => EntityKindTag::Regex,
            EntityKind::Trim(_) => EntityKindTag::Trim,
        }
    }
}

/// A named entity registered in the manager.
#[derive(Debug, Clone)]
pub struct EntityDefinition {
    name: String,
    kind: EntityKind,
}

impl EntityDefinition {
    /// Create a definition with an empty payload.
    pub fn new(name: impl Into<String>, tag: EntityKindTag) -> Self {
        Self {
            name: name.into(),
            kind: EntityKind::empty(tag),
        }
    }

    /// Registry key of the definition.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind-specific payload.
    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Mutable kind-specific payload.
    pub fn kind_mut(&mut self) -> &mut EntityKind {
        &mut self.kind
    }

    /// Kind tag of the definition.
    pub fn tag(&self) -> EntityKindTag {
        self.kind.tag()
    }

    /// Dictionary payload, if this is an enum entity.
    pub fn as_enum(&self) -> Option<&EnumEntity> {
        match &self.kind {
            EntityKind::Enum(entity) => Some(entity),
            _ => None,
        }
    }

    /// Regex payload, if this is a regex entity.
    pub fn as_regex(&self) -> Option<&RegexEntity> {
        match &self.kind {
            EntityKind::Regex(entity) => Some(entity),
            _ => None,
        }
    }

    /// Trim payload, if this is a trim entity.
    pub fn as_trim(&self) -> Option<&TrimEntity> {
        match &self.kind {
            EntityKind::Trim(entity) => Some(entity),
            _ => None,
        }
    }

    /// Resolve `locale` to `fallback` when the payload has no data for it.
    pub fn set_locale_fallback(&mut self, locale: &str, fallback: &str) {
        match &mut self.kind {
            EntityKind::Enum(entity) => entity.set_locale_fallback(locale, fallback),
            EntityKind::Regex(entity) => entity.set_locale_fallback(locale, fallback),
            EntityKind::Trim(entity) => entity.set_locale_fallback(locale, fallback),
        }
    }

    /// Extract edges for a non-dictionary definition.
    ///
    /// Dictionary definitions are scanned together by the manager so their
    /// matches can be reconciled across definitions; they yield nothing here.
    pub fn extract_exact(&self, utterance: &str, locale: &str) -> Vec<Edge> {
        match &self.kind {
            EntityKind::Enum(_) => Vec::new(),
            EntityKind::Regex(entity) => entity.extract(&self.name, utterance, locale),
            EntityKind::Trim(entity) => entity.extract(&self.name, utterance, locale),
        }
    }

    /// Extract edges of this definition alone.
    pub fn extract(
        &self,
        utterance: &str,
        locale: &str,
        matcher: &SimilarityMatcher,
        threshold: f64,
    ) -> Vec<Edge> {
        match &self.kind {
            EntityKind::Enum(entity) => {
                entity.extract(&self.name, utterance, locale, matcher, None, threshold)
            }
            _ => self.extract_exact(utterance, locale),
        }
    }
}
