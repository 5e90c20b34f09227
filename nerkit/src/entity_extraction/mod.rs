//! Entity extraction for utterances.
//!
//! Entities come in three kinds: enum dictionaries matched approximately,
//! per-locale regular expressions, and trim conditions that cut spans out
//! relative to anchor words. The [`EntityManager`] owns the registry, runs the
//! matchers, reconciles overlapping edges through an [`EdgePipeline`] and
//! numbers repeated entities onto whitelist slots.

pub mod definition;
pub mod enum_entity;
pub mod locale;
pub mod manager;
pub mod pipeline;
pub mod post_processors;
pub mod regex_entity;
pub mod similarity;
pub mod text;
pub mod trim;
pub mod types;
pub mod whitelist;

pub use definition::{EntityDefinition, EntityKind};
pub use enum_entity::{EnumEntity, EnumOption};
pub use locale::LocaleMap;
pub use manager::EntityManager;
pub use pipeline::{EdgeContext, EdgePipeline, EdgePostProcessor, PipelineBuilder};
pub use post_processors::{OverlapReducer, TrimEdgeSplitter};
pub use regex_entity::{RegexEntity, compile_source};
pub use similarity::{
    ComparisonMode, PreparedText, SimilarityMatcher, SubstringMatch, WordSpan, levenshtein,
};
pub use text::TextIndex;
pub use trim::{AnchorMatch, TrimCondition, TrimEntity, TrimOptions};
pub use types::{Edge, EdgeType, EntityKindTag, TrimType};
pub use whitelist::{SlotName, Whitelist};
