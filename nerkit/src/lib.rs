//! # nerkit
//!
//! Named-entity extraction for intent-classification pipelines. Three kinds of
//! entity definitions are supported:
//!
//! - **Enum**: dictionaries of options with per-locale texts, matched
//!   approximately with Levenshtein distance so misspellings still match
//! - **Regex**: one pattern per locale, matched exhaustively
//! - **Trim**: spans located relative to anchor words (`between`, `before`,
//!   `after`, ...)
//!
//! The [`EntityManager`](entity_extraction::EntityManager) registers the
//! definitions, runs every matcher over an utterance, reconciles overlapping
//! matches and numbers repeated occurrences onto caller-supplied slot names.
//!
//! ## Quick Start
//!
//! ```rust
//! use nerkit::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut manager = EntityManager::new();
//!     manager.add_option_text("hero", "spiderman", &["en"], &["Spiderman", "Spider-man"])?;
//!     manager.add_regex("email", &["en"], r"/\S+@\S+\.\w+/g")?;
//!     manager.add_between_condition("city", &["en"], &["from"], &["to"], TrimOptions::new())?;
//!
//!     let edges = manager.find_entities("I saw spederman in the city", "en");
//!     assert_eq!(edges[0].option.as_deref(), Some("spiderman"));
//!
//!     let template = manager.placeholderize("I saw spiderman", "en");
//!     assert_eq!(template, "I saw %hero%");
//!     Ok(())
//! }
//! ```
//!
//! Extraction is synchronous and never performs I/O. Configuration can be
//! loaded from files and the environment through [`config::ConfigLoader`].

pub mod config;
pub mod entity_extraction;
pub mod logging;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    // Re-export core initialization functions
    pub use crate::{init, init_with_defaults};

    // Re-export config types
    pub use crate::config::{ConfigBuilder, LogFormat, LogLevel, MatchingConfig, NerConfig};

    // Re-export entity extraction types
    pub use crate::entity_extraction::{
        ComparisonMode, Edge, EdgeType, EntityDefinition, EntityKind, EntityKindTag,
        EntityManager, SimilarityMatcher, SlotName, TrimCondition, TrimOptions, TrimType,
        Whitelist,
    };

    // Re-export essential result type
    pub use crate::{NerError, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for entity registration and configuration
#[derive(Debug, thiserror::Error)]
pub enum NerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LogError),

    /// Entity names must be non-blank and free of `%`
    #[error("Invalid entity name '{0}'. Names must be non-empty and cannot contain '%'")]
    InvalidEntityName(String),

    /// The entity is registered with another kind
    #[error("Entity '{entity}' is registered as {actual}, not {expected}")]
    KindMismatch {
        entity: String,
        expected: String,
        actual: String,
    },

    /// A regular expression could not be compiled
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A trim condition is malformed
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    /// Other unclassified errors
    #[error("{0}")]
    Other(String),
}

impl From<crate::config::ConfigError> for NerError {
    fn from(err: crate::config::ConfigError) -> Self {
        NerError::Configuration(err.to_string())
    }
}

/// Result type for nerkit operations
pub type Result<T> = std::result::Result<T, NerError>;

/// Initialize with the default configuration
///
/// Sets up logging and returns an empty
/// [`EntityManager`](entity_extraction::EntityManager) using the default
/// matching settings.
///
/// # Examples
///
/// ```rust
/// use nerkit::prelude::*;
///
/// fn example() -> Result<()> {
///     let mut manager = init_with_defaults()?;
///     manager.add_option_text("food", "pizza", &["en"], &["pizza"])?;
///     Ok(())
/// }
/// ```
pub fn init_with_defaults() -> Result<entity_extraction::EntityManager> {
    let config = config::ConfigBuilder::defaults().build()?;
    init(config)
}

/// Initialize with the provided configuration
///
/// # Arguments
/// * `config` - Logging and matching settings
///
/// # Examples
///
/// ```rust
/// use nerkit::prelude::*;
///
/// fn example() -> Result<()> {
///     let config = ConfigBuilder::new()
///         .with_threshold(0.9)
///         .with_log_level(LogLevel::Debug)
///         .build()?;
///
///     let manager = init(config)?;
///     assert_eq!(manager.threshold(), 0.9);
///     Ok(())
/// }
/// ```
pub fn init(config: config::NerConfig) -> Result<entity_extraction::EntityManager> {
    // Ignore errors if tracing is already initialized
    let _ = logging::init(&config.logging);

    Ok(entity_extraction::EntityManager::with_config(&config.matching))
}
