//! Configuration system for nerkit.
//!
//! Configuration can be assembled in code with [`ConfigBuilder`] or loaded
//! from files and environment variables with [`ConfigLoader`]. Both validate
//! the result before handing it out.

mod builder;
mod loader;
mod models;
#[cfg(test)]
mod tests;
mod validation;

pub use builder::ConfigBuilder;
pub use loader::ConfigLoader;
pub use models::*;
pub use validation::validate_config;

/// Default configuration file names that the system will look for
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "nerkit.toml",
    "nerkit.yaml",
    "nerkit.yml",
    "nerkit.json",
    ".nerkit/config.toml",
    ".nerkit/config.yaml",
    ".nerkit/config.yml",
    ".nerkit/config.json",
];

/// Environment variable prefix for nerkit configuration
pub const ENV_PREFIX: &str = "NERKIT_";

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error occurred during file loading
    #[error("Failed to load configuration file: {0}")]
    FileLoadError(String),

    /// Error occurred during validation
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// Error occurred during parsing
    #[error("Configuration parsing error: {0}")]
    ParseError(String),

    /// General error
    #[error("{0}")]
    Other(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
