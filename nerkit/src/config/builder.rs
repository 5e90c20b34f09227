//! Configuration builder.
//!
//! This module provides a builder pattern API for creating configurations.

use super::{Result, models::*, validation};
use std::path::Path;

/// Builder for creating NerConfig instances.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: NerConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: NerConfig::default(),
        }
    }

    /// Set the minimum accuracy for fuzzy dictionary matches.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.config.matching.threshold = threshold;
        self
    }

    /// Ignore (or respect) diacritics and case when matching.
    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.config.matching.normalize = normalize;
        self
    }

    /// Compare characters by base letter.
    pub fn with_collator(mut self, use_collator: bool) -> Self {
        self.config.matching.use_collator = use_collator;
        self
    }

    /// Replace the whole matching configuration.
    pub fn with_matching_config(mut self, matching: MatchingConfig) -> Self {
        self.config.matching = matching;
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set the log format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Configure logging to a file.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enable or disable logging to stdout.
    pub fn with_stdout(mut self, stdout: bool) -> Self {
        self.config.logging.stdout = stdout;
        self
    }

    /// Use default logging configuration (JSON to the console at Info level)
    pub fn with_default_logging(mut self) -> Self {
        self.config.logging.level = LogLevel::Info;
        self.config.logging.format = LogFormat::Json;
        self.config.logging.file = None;
        self.config.logging.stdout = true;
        self
    }

    /// Create a configuration for development: pretty debug logs.
    pub fn development() -> Self {
        Self::new()
            .with_log_level(LogLevel::Debug)
            .with_log_format(LogFormat::Pretty)
    }

    /// Create a configuration for testing: compact warnings only.
    pub fn testing() -> Self {
        Self::new()
            .with_log_level(LogLevel::Warn)
            .with_log_format(LogFormat::Compact)
    }

    /// Create a production configuration: structured JSON logs.
    pub fn production() -> Self {
        Self::new().with_default_logging()
    }

    /// Create a fully default configuration suitable for most uses
    pub fn defaults() -> Self {
        Self::production()
    }

    /// Build the configuration, validating it in the process.
    pub fn build(self) -> Result<NerConfig> {
        validation::validate_config(&self.config)?;

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
