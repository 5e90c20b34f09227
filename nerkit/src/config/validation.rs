//! Configuration validation utilities.

use super::ConfigError;
use super::models::*;

/// Validate the entire configuration.
pub fn validate_config(config: &NerConfig) -> Result<(), ConfigError> {
    validate_matching_config(&config.matching)?;
    validate_logging_config(&config.logging)?;

    Ok(())
}

/// Validate matching configuration.
fn validate_matching_config(config: &MatchingConfig) -> Result<(), ConfigError> {
    if !config.threshold.is_finite() || !(0.0..=1.0).contains(&config.threshold) {
        return Err(ConfigError::ValidationError(format!(
            "Matching threshold must be between 0 and 1, got {}",
            config.threshold
        )));
    }

    if config.use_collator && !config.normalize {
        tracing::warn!("use_collator is set; normalize = false has no effect");
    }

    Ok(())
}

/// Validate logging configuration.
fn validate_logging_config(config: &LoggingConfig) -> Result<(), ConfigError> {
    if let Some(file) = &config.file
        && file.as_os_str().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "Log file path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
