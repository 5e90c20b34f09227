//! Structured logging for nerkit.
//!
//! The library itself only emits `tracing` events. This module installs a
//! global `tracing-subscriber` for applications that want nerkit to set up
//! logging from its configuration.

#[cfg(test)]
mod tests;

use crate::config::{LogFormat, LogLevel, LoggingConfig};
use std::path::Path;
use std::sync::OnceLock;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

// Keeps the file writer flushing for the lifetime of the process
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Error type for logging operations
#[derive(Debug)]
pub enum LogError {
    /// IO error occurred
    IoError(std::io::Error),

    /// Error parsing log level
    InvalidLogLevel(String),

    /// Error in subscriber setup
    SubscriberError(Box<dyn std::error::Error + Send + Sync>),

    /// General error
    Other(String),
}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::IoError(err)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for LogError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        LogError::SubscriberError(err)
    }
}

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Finish configuring a fmt builder and install it as the global default,
/// writing to stdout, the log file, or both.
macro_rules! try_install {
    ($builder:expr, $stdout:expr, $file:expr) => {
        match ($stdout, $file) {
            (true, Some(file)) => $builder
                .with_level(true)
                .with_target(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_writer(std::io::stdout.and(file))
                .try_init()
                .map_err(LogError::from),
            (false, Some(file)) => $builder
                .with_level(true)
                .with_target(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_writer(file)
                .try_init()
                .map_err(LogError::from),
            (_, None) => $builder
                .with_level(true)
                .with_target(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_writer(std::io::stdout)
                .try_init()
                .map_err(LogError::from),
        }
    };
}

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` overrides the configured level when set. Calling this when a
/// global subscriber already exists is not an error.
pub fn init(config: &LoggingConfig) -> Result<()> {
    if !config.stdout && config.file.is_none() {
        return Ok(());
    }

    let level = log_level_to_level(&config.level);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let file_writer = match &config.file {
        Some(path) => Some(create_non_blocking_file(path)?),
        None => None,
    };

    let stdout = config.stdout;
    let result = match config.format {
        LogFormat::Json => try_install!(
            tracing_subscriber::fmt().json().with_env_filter(filter),
            stdout,
            file_writer
        ),
        LogFormat::Compact => try_install!(
            tracing_subscriber::fmt().compact().with_env_filter(filter),
            stdout,
            file_writer
        ),
        LogFormat::Pretty => try_install!(
            tracing_subscriber::fmt().pretty().with_env_filter(filter),
            stdout,
            file_writer
        ),
    };

    // If a global subscriber is already set, keep it
    if let Err(LogError::SubscriberError(ref e)) = result
        && e.to_string().contains("already")
    {
        return Ok(());
    }

    result
}

/// Create a non-blocking file writer.
fn create_non_blocking_file(path: impl AsRef<Path>) -> Result<NonBlocking> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .ok_or_else(|| LogError::Other(format!("Not a log file path: {}", path.display())))?;

    // Ensure the directory exists
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if !parent.exists() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(parent, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // A second init keeps the first writer
    let _ = FILE_GUARD.set(guard);

    Ok(non_blocking)
}

/// Parse a log level string into a LogLevel enum.
pub fn parse_log_level(level: &str) -> Result<LogLevel> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(LogLevel::Trace),
        "debug" => Ok(LogLevel::Debug),
        "info" => Ok(LogLevel::Info),
        "warn" => Ok(LogLevel::Warn),
        "error" => Ok(LogLevel::Error),
        _ => Err(LogError::InvalidLogLevel(level.to_string())),
    }
}

/// Convert a tracing::Level to a LogLevel enum.
pub fn level_to_log_level(level: Level) -> LogLevel {
    match level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warn,
        Level::ERROR => LogLevel::Error,
    }
}

/// Convert a LogLevel to a tracing::Level.
pub fn log_level_to_level(level: &LogLevel) -> Level {
    match level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::IoError(e) => write!(f, "IO error: {}", e),
            LogError::SubscriberError(e) => write!(f, "Subscriber error: {}", e),
            LogError::InvalidLogLevel(s) => write!(f, "Invalid log level: {}", s),
            LogError::Other(s) => write!(f, "{}", s),
        }
    }
}

impl std::error::Error for LogError {}
