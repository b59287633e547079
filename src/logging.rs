//! Process-wide `tracing` subscriber setup.

use std::fs::{create_dir_all, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;
use crate::error::LoggingError;

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Parses the configured filter directive, falling back to [`DEFAULT_LOG_FILTER`].
pub fn build_filter(config: &LogConfig) -> Result<EnvFilter, LoggingError> {
    let filter = config
        .filter
        .as_deref()
        .unwrap_or(DEFAULT_LOG_FILTER)
        .trim();

    EnvFilter::try_new(filter).map_err(|source| LoggingError::Filter {
        filter: filter.to_string(),
        source,
    })
}

/// Installs the global subscriber. Logs go to stderr unless a file is
/// configured, since stdout belongs to the transcript.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;

    let installed = match config.file.as_deref() {
        Some(path) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(Mutex::new(open_log_file(path)?))
            .try_init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    installed.map_err(|_| LoggingError::AlreadyInstalled)?;

    tracing::debug!(
        log_file = %config
            .file
            .as_deref()
            .map_or_else(|| "(stderr)".into(), |path| path.display().to_string()),
        "logging initialized"
    );
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent).map_err(|source| LoggingError::log_file(parent, source))?;
        }
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::log_file(path, source))
}
