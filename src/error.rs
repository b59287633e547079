use std::path::PathBuf;

use interpreter_protocol::SessionId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a whole number of milliseconds, got {value:?}")]
    InvalidMillis { key: &'static str, value: String },

    #[error("{key} must be greater than zero")]
    ZeroDuration { key: &'static str },
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter {filter:?}: {source}")]
    Filter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("I/O error while opening log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,
}

/// Reasons a user choice selection is rejected without contacting the interpreter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("choice belongs to session {session_id}, current session is {current}")]
    StaleSession {
        session_id: SessionId,
        current: SessionId,
    },

    #[error("no choice point is waiting for a selection")]
    NoOpenChoicePoint,

    #[error("choice {choice_number} was not offered at the current choice point")]
    NotOffered { choice_number: usize },
}

impl LoggingError {
    #[must_use]
    pub fn log_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LogFile {
            path: path.into(),
            source,
        }
    }
}
