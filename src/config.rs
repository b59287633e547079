//! Environment configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const POLL_INTERVAL_ENV_VAR: &str = "INK_PLAY_POLL_MS";
pub const IDLE_THRESHOLD_ENV_VAR: &str = "INK_PLAY_IDLE_MS";
pub const STARTUP_DELAY_ENV_VAR: &str = "INK_PLAY_STARTUP_DELAY_MS";
pub const LOG_FILTER_ENV_VAR: &str = "INK_PLAY_LOG";
pub const LOG_FILE_ENV_VAR: &str = "INK_PLAY_LOG_FILE";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);
pub const DEFAULT_IDLE_THRESHOLD: Duration = Duration::from_millis(500);
pub const DEFAULT_STARTUP_DELAY: Duration = Duration::from_millis(1000);

/// Recompile timing. The host polls every `poll_interval`; a compile starts
/// once edits have been quiet for `idle_threshold`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebounceConfig {
    pub poll_interval: Duration,
    pub idle_threshold: Duration,
    pub startup_delay: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            idle_threshold: DEFAULT_IDLE_THRESHOLD,
            startup_delay: DEFAULT_STARTUP_DELAY,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// `tracing-subscriber` filter directive; `info` when unset.
    pub filter: Option<String>,
    /// Log destination; stderr when unset.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayConfig {
    pub debounce: DebounceConfig,
    pub log: LogConfig,
}

impl PlayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let poll_interval = env_millis(POLL_INTERVAL_ENV_VAR, DEFAULT_POLL_INTERVAL)?;
        if poll_interval.is_zero() {
            return Err(ConfigError::ZeroDuration {
                key: POLL_INTERVAL_ENV_VAR,
            });
        }

        Ok(Self {
            debounce: DebounceConfig {
                poll_interval,
                idle_threshold: env_millis(IDLE_THRESHOLD_ENV_VAR, DEFAULT_IDLE_THRESHOLD)?,
                startup_delay: env_millis(STARTUP_DELAY_ENV_VAR, DEFAULT_STARTUP_DELAY)?,
            },
            log: LogConfig {
                filter: env_string_opt(LOG_FILTER_ENV_VAR),
                file: env_string_opt(LOG_FILE_ENV_VAR).map(PathBuf::from),
            },
        })
    }

    #[must_use]
    pub fn with_idle_threshold(mut self, idle_threshold: Duration) -> Self {
        self.debounce.idle_threshold = idle_threshold;
        self
    }

    #[must_use]
    pub fn with_startup_delay(mut self, startup_delay: Duration) -> Self {
        self.debounce.startup_delay = startup_delay;
        self
    }
}

fn env_millis(key: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    let Some(value) = env_string_opt(key) else {
        return Ok(default);
    };

    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::InvalidMillis { key, value })
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
