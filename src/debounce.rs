//! Coalesces bursts of edits into a single recompile.

use std::time::{Duration, Instant};

use crate::config::DebounceConfig;

#[derive(Debug, Clone)]
pub struct ChangeDebouncer {
    last_modified: Option<Instant>,
    idle_threshold: Duration,
    startup_at: Option<Instant>,
}

impl ChangeDebouncer {
    /// Arms the compile-on-load trigger at `now + startup_delay`.
    pub fn new(config: &DebounceConfig, now: Instant) -> Self {
        Self {
            last_modified: None,
            idle_threshold: config.idle_threshold,
            startup_at: Some(now + config.startup_delay),
        }
    }

    pub fn note_modified(&mut self, now: Instant) {
        self.last_modified = Some(now);
    }

    /// True when a session should start now. Firing disarms the trigger.
    pub fn poll(&mut self, now: Instant) -> bool {
        if let Some(modified) = self.last_modified {
            if now.saturating_duration_since(modified) >= self.idle_threshold {
                self.reset();
                return true;
            }
            return false;
        }

        if self.startup_at.is_some_and(|at| now >= at) {
            self.reset();
            return true;
        }

        false
    }

    /// Forgets pending edits and the startup trigger, e.g. because a session
    /// was just started for another reason.
    pub fn reset(&mut self) {
        self.last_modified = None;
        self.startup_at = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.last_modified.is_some() || self.startup_at.is_some()
    }
}
