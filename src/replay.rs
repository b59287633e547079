//! Choices made along the user's current narrative path.

/// Position of replay within the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayCursor {
    /// Choice points are surfaced to the user.
    Live,
    /// Index of the next logged choice to re-submit, in `0..=len`.
    At(usize),
}

/// Append-only (until truncated) sequence of chosen choice numbers.
///
/// The log survives recompiles; only [`ChoiceReplayLog::rewind`] and
/// [`ChoiceReplayLog::step_back`] shorten it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceReplayLog {
    choices: Vec<usize>,
    cursor: ReplayCursor,
}

impl Default for ChoiceReplayLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ChoiceReplayLog {
    pub fn new() -> Self {
        Self {
            choices: Vec::new(),
            cursor: ReplayCursor::Live,
        }
    }

    #[must_use]
    pub fn choices(&self) -> &[usize] {
        &self.choices
    }

    #[must_use]
    pub fn cursor(&self) -> ReplayCursor {
        self.cursor
    }

    #[must_use]
    pub fn is_replaying(&self) -> bool {
        self.cursor != ReplayCursor::Live
    }

    /// Positions the cursor for a freshly started session.
    pub fn restart(&mut self) {
        self.cursor = if self.choices.is_empty() {
            ReplayCursor::Live
        } else {
            ReplayCursor::At(0)
        };
    }

    /// The logged choice that should resolve the current choice point, if any.
    #[must_use]
    pub fn pending(&self) -> Option<usize> {
        match self.cursor {
            ReplayCursor::At(index) => self.choices.get(index).copied(),
            ReplayCursor::Live => None,
        }
    }

    /// Takes the pending logged choice and moves the cursor past it.
    pub fn advance(&mut self) -> Option<usize> {
        let choice = self.pending()?;
        if let ReplayCursor::At(index) = self.cursor {
            self.cursor = ReplayCursor::At(index + 1);
        }
        Some(choice)
    }

    /// Switches to live play once every logged choice has been re-submitted.
    /// Returns true when that transition happened.
    pub fn catch_up(&mut self) -> bool {
        if self.cursor == ReplayCursor::At(self.choices.len()) {
            self.cursor = ReplayCursor::Live;
            return true;
        }

        false
    }

    /// Appends a user selection. Ignored while inside a replay window.
    pub fn record(&mut self, choice_number: usize) -> bool {
        if self.is_replaying() {
            return false;
        }

        self.choices.push(choice_number);
        true
    }

    /// Forgets the whole path.
    pub fn rewind(&mut self) {
        self.choices.clear();
        self.cursor = ReplayCursor::Live;
    }

    /// Drops the most recent choice.
    pub fn step_back(&mut self) -> Option<usize> {
        self.choices.pop()
    }
}
