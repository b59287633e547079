//! Diagnostics collected for the current session.

use interpreter_protocol::{Diagnostic, DiagnosticKind};

use crate::host::DecorationStyle;

/// Sort priority; lower ranks come first.
#[must_use]
pub fn severity_rank(kind: DiagnosticKind) -> u8 {
    match kind {
        DiagnosticKind::Error => 1,
        DiagnosticKind::RuntimeError => 2,
        DiagnosticKind::Warning => 3,
        DiagnosticKind::Todo => 4,
    }
}

#[must_use]
pub fn decoration_style(kind: DiagnosticKind) -> DecorationStyle {
    match kind {
        DiagnosticKind::Error | DiagnosticKind::RuntimeError => DecorationStyle::Error,
        DiagnosticKind::Warning => DecorationStyle::Warning,
        DiagnosticKind::Todo => DecorationStyle::Info,
    }
}

/// Per-bucket totals. Runtime errors count as errors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IssueCounts {
    pub errors: usize,
    pub warnings: usize,
    pub todos: usize,
}

impl IssueCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.todos
    }
}

/// Unordered append buffer of issues plus the "next issue" selection cursor.
///
/// The selection indexes into [`IssueStore::sorted`], not into insertion order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IssueStore {
    issues: Vec<Diagnostic>,
    selected: Option<usize>,
}

impl IssueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an issue. Exact duplicates within one session are dropped.
    pub fn push(&mut self, issue: Diagnostic) -> bool {
        if self.issues.contains(&issue) {
            return false;
        }

        self.issues.push(issue);
        true
    }

    /// Issues ordered by `(severity_rank, line_number)`; ties keep arrival order.
    #[must_use]
    pub fn sorted(&self) -> Vec<&Diagnostic> {
        let mut sorted: Vec<&Diagnostic> = self.issues.iter().collect();
        sorted.sort_by_key(|issue| (severity_rank(issue.kind), issue.line_number));
        sorted
    }

    pub fn clear(&mut self) {
        self.issues.clear();
        self.selected = None;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    #[must_use]
    pub fn counts(&self) -> IssueCounts {
        let mut counts = IssueCounts::default();
        for issue in &self.issues {
            match issue.kind {
                DiagnosticKind::Error | DiagnosticKind::RuntimeError => counts.errors += 1,
                DiagnosticKind::Warning => counts.warnings += 1,
                DiagnosticKind::Todo => counts.todos += 1,
            }
        }
        counts
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Advances the selection through the sorted list, wrapping past the end.
    pub fn select_next(&mut self) -> Option<&Diagnostic> {
        let count = self.issues.len();
        if count == 0 {
            return None;
        }

        let next = match self.selected {
            Some(index) if index + 1 < count => index + 1,
            _ => 0,
        };
        self.selected = Some(next);
        self.sorted().get(next).copied()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn issue(kind: DiagnosticKind, line_number: usize, message: &str) -> Diagnostic {
        Diagnostic::new(kind, line_number, message)
    }

    fn keys(store: &IssueStore) -> Vec<(DiagnosticKind, usize)> {
        store
            .sorted()
            .into_iter()
            .map(|issue| (issue.kind, issue.line_number))
            .collect()
    }

    #[test]
    fn sorted_groups_by_rank_then_line() {
        let mut store = IssueStore::new();
        store.push(issue(DiagnosticKind::Todo, 2, "later"));
        store.push(issue(DiagnosticKind::Warning, 30, "unused"));
        store.push(issue(DiagnosticKind::RuntimeError, 1, "ran off"));
        store.push(issue(DiagnosticKind::Error, 40, "syntax"));
        store.push(issue(DiagnosticKind::Warning, 3, "shadowed"));
        store.push(issue(DiagnosticKind::Error, 7, "unknown divert"));

        assert_eq!(
            keys(&store),
            vec![
                (DiagnosticKind::Error, 7),
                (DiagnosticKind::Error, 40),
                (DiagnosticKind::RuntimeError, 1),
                (DiagnosticKind::Warning, 3),
                (DiagnosticKind::Warning, 30),
                (DiagnosticKind::Todo, 2),
            ]
        );
    }

    #[test]
    fn sorted_is_stable_for_equal_keys() {
        let mut store = IssueStore::new();
        store.push(issue(DiagnosticKind::Warning, 5, "first"));
        store.push(issue(DiagnosticKind::Warning, 5, "second"));
        store.push(issue(DiagnosticKind::Warning, 5, "third"));

        let messages: Vec<&str> = store
            .sorted()
            .into_iter()
            .map(|issue| issue.message.as_str())
            .collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[test]
    fn exact_duplicates_are_dropped() {
        let mut store = IssueStore::new();
        assert!(store.push(issue(DiagnosticKind::Error, 4, "oops")));
        assert!(!store.push(issue(DiagnosticKind::Error, 4, "oops")));
        assert!(store.push(issue(DiagnosticKind::Error, 4, "other")));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn counts_fold_runtime_errors_into_errors() {
        let mut store = IssueStore::new();
        store.push(issue(DiagnosticKind::Error, 1, "a"));
        store.push(issue(DiagnosticKind::RuntimeError, 2, "b"));
        store.push(issue(DiagnosticKind::Todo, 3, "c"));

        assert_eq!(
            store.counts(),
            IssueCounts {
                errors: 2,
                warnings: 0,
                todos: 1,
            }
        );
        assert_eq!(store.counts().total(), 3);
    }

    #[test]
    fn select_next_cycles_and_wraps() {
        let mut store = IssueStore::new();
        store.push(issue(DiagnosticKind::Todo, 10, "todo"));
        store.push(issue(DiagnosticKind::Error, 4, "error"));

        let lines: Vec<usize> = (0..3)
            .map(|_| store.select_next().expect("issue selected").line_number)
            .collect();
        assert_eq!(lines, vec![4, 10, 4]);
        assert_eq!(store.selected(), Some(0));
    }

    #[test]
    fn clear_empties_and_resets_selection() {
        let mut store = IssueStore::new();
        store.push(issue(DiagnosticKind::Error, 4, "error"));
        store.select_next();

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.selected(), None);
        assert_eq!(store.select_next(), None);
    }
}
