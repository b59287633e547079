//! Projects the issue store onto editor decorations and the issue panel.
//!
//! Every refresh removes all previously applied markers and rebuilds from the
//! sorted store. There is no incremental diffing, so a refresh after a
//! recompile can never leave decorations from an older session behind.

use crate::host::{Annotation, DecorationStyle, EditorSurface, IssuePanel, LineRange, MarkerId};
use crate::issues::{decoration_style, IssueCounts, IssueStore};

pub const NO_ISSUES_MESSAGE: &str = "No issues.";

/// One row in the issue popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRow {
    pub line_number: usize,
    pub message: String,
    pub style: DecorationStyle,
}

/// Summary badge contents. `None` hides the bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueSummary {
    pub errors: Option<usize>,
    pub warnings: Option<usize>,
    pub todos: Option<usize>,
}

impl IssueSummary {
    #[must_use]
    pub fn from_counts(counts: IssueCounts) -> Self {
        let visible = |count: usize| (count > 0).then_some(count);
        Self {
            errors: visible(counts.errors),
            warnings: visible(counts.warnings),
            todos: visible(counts.todos),
        }
    }

    /// Human-readable badge text, e.g. `1 error, 2 todos`.
    #[must_use]
    pub fn label(&self) -> String {
        [
            (self.errors, "error"),
            (self.warnings, "warning"),
            (self.todos, "todo"),
        ]
        .into_iter()
        .filter_map(|(count, noun)| {
            count.map(|count| {
                if count == 1 {
                    format!("1 {noun}")
                } else {
                    format!("{count} {noun}s")
                }
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[derive(Debug, Default)]
pub struct DiagnosticsProjector {
    markers: Vec<MarkerId>,
    popup_visible: bool,
}

impl DiagnosticsProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marker handles currently applied to the editor.
    #[must_use]
    pub fn applied_markers(&self) -> &[MarkerId] {
        &self.markers
    }

    #[must_use]
    pub fn popup_visible(&self) -> bool {
        self.popup_visible
    }

    pub fn refresh<H>(&mut self, store: &IssueStore, host: &mut H)
    where
        H: EditorSurface + IssuePanel + ?Sized,
    {
        for marker in self.markers.drain(..) {
            host.remove_marker(marker);
        }

        let sorted = store.sorted();

        let annotations: Vec<Annotation> = sorted
            .iter()
            .map(|issue| Annotation {
                row: issue.line_number.saturating_sub(1),
                column: 0,
                text: issue.message.clone(),
                style: decoration_style(issue.kind),
            })
            .collect();
        host.set_annotations(&annotations);

        for issue in &sorted {
            let start_row = issue.line_number.saturating_sub(1);
            let marker = host.add_marker(
                LineRange {
                    start_row,
                    end_row: start_row + 1,
                },
                decoration_style(issue.kind),
            );
            self.markers.push(marker);
        }

        let rows: Vec<IssueRow> = sorted
            .iter()
            .map(|issue| IssueRow {
                line_number: issue.line_number,
                message: issue.message.clone(),
                style: decoration_style(issue.kind),
            })
            .collect();
        host.set_rows(&rows);

        let counts = store.counts();
        if counts.total() == 0 {
            self.popup_visible = false;
            host.show_no_issues(NO_ISSUES_MESSAGE);
            return;
        }

        host.show_summary(&IssueSummary::from_counts(counts));
        self.popup_visible = true;
        self.reposition_popup(host);
    }

    /// Centres the popup horizontally in the viewport while it is shown.
    pub fn reposition_popup<H>(&self, host: &mut H)
    where
        H: IssuePanel + ?Sized,
    {
        if !self.popup_visible {
            return;
        }

        let left = 0.5 * host.viewport_width() - 0.5 * host.popup_width();
        host.set_popup_left(left);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn summary_hides_empty_buckets() {
        let summary = IssueSummary::from_counts(IssueCounts {
            errors: 1,
            warnings: 0,
            todos: 1,
        });

        assert_eq!(
            summary,
            IssueSummary {
                errors: Some(1),
                warnings: None,
                todos: Some(1),
            }
        );
        assert_eq!(summary.label(), "1 error, 1 todo");
    }

    #[test]
    fn summary_label_pluralizes() {
        let summary = IssueSummary::from_counts(IssueCounts {
            errors: 0,
            warnings: 3,
            todos: 2,
        });

        assert_eq!(summary.label(), "3 warnings, 2 todos");
    }

    #[test]
    fn empty_summary_has_empty_label() {
        assert_eq!(IssueSummary::default().label(), "");
    }
}
