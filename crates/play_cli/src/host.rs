//! Line-oriented terminal rendering of the editor, transcript, and issue panel.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use ink_play::{
    Annotation, ChoicePrompt, DecorationStyle, EditorSurface, IssuePanel, IssueRow, IssueSummary,
    LineRange, MarkerId, TerminationKind, Token, TranscriptSurface,
};
use interpreter_protocol::{ChannelError, Diagnostic, InterpreterChannel, Outbound};
use tracing::warn;

use crate::backends::Backend;

pub const VIEWPORT_COLUMNS: f64 = 80.0;
pub const POPUP_COLUMNS: f64 = 40.0;

pub struct TerminalHost<W: Write> {
    out: W,
    pub backend: Backend,
    content: String,
    annotations: Vec<Annotation>,
    markers: BTreeMap<MarkerId, (LineRange, DecorationStyle)>,
    next_marker: MarkerId,
    rows: Vec<IssueRow>,
    summary: Option<String>,
    cursor: (usize, usize),
    popup_left: f64,
}

impl<W: Write> TerminalHost<W> {
    pub fn new(out: W, backend: Backend, content: String) -> Self {
        Self {
            out,
            backend,
            content,
            annotations: Vec::new(),
            markers: BTreeMap::new(),
            next_marker: 1,
            rows: Vec::new(),
            summary: None,
            cursor: (1, 0),
            popup_left: 0.0,
        }
    }

    pub fn set_content(&mut self, content: String) {
        self.content = content;
    }

    pub fn out(&self) -> &W {
        &self.out
    }

    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn rows(&self) -> &[IssueRow] {
        &self.rows
    }

    /// 1-based line and 0-based column of the editor cursor.
    #[must_use]
    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    #[must_use]
    pub fn popup_left(&self) -> f64 {
        self.popup_left
    }

    pub fn print(&mut self, args: fmt::Arguments<'_>) {
        if let Err(error) = self.out.write_fmt(args).and_then(|()| self.out.flush()) {
            warn!(%error, "failed to write to terminal");
        }
    }

    pub fn print_issues(&mut self) {
        if self.rows.is_empty() {
            self.print(format_args!("  No issues.\n"));
            return;
        }

        let rows = self.rows.clone();
        for row in rows {
            self.print(format_args!(
                "  {} line {}: {}\n",
                style_tag(row.style),
                row.line_number,
                row.message
            ));
        }
    }

    /// Prints the line under the cursor with its annotation, if any.
    fn print_cursor_line(&mut self) {
        let (line, _) = self.cursor;
        let text = self
            .content
            .lines()
            .nth(line.saturating_sub(1))
            .unwrap_or_default()
            .to_string();
        let note = self
            .annotations
            .iter()
            .find(|annotation| annotation.row + 1 == line)
            .map(|annotation| format!("  <- {}", annotation.text))
            .unwrap_or_default();
        self.print(format_args!("  {line:>4} | {text}{note}\n"));
    }
}

fn style_tag(style: DecorationStyle) -> &'static str {
    match style {
        DecorationStyle::Error => "[error]",
        DecorationStyle::Warning => "[warning]",
        DecorationStyle::Info => "[todo]",
    }
}

impl<W: Write> InterpreterChannel for TerminalHost<W> {
    fn send(&mut self, message: Outbound) -> Result<(), ChannelError> {
        self.backend.send(message)
    }
}

impl<W: Write> EditorSurface for TerminalHost<W> {
    fn content(&self) -> String {
        self.content.clone()
    }

    fn set_annotations(&mut self, annotations: &[Annotation]) {
        self.annotations = annotations.to_vec();
    }

    fn add_marker(&mut self, range: LineRange, style: DecorationStyle) -> MarkerId {
        let marker = self.next_marker;
        self.next_marker += 1;
        self.markers.insert(marker, (range, style));
        marker
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        self.markers.remove(&marker);
    }

    fn go_to_line(&mut self, line: usize, column: usize) {
        self.cursor = (line, column);
        self.print_cursor_line();
    }

    fn tokens(&self) -> Vec<Token> {
        Vec::new()
    }

    fn notify(&mut self, message: &str) {
        self.print(format_args!("  ({message})\n"));
    }
}

impl<W: Write> TranscriptSurface for TerminalHost<W> {
    fn add_text(&mut self, text: &str, _animated: bool) {
        self.print(format_args!("{text}\n"));
    }

    fn add_choice(&mut self, prompt: &ChoicePrompt, _animated: bool) {
        self.print(format_args!(
            "  {}. {}\n",
            prompt.choice.number, prompt.choice.text
        ));
    }

    fn add_line_error(&mut self, diagnostic: &Diagnostic) {
        self.print(format_args!(
            "  ! {} line {}: {}  (:line {} to jump)\n",
            diagnostic.kind.label(),
            diagnostic.line_number,
            diagnostic.message,
            diagnostic.line_number
        ));
    }

    fn add_terminating_message(&mut self, text: &str, kind: TerminationKind) {
        let marker = match kind {
            TerminationKind::End => "===",
            TerminationKind::Error => "!!!",
        };
        self.print(format_args!("{marker} {text} {marker}\n"));
    }

    fn add_horizontal_divider(&mut self) {
        self.print(format_args!("  ----\n"));
    }

    fn scroll_to_bottom(&mut self) {}

    fn prepare_for_next_content(&mut self) {
        self.print(format_args!("\n"));
    }
}

impl<W: Write> IssuePanel for TerminalHost<W> {
    fn show_no_issues(&mut self, message: &str) {
        if self.summary.as_deref() == Some(message) {
            return;
        }
        self.summary = Some(message.to_string());
        self.print(format_args!("[issues] {message}\n"));
    }

    fn show_summary(&mut self, summary: &IssueSummary) {
        let label = summary.label();
        if self.summary.as_deref() == Some(label.as_str()) {
            return;
        }
        self.print(format_args!("[issues] {label}\n"));
        self.summary = Some(label);
    }

    fn set_rows(&mut self, rows: &[IssueRow]) {
        self.rows = rows.to_vec();
    }

    fn viewport_width(&self) -> f64 {
        VIEWPORT_COLUMNS
    }

    fn popup_width(&self) -> f64 {
        POPUP_COLUMNS
    }

    fn set_popup_left(&mut self, left: f64) {
        self.popup_left = left;
    }
}

#[cfg(test)]
mod tests {
    use interpreter_mock::ScriptedInterpreter;
    use interpreter_protocol::{Choice, DiagnosticKind};
    use pretty_assertions::assert_eq;

    use super::*;

    fn host(content: &str) -> TerminalHost<Vec<u8>> {
        TerminalHost::new(
            Vec::new(),
            Backend::Scripted(ScriptedInterpreter::default()),
            content.to_string(),
        )
    }

    fn output(host: &TerminalHost<Vec<u8>>) -> String {
        String::from_utf8_lossy(host.out()).into_owned()
    }

    #[test]
    fn transcript_renders_text_choices_and_banners() {
        let mut host = host("");

        host.add_text("The lamp gutters.", true);
        host.add_choice(
            &ChoicePrompt {
                session_id: 1,
                choice: Choice::new(2, "Follow the river"),
            },
            true,
        );
        host.add_horizontal_divider();
        host.add_terminating_message("End of story", TerminationKind::End);

        assert_eq!(
            output(&host),
            "The lamp gutters.\n  2. Follow the river\n  ----\n=== End of story ===\n"
        );
    }

    #[test]
    fn summary_is_printed_only_when_it_changes() {
        let mut host = host("");
        let summary = IssueSummary {
            errors: Some(1),
            warnings: None,
            todos: Some(1),
        };

        host.show_summary(&summary);
        host.show_summary(&summary);
        host.show_no_issues("No issues.");

        assert_eq!(
            output(&host),
            "[issues] 1 error, 1 todo\n[issues] No issues.\n"
        );
    }

    #[test]
    fn go_to_line_prints_the_line_with_its_annotation() {
        let mut host = host("-> start\n=== start ===\nHello.\n");
        host.set_annotations(&[Annotation {
            row: 2,
            column: 0,
            text: "TODO: greet properly".to_string(),
            style: DecorationStyle::Info,
        }]);

        host.go_to_line(3, 0);

        assert_eq!(host.cursor(), (3, 0));
        assert_eq!(
            output(&host),
            "     3 | Hello.  <- TODO: greet properly\n"
        );
    }

    #[test]
    fn markers_are_tracked_until_removed() {
        let mut host = host("");
        let range = LineRange {
            start_row: 3,
            end_row: 4,
        };

        let first = host.add_marker(range, DecorationStyle::Error);
        let second = host.add_marker(range, DecorationStyle::Warning);
        assert_ne!(first, second);
        assert_eq!(host.marker_count(), 2);

        host.remove_marker(first);
        assert_eq!(host.marker_count(), 1);
    }

    #[test]
    fn runtime_errors_show_jump_hint() {
        let mut host = host("");

        host.add_line_error(&Diagnostic::new(
            DiagnosticKind::RuntimeError,
            7,
            "ran out of content",
        ));

        assert_eq!(
            output(&host),
            "  ! RUNTIME ERROR line 7: ran out of content  (:line 7 to jump)\n"
        );
    }
}
