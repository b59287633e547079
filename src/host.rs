//! Surfaces the controller drives but does not own.
//!
//! The editor, transcript widget, and issue panel are external collaborators.
//! Each is a narrow trait so controller transitions stay testable with a spy.
//! [`HostOps`] bundles them with the interpreter channel; any type that
//! implements all four gets it for free.

use interpreter_protocol::{Choice, Diagnostic, InterpreterChannel, SessionId};

use crate::navigation::Token;
use crate::projector::{IssueRow, IssueSummary};

/// Handle returned by the editor for one applied line marker.
pub type MarkerId = u64;

/// Visual class shared by annotations, markers, and issue rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorationStyle {
    Error,
    Warning,
    Info,
}

/// Gutter annotation. `row` is 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub row: usize,
    pub column: usize,
    pub text: String,
    pub style: DecorationStyle,
}

/// Whole-line marker covering rows `start_row..end_row` (0-based, end exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start_row: usize,
    pub end_row: usize,
}

/// A choice as shown to the user. Selecting it must come back as
/// `Command::SelectChoice` carrying the same `session_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoicePrompt {
    pub session_id: SessionId,
    pub choice: Choice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationKind {
    End,
    Error,
}

pub trait EditorSurface {
    fn content(&self) -> String;
    fn set_annotations(&mut self, annotations: &[Annotation]);
    fn add_marker(&mut self, range: LineRange, style: DecorationStyle) -> MarkerId;
    fn remove_marker(&mut self, marker: MarkerId);
    /// Moves the view and cursor. `line` is 1-based, `column` 0-based.
    fn go_to_line(&mut self, line: usize, column: usize);
    /// Tokens in document order.
    fn tokens(&self) -> Vec<Token>;
    fn notify(&mut self, message: &str);
}

pub trait TranscriptSurface {
    fn add_text(&mut self, text: &str, animated: bool);
    fn add_choice(&mut self, prompt: &ChoicePrompt, animated: bool);
    /// Inline runtime error; clicking it must come back as `Command::JumpToLine`.
    fn add_line_error(&mut self, diagnostic: &Diagnostic);
    fn add_terminating_message(&mut self, text: &str, kind: TerminationKind);
    fn add_horizontal_divider(&mut self);
    fn scroll_to_bottom(&mut self);
    fn prepare_for_next_content(&mut self);
}

pub trait IssuePanel {
    /// Hides the summary badge and popup and shows `message` instead.
    fn show_no_issues(&mut self, message: &str);
    fn show_summary(&mut self, summary: &IssueSummary);
    /// Replaces the popup rows; clicking a row must come back as `Command::JumpToLine`.
    fn set_rows(&mut self, rows: &[IssueRow]);
    fn viewport_width(&self) -> f64;
    fn popup_width(&self) -> f64;
    fn set_popup_left(&mut self, left: f64);
}

pub trait HostOps: InterpreterChannel + EditorSurface + TranscriptSurface + IssuePanel {}

impl<T> HostOps for T where T: InterpreterChannel + EditorSurface + TranscriptSurface + IssuePanel {}
