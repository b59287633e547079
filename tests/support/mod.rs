#![allow(dead_code)]

use interpreter_mock::ScriptedInterpreter;
use interpreter_protocol::{ChannelError, Diagnostic, InterpreterChannel, Outbound};
use ink_play::{
    Annotation, App, ChoicePrompt, DecorationStyle, DispatchOutcome, EditorSurface, IssuePanel,
    IssueRow, IssueSummary, LineRange, MarkerId, SessionController, TerminationKind, Token,
    TranscriptSurface,
};

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    SetAnnotations(Vec<Annotation>),
    AddMarker {
        marker: MarkerId,
        range: LineRange,
        style: DecorationStyle,
    },
    RemoveMarker(MarkerId),
    GoToLine {
        line: usize,
        column: usize,
    },
    Notify(String),
    Text {
        text: String,
        animated: bool,
    },
    Choice {
        prompt: ChoicePrompt,
        animated: bool,
    },
    LineError(Diagnostic),
    Terminating {
        text: String,
        kind: TerminationKind,
    },
    Divider,
    ScrollToBottom,
    PrepareForNextContent,
    NoIssues(String),
    Summary(IssueSummary),
    Rows(Vec<IssueRow>),
    PopupLeft(f64),
}

/// Records every host surface call and answers interpreter requests from a
/// scripted interpreter.
pub struct HostSpy {
    pub interpreter: ScriptedInterpreter,
    pub content: String,
    pub tokens: Vec<Token>,
    pub viewport_width: f64,
    pub popup_width: f64,
    pub calls: Vec<HostCall>,
    next_marker: MarkerId,
    live_markers: Vec<MarkerId>,
}

impl HostSpy {
    pub fn new(interpreter: ScriptedInterpreter) -> Self {
        Self {
            interpreter,
            content: "-> start\n=== start ===\nHello.\n".to_string(),
            tokens: Vec::new(),
            viewport_width: 800.0,
            popup_width: 300.0,
            calls: Vec::new(),
            next_marker: 1,
            live_markers: Vec::new(),
        }
    }

    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn live_markers(&self) -> &[MarkerId] {
        &self.live_markers
    }

    /// Choice prompts shown to the user, with their animation flag.
    pub fn shown_choices(&self) -> Vec<(String, bool)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Choice { prompt, animated } => {
                    Some((prompt.choice.text.clone(), *animated))
                }
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<(String, bool)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Text { text, animated } => Some((text.clone(), *animated)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &HostCall) -> usize {
        self.calls.iter().filter(|call| *call == wanted).count()
    }

    pub fn last_summary(&self) -> Option<&HostCall> {
        self.calls
            .iter()
            .rev()
            .find(|call| matches!(call, HostCall::Summary(_) | HostCall::NoIssues(_)))
    }

    pub fn last_rows(&self) -> Vec<IssueRow> {
        self.calls
            .iter()
            .rev()
            .find_map(|call| match call {
                HostCall::Rows(rows) => Some(rows.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn continued_with(&self) -> Vec<usize> {
        self.interpreter
            .sent()
            .iter()
            .filter_map(|message| match message {
                Outbound::ContinueWithChoice { choice_number, .. } => Some(*choice_number),
                _ => None,
            })
            .collect()
    }
}

impl InterpreterChannel for HostSpy {
    fn send(&mut self, message: Outbound) -> Result<(), ChannelError> {
        self.interpreter.send(message)
    }
}

impl EditorSurface for HostSpy {
    fn content(&self) -> String {
        self.content.clone()
    }

    fn set_annotations(&mut self, annotations: &[Annotation]) {
        self.calls.push(HostCall::SetAnnotations(annotations.to_vec()));
    }

    fn add_marker(&mut self, range: LineRange, style: DecorationStyle) -> MarkerId {
        let marker = self.next_marker;
        self.next_marker += 1;
        self.live_markers.push(marker);
        self.calls.push(HostCall::AddMarker {
            marker,
            range,
            style,
        });
        marker
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        self.live_markers.retain(|live| *live != marker);
        self.calls.push(HostCall::RemoveMarker(marker));
    }

    fn go_to_line(&mut self, line: usize, column: usize) {
        self.calls.push(HostCall::GoToLine { line, column });
    }

    fn tokens(&self) -> Vec<Token> {
        self.tokens.clone()
    }

    fn notify(&mut self, message: &str) {
        self.calls.push(HostCall::Notify(message.to_string()));
    }
}

impl TranscriptSurface for HostSpy {
    fn add_text(&mut self, text: &str, animated: bool) {
        self.calls.push(HostCall::Text {
            text: text.to_string(),
            animated,
        });
    }

    fn add_choice(&mut self, prompt: &ChoicePrompt, animated: bool) {
        self.calls.push(HostCall::Choice {
            prompt: prompt.clone(),
            animated,
        });
    }

    fn add_line_error(&mut self, diagnostic: &Diagnostic) {
        self.calls.push(HostCall::LineError(diagnostic.clone()));
    }

    fn add_terminating_message(&mut self, text: &str, kind: TerminationKind) {
        self.calls.push(HostCall::Terminating {
            text: text.to_string(),
            kind,
        });
    }

    fn add_horizontal_divider(&mut self) {
        self.calls.push(HostCall::Divider);
    }

    fn scroll_to_bottom(&mut self) {
        self.calls.push(HostCall::ScrollToBottom);
    }

    fn prepare_for_next_content(&mut self) {
        self.calls.push(HostCall::PrepareForNextContent);
    }
}

impl IssuePanel for HostSpy {
    fn show_no_issues(&mut self, message: &str) {
        self.calls.push(HostCall::NoIssues(message.to_string()));
    }

    fn show_summary(&mut self, summary: &IssueSummary) {
        self.calls.push(HostCall::Summary(*summary));
    }

    fn set_rows(&mut self, rows: &[IssueRow]) {
        self.calls.push(HostCall::Rows(rows.to_vec()));
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn popup_width(&self) -> f64 {
        self.popup_width
    }

    fn set_popup_left(&mut self, left: f64) {
        self.calls.push(HostCall::PopupLeft(left));
    }
}

/// Delivers queued interpreter output until the interpreter goes quiet.
pub fn pump(controller: &mut SessionController, host: &mut HostSpy) -> Vec<DispatchOutcome> {
    let mut outcomes = Vec::new();
    while host.interpreter.has_pending() {
        for message in host.interpreter.drain() {
            outcomes.push(controller.dispatch(message, host));
        }
    }
    outcomes
}

pub fn pump_app(app: &mut App, host: &mut HostSpy) -> Vec<DispatchOutcome> {
    let mut outcomes = Vec::new();
    while host.interpreter.has_pending() {
        for message in host.interpreter.drain() {
            outcomes.push(app.on_interpreter_message(message, host));
        }
    }
    outcomes
}
