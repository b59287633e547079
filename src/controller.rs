//! Session lifecycle for the compile-and-play loop.
//!
//! Every compile starts a new session with a strictly larger id. Interpreter
//! events carry the id of the session that produced them, and anything not
//! tagged with the current id is dropped before it can touch the transcript,
//! the issue store, or the replay cursor. Stopping the previous session is
//! fire-and-forget; its late events are filtered the same way.

use interpreter_protocol::{
    Choice, ChannelError, Diagnostic, DiagnosticKind, Inbound, InterpreterEvent, Outbound,
    SessionId,
};
use tracing::{debug, error, info, warn};

use crate::error::SelectionError;
use crate::host::{ChoicePrompt, HostOps, TerminationKind};
use crate::issues::IssueStore;
use crate::projector::DiagnosticsProjector;
use crate::replay::ChoiceReplayLog;

pub const END_OF_STORY_MESSAGE: &str = "End of story";
pub const ERROR_IN_STORY_MESSAGE: &str = "Error in story";
pub const INTERPRETER_UNAVAILABLE_PREFIX: &str = "Interpreter unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session has been started yet.
    Idle,
    Running,
    Completed,
    Errored,
}

impl SessionPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Errored)
    }
}

/// Choices offered since the last `inputRequired` or selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoicePoint {
    pub choices: Vec<Choice>,
    /// Resolved from the replay log instead of being shown to the user.
    pub replayed: bool,
    animated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Applied,
    /// Tagged with a session other than the current one.
    Stale,
    /// The current session already reached a terminal state.
    AfterTerminal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub current: SessionId,
    pub phase: SessionPhase,
    pub replay: ChoiceReplayLog,
    pub issues: IssueStore,
    pub choice_point: Option<ChoicePoint>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current: 0,
            phase: SessionPhase::Idle,
            replay: ChoiceReplayLog::new(),
            issues: IssueStore::new(),
            choice_point: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionController {
    state: SessionState,
    projector: DiagnosticsProjector,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn current_session(&self) -> SessionId {
        self.state.current
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    #[must_use]
    pub fn replay(&self) -> &ChoiceReplayLog {
        &self.state.replay
    }

    #[must_use]
    pub fn issues(&self) -> &IssueStore {
        &self.state.issues
    }

    #[must_use]
    pub fn projector(&self) -> &DiagnosticsProjector {
        &self.projector
    }

    /// Choices the user may pick right now, empty while replaying.
    #[must_use]
    pub fn open_choices(&self) -> &[Choice] {
        match &self.state.choice_point {
            Some(point) if !point.replayed => &point.choices,
            _ => &[],
        }
    }

    /// Supersedes the current session with a fresh compile of `content`.
    pub fn start_session(&mut self, content: String, host: &mut dyn HostOps) -> SessionId {
        let previous = self.state.current;
        if previous > 0 {
            if let Err(error) = host.send(Outbound::Stop {
                session_id: previous,
            }) {
                warn!(session_id = previous, %error, "failed to stop previous session");
            }
        }

        self.state.current = previous + 1;
        let session_id = self.state.current;
        self.state.phase = SessionPhase::Running;
        self.state.choice_point = None;
        self.state.replay.restart();

        host.prepare_for_next_content();
        self.state.issues.clear();
        self.projector.refresh(&self.state.issues, host);

        info!(
            session_id,
            replaying = self.state.replay.choices().len(),
            "starting session"
        );

        if let Err(error) = host.send(Outbound::Run {
            content,
            session_id,
        }) {
            self.fail_to_send(&error, host);
        }

        session_id
    }

    /// Clears the whole replay log and restarts from the top of the story.
    pub fn rewind(&mut self, host: &mut dyn HostOps) -> SessionId {
        self.state.replay.rewind();
        let content = host.content();
        self.start_session(content, host)
    }

    /// Forgets the most recent choice and replays up to the one before it.
    pub fn step_back(&mut self, host: &mut dyn HostOps) -> SessionId {
        self.state.replay.step_back();
        let content = host.content();
        self.start_session(content, host)
    }

    pub fn dispatch(&mut self, message: Inbound, host: &mut dyn HostOps) -> DispatchOutcome {
        let Inbound { session_id, event } = message;

        if self.state.phase == SessionPhase::Idle || session_id != self.state.current {
            debug!(
                session_id,
                current = self.state.current,
                event = event.name(),
                "dropping stale interpreter event"
            );
            return DispatchOutcome::Stale;
        }

        if let InterpreterEvent::StopAcknowledged = event {
            debug!(session_id, "stop acknowledged");
            return DispatchOutcome::Applied;
        }

        if self.state.phase.is_terminal() {
            debug!(
                session_id,
                event = event.name(),
                "dropping event after session ended"
            );
            return DispatchOutcome::AfterTerminal;
        }

        if event.is_terminal() {
            let phase = match event {
                InterpreterEvent::StoryCompleted => SessionPhase::Completed,
                _ => SessionPhase::Errored,
            };
            self.finish(phase, host);
            return DispatchOutcome::Applied;
        }

        match event {
            InterpreterEvent::TextProduced { text } => {
                host.add_text(&text, !self.state.replay.is_replaying());
            }
            InterpreterEvent::DiagnosticProduced { diagnostic } => {
                self.on_diagnostic(diagnostic, host);
            }
            InterpreterEvent::ChoiceProduced { choice } => {
                self.on_choice(choice, host);
            }
            InterpreterEvent::InputRequired => {
                self.on_input_required(host);
            }
            InterpreterEvent::StoryCompleted
            | InterpreterEvent::UnexpectedExit
            | InterpreterEvent::StopAcknowledged => {}
        }

        DispatchOutcome::Applied
    }

    /// Accepts a user pick from the open choice point and forwards it.
    pub fn select_choice(
        &mut self,
        session_id: SessionId,
        choice_number: usize,
        host: &mut dyn HostOps,
    ) -> Result<(), SelectionError> {
        if session_id != self.state.current {
            return Err(SelectionError::StaleSession {
                session_id,
                current: self.state.current,
            });
        }

        let point = match &self.state.choice_point {
            Some(point) if !point.replayed && self.state.phase == SessionPhase::Running => point,
            _ => return Err(SelectionError::NoOpenChoicePoint),
        };
        if !point.choices.iter().any(|choice| choice.number == choice_number) {
            return Err(SelectionError::NotOffered { choice_number });
        }

        self.state.replay.record(choice_number);
        self.state.choice_point = None;
        debug!(session_id, choice_number, "choice selected");
        self.continue_with(choice_number, host);
        Ok(())
    }

    /// Moves the issue selection forward and jumps the editor to it.
    pub fn next_issue(&mut self, host: &mut dyn HostOps) -> Option<usize> {
        let line_number = self.state.issues.select_next()?.line_number;
        host.go_to_line(line_number, 0);
        Some(line_number)
    }

    pub fn reposition_popup(&self, host: &mut dyn HostOps) {
        self.projector.reposition_popup(host);
    }

    fn on_diagnostic(&mut self, diagnostic: Diagnostic, host: &mut dyn HostOps) {
        if diagnostic.kind == DiagnosticKind::RuntimeError {
            host.add_line_error(&diagnostic);
        }

        if self.state.issues.push(diagnostic) {
            self.projector.refresh(&self.state.issues, host);
        }
    }

    fn on_choice(&mut self, choice: Choice, host: &mut dyn HostOps) {
        let replay = &mut self.state.replay;
        let point = self.state.choice_point.get_or_insert_with(|| {
            if replay.pending().is_some() {
                ChoicePoint {
                    choices: Vec::new(),
                    replayed: true,
                    animated: false,
                }
            } else {
                let caught_up = replay.catch_up();
                ChoicePoint {
                    choices: Vec::new(),
                    replayed: false,
                    animated: !caught_up,
                }
            }
        });

        if !point.replayed {
            host.add_choice(
                &ChoicePrompt {
                    session_id: self.state.current,
                    choice: choice.clone(),
                },
                point.animated,
            );
        }
        point.choices.push(choice);
    }

    fn on_input_required(&mut self, host: &mut dyn HostOps) {
        host.scroll_to_bottom();

        let replayed_point = matches!(
            self.state.choice_point,
            Some(ChoicePoint { replayed: true, .. })
        );
        if !replayed_point {
            return;
        }

        let Some(choice_number) = self.state.replay.advance() else {
            return;
        };

        host.add_horizontal_divider();
        self.state.choice_point = None;
        debug!(
            session_id = self.state.current,
            choice_number, "replaying logged choice"
        );
        self.continue_with(choice_number, host);
    }

    fn finish(&mut self, phase: SessionPhase, host: &mut dyn HostOps) {
        self.state.phase = phase;
        self.state.choice_point = None;

        let (message, kind) = match phase {
            SessionPhase::Completed => (END_OF_STORY_MESSAGE, TerminationKind::End),
            _ => (ERROR_IN_STORY_MESSAGE, TerminationKind::Error),
        };
        info!(session_id = self.state.current, ?phase, "session ended");
        host.add_terminating_message(message, kind);
    }

    fn continue_with(&mut self, choice_number: usize, host: &mut dyn HostOps) {
        if let Err(error) = host.send(Outbound::ContinueWithChoice {
            choice_number,
            session_id: self.state.current,
        }) {
            self.fail_to_send(&error, host);
        }
    }

    fn fail_to_send(&mut self, error: &ChannelError, host: &mut dyn HostOps) {
        error!(session_id = self.state.current, %error, "interpreter request failed");
        self.state.phase = SessionPhase::Errored;
        self.state.choice_point = None;
        host.add_terminating_message(
            &format!("{INTERPRETER_UNAVAILABLE_PREFIX}: {error}"),
            TerminationKind::Error,
        );
    }
}
