use std::time::Instant;

use interpreter_protocol::{Inbound, SessionId};
use tracing::debug;

use crate::config::PlayConfig;
use crate::controller::{DispatchOutcome, SessionController};
use crate::debounce::ChangeDebouncer;
use crate::error::SelectionError;
use crate::host::HostOps;
use crate::navigation::{
    pointer_style, resolve_divert, DivertJump, PointerStyle, Position, INCLUDE_UNSUPPORTED_MESSAGE,
};

/// User intents coming back from the host surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A choice prompt was clicked.
    SelectChoice {
        session_id: SessionId,
        choice_number: usize,
    },
    /// An issue row or an inline runtime error was clicked. `line` is 1-based.
    JumpToLine { line: usize },
    NextIssue,
    Rewind,
    StepBack,
    EditorClick {
        position: Position,
        modifier_held: bool,
    },
    ViewportResized,
}

#[derive(Debug)]
pub struct App {
    pub controller: SessionController,
    debouncer: ChangeDebouncer,
    config: PlayConfig,
}

impl App {
    pub fn new(config: PlayConfig, now: Instant) -> Self {
        Self {
            controller: SessionController::new(),
            debouncer: ChangeDebouncer::new(&config.debounce, now),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PlayConfig {
        &self.config
    }

    #[must_use]
    pub fn debouncer(&self) -> &ChangeDebouncer {
        &self.debouncer
    }

    pub fn on_content_modified(&mut self, now: Instant) {
        self.debouncer.note_modified(now);
    }

    /// Polling hook. Returns true when a new session was started.
    pub fn on_tick(&mut self, now: Instant, host: &mut dyn HostOps) -> bool {
        if !self.debouncer.poll(now) {
            return false;
        }

        let content = host.content();
        self.controller.start_session(content, host);
        true
    }

    pub fn on_interpreter_message(
        &mut self,
        message: Inbound,
        host: &mut dyn HostOps,
    ) -> DispatchOutcome {
        self.controller.dispatch(message, host)
    }

    pub fn on_command(
        &mut self,
        command: Command,
        host: &mut dyn HostOps,
    ) -> Result<(), SelectionError> {
        match command {
            Command::SelectChoice {
                session_id,
                choice_number,
            } => {
                self.controller
                    .select_choice(session_id, choice_number, host)?;
            }
            Command::JumpToLine { line } => {
                host.go_to_line(line, 0);
            }
            Command::NextIssue => {
                self.controller.next_issue(host);
            }
            Command::Rewind => {
                self.debouncer.reset();
                self.controller.rewind(host);
            }
            Command::StepBack => {
                self.debouncer.reset();
                self.controller.step_back(host);
            }
            Command::EditorClick {
                position,
                modifier_held,
            } => {
                if modifier_held {
                    self.follow_divert(position, host);
                }
            }
            Command::ViewportResized => {
                self.controller.reposition_popup(host);
            }
        }

        Ok(())
    }

    /// Cursor shape for a hover at `position`.
    pub fn pointer_at(
        &self,
        position: Position,
        modifier_held: bool,
        host: &dyn HostOps,
    ) -> PointerStyle {
        pointer_style(&host.tokens(), position, modifier_held)
    }

    fn follow_divert(&mut self, position: Position, host: &mut dyn HostOps) {
        match resolve_divert(&host.tokens(), position) {
            DivertJump::Target(target) => host.go_to_line(target.row + 1, target.column),
            DivertJump::IncludeUnsupported => host.notify(INCLUDE_UNSUPPORTED_MESSAGE),
            DivertJump::Unresolved => {
                debug!(row = position.row, column = position.column, "divert target not found");
            }
            DivertJump::NotADivert => {}
        }
    }
}
