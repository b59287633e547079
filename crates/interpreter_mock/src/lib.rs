//! Deterministic in-memory implementation of the interpreter contract.
//!
//! This crate contains no process or transport logic. It answers `run`,
//! `continueWithChoice`, and `stop` requests from a fixed passage script and
//! queues the replies until the host drains them, which lets tests decide
//! exactly when (and in which order) interpreter output is delivered.

use std::collections::{HashMap, VecDeque};

use interpreter_protocol::{
    ChannelError, Choice, Diagnostic, DiagnosticKind, Inbound, InterpreterChannel,
    InterpreterEvent, Outbound, SessionId,
};

/// Stable backend identifier used for explicit startup selection.
pub const SCRIPTED_INTERPRETER_ID: &str = "scripted";

/// How a passage without choices ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Ending {
    #[default]
    Complete,
    Crash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedChoice {
    pub text: String,
    pub target: usize,
}

/// One stretch of story output followed by a decision point or an ending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Passage {
    pub text: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub choices: Vec<ScriptedChoice>,
    pub ending: Ending,
}

impl Passage {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: vec![text.into()],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text.push(text.into());
        self
    }

    /// Adds a choice leading to the passage at `target`.
    #[must_use]
    pub fn with_choice(mut self, text: impl Into<String>, target: usize) -> Self {
        self.choices.push(ScriptedChoice {
            text: text.into(),
            target,
        });
        self
    }

    #[must_use]
    pub fn with_runtime_error(mut self, line_number: usize, message: impl Into<String>) -> Self {
        self.diagnostics.push(Diagnostic::new(
            DiagnosticKind::RuntimeError,
            line_number,
            message,
        ));
        self
    }

    #[must_use]
    pub fn crashing(mut self) -> Self {
        self.ending = Ending::Crash;
        self
    }
}

/// Passages indexed from zero; a run always enters passage 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryScript {
    passages: Vec<Passage>,
}

impl StoryScript {
    #[must_use]
    pub fn new(passages: Vec<Passage>) -> Self {
        Self { passages }
    }

    /// Builds `decisions` decision points in a row. Each offers two choices
    /// that both lead to the next passage; the final passage completes.
    #[must_use]
    pub fn chain(decisions: usize) -> Self {
        let mut passages = Vec::with_capacity(decisions + 1);
        for index in 0..decisions {
            passages.push(
                Passage::new(format!("Passage {index}"))
                    .with_choice(format!("Left at {index}"), index + 1)
                    .with_choice(format!("Right at {index}"), index + 1),
            );
        }
        passages.push(Passage::new("The end"));
        Self { passages }
    }
}

/// Scripted interpreter that records every request it receives.
#[derive(Debug)]
pub struct ScriptedInterpreter {
    script: StoryScript,
    compile_diagnostics: Vec<Diagnostic>,
    positions: HashMap<SessionId, usize>,
    pending: VecDeque<Inbound>,
    sent: Vec<Outbound>,
    closed: bool,
}

impl ScriptedInterpreter {
    #[must_use]
    pub fn new(script: StoryScript) -> Self {
        Self {
            script,
            compile_diagnostics: Vec::new(),
            positions: HashMap::new(),
            pending: VecDeque::new(),
            sent: Vec::new(),
            closed: false,
        }
    }

    /// Replaces the script used by future runs, as if the story was edited.
    pub fn set_script(&mut self, script: StoryScript) {
        self.script = script;
    }

    /// Diagnostics reported by every future compile, before the story starts.
    /// Any `ERROR` entry aborts the run with an unexpected exit.
    pub fn set_compile_diagnostics(&mut self, diagnostics: Vec<Diagnostic>) {
        self.compile_diagnostics = diagnostics;
    }

    /// Makes every further request fail with [`ChannelError::Closed`].
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Takes all queued interpreter output in production order.
    pub fn drain(&mut self) -> Vec<Inbound> {
        self.pending.drain(..).collect()
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Requests received so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> &[Outbound] {
        &self.sent
    }

    /// Number of `run` requests received so far.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.sent
            .iter()
            .filter(|message| matches!(message, Outbound::Run { .. }))
            .count()
    }

    fn emit(&mut self, session_id: SessionId, event: InterpreterEvent) {
        self.pending.push_back(Inbound::new(session_id, event));
    }

    fn start(&mut self, session_id: SessionId, content: &str) {
        let mut diagnostics = self.compile_diagnostics.clone();
        diagnostics.extend(todo_markers(content));

        let failed = diagnostics
            .iter()
            .any(|diagnostic| diagnostic.kind == DiagnosticKind::Error);
        for diagnostic in diagnostics {
            self.emit(session_id, InterpreterEvent::DiagnosticProduced { diagnostic });
        }

        if failed {
            self.emit(session_id, InterpreterEvent::UnexpectedExit);
            return;
        }

        self.enter(session_id, 0);
    }

    fn enter(&mut self, session_id: SessionId, index: usize) {
        let Some(passage) = self.script.passages.get(index).cloned() else {
            self.positions.remove(&session_id);
            self.emit(
                session_id,
                InterpreterEvent::DiagnosticProduced {
                    diagnostic: Diagnostic::new(
                        DiagnosticKind::RuntimeError,
                        1,
                        format!("Missing passage {index}"),
                    ),
                },
            );
            self.emit(session_id, InterpreterEvent::UnexpectedExit);
            return;
        };

        for text in passage.text {
            self.emit(session_id, InterpreterEvent::TextProduced { text });
        }
        for diagnostic in passage.diagnostics {
            self.emit(session_id, InterpreterEvent::DiagnosticProduced { diagnostic });
        }

        if passage.choices.is_empty() {
            self.positions.remove(&session_id);
            let ending = match passage.ending {
                Ending::Complete => InterpreterEvent::StoryCompleted,
                Ending::Crash => InterpreterEvent::UnexpectedExit,
            };
            self.emit(session_id, ending);
            return;
        }

        self.positions.insert(session_id, index);
        for (offset, choice) in passage.choices.iter().enumerate() {
            self.emit(
                session_id,
                InterpreterEvent::ChoiceProduced {
                    choice: Choice::new(offset + 1, choice.text.clone()),
                },
            );
        }
        self.emit(session_id, InterpreterEvent::InputRequired);
    }

    fn continue_with(&mut self, session_id: SessionId, choice_number: usize) {
        let Some(&index) = self.positions.get(&session_id) else {
            return;
        };

        let target = choice_number
            .checked_sub(1)
            .and_then(|offset| {
                self.script
                    .passages
                    .get(index)
                    .and_then(|passage| passage.choices.get(offset))
            })
            .map(|choice| choice.target);

        match target {
            Some(target) => self.enter(session_id, target),
            None => {
                self.positions.remove(&session_id);
                self.emit(
                    session_id,
                    InterpreterEvent::DiagnosticProduced {
                        diagnostic: Diagnostic::new(
                            DiagnosticKind::RuntimeError,
                            1,
                            format!("Choice {choice_number} is out of range"),
                        ),
                    },
                );
                self.emit(session_id, InterpreterEvent::UnexpectedExit);
            }
        }
    }
}

impl Default for ScriptedInterpreter {
    fn default() -> Self {
        Self::new(StoryScript::new(vec![
            Passage::new("The lamp gutters as you reach the crossroads.")
                .with_choice("Take the forest path", 1)
                .with_choice("Follow the river", 2),
            Passage::new("Branches close overhead.")
                .with_text("Something watches from the dark.")
                .with_choice("Call out", 3)
                .with_choice("Keep walking", 3),
            Passage::new("The river carries you home."),
            Passage::new("Dawn breaks over the trees."),
        ]))
    }
}

impl InterpreterChannel for ScriptedInterpreter {
    fn send(&mut self, message: Outbound) -> Result<(), ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }

        self.sent.push(message.clone());
        match message {
            Outbound::Run {
                content,
                session_id,
            } => self.start(session_id, &content),
            Outbound::Stop { session_id } => {
                self.positions.remove(&session_id);
                self.emit(session_id, InterpreterEvent::StopAcknowledged);
            }
            Outbound::ContinueWithChoice {
                choice_number,
                session_id,
            } => self.continue_with(session_id, choice_number),
        }

        Ok(())
    }
}

/// Reports every `TODO` comment in `content` as a `TODO` diagnostic.
fn todo_markers(content: &str) -> Vec<Diagnostic> {
    content
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let start = line.find("TODO")?;
            let message = line[start + "TODO".len()..]
                .trim_start_matches(':')
                .trim();
            Some(Diagnostic::new(DiagnosticKind::Todo, index + 1, message))
        })
        .collect()
}
