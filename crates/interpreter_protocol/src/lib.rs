//! Message contract between the editor-side play controller and an external
//! story interpreter process.
//!
//! The contract is transport-neutral: every message is a plain value that can
//! travel over an in-memory queue or as one JSON object per line. Every
//! interpreter-originated message is tagged with the [`SessionId`] of the
//! session that produced it so the receiving side can discard stale output.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier for one compile-and-run session.
pub type SessionId = u64;

/// Severity class reported by the compiler or the running story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    #[serde(rename = "ERROR")]
    Error,
    #[serde(rename = "RUNTIME ERROR", alias = "RUNTIME_ERROR")]
    RuntimeError,
    #[serde(rename = "WARNING")]
    Warning,
    #[serde(rename = "TODO")]
    Todo,
}

impl DiagnosticKind {
    /// Returns the label used on the wire and in user-facing text.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::RuntimeError => "RUNTIME ERROR",
            Self::Warning => "WARNING",
            Self::Todo => "TODO",
        }
    }
}

/// One compiler or runtime diagnostic. `line_number` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    #[serde(rename = "type")]
    pub kind: DiagnosticKind,
    pub line_number: usize,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(kind: DiagnosticKind, line_number: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line_number,
            message: message.into(),
        }
    }
}

/// One selectable option at a story decision point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub number: usize,
    pub text: String,
}

impl Choice {
    #[must_use]
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// Requests sent from the controller to the interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "message", rename_all = "camelCase")]
pub enum Outbound {
    #[serde(rename_all = "camelCase")]
    Run {
        content: String,
        session_id: SessionId,
    },
    #[serde(rename_all = "camelCase")]
    Stop { session_id: SessionId },
    #[serde(rename_all = "camelCase")]
    ContinueWithChoice {
        choice_number: usize,
        session_id: SessionId,
    },
}

impl Outbound {
    /// Returns the session this request addresses.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        match self {
            Self::Run { session_id, .. }
            | Self::Stop { session_id }
            | Self::ContinueWithChoice { session_id, .. } => *session_id,
        }
    }
}

/// Interpreter output, without its session tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InterpreterEvent {
    TextProduced { text: String },
    DiagnosticProduced { diagnostic: Diagnostic },
    ChoiceProduced { choice: Choice },
    InputRequired,
    StoryCompleted,
    UnexpectedExit,
    StopAcknowledged,
}

impl InterpreterEvent {
    /// Returns true when no further story output is expected for the session.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::StoryCompleted | Self::UnexpectedExit)
    }

    /// Short event name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::TextProduced { .. } => "textProduced",
            Self::DiagnosticProduced { .. } => "diagnosticProduced",
            Self::ChoiceProduced { .. } => "choiceProduced",
            Self::InputRequired => "inputRequired",
            Self::StoryCompleted => "storyCompleted",
            Self::UnexpectedExit => "unexpectedExit",
            Self::StopAcknowledged => "stopAcknowledged",
        }
    }
}

/// Interpreter output tagged with the session that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inbound {
    pub session_id: SessionId,
    pub event: InterpreterEvent,
}

impl Inbound {
    #[must_use]
    pub fn new(session_id: SessionId, event: InterpreterEvent) -> Self {
        Self { session_id, event }
    }
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("interpreter channel is closed")]
    Closed,

    #[error("failed to encode interpreter message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode interpreter line {line:?}: {source}")]
    Decode {
        line: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Fire-and-forget sender half of the interpreter channel.
///
/// Implementations must not block waiting for the interpreter; replies arrive
/// later as independent [`Inbound`] messages.
pub trait InterpreterChannel {
    fn send(&mut self, message: Outbound) -> Result<(), ChannelError>;
}

/// Encodes one message as a single JSON line without the trailing newline.
pub fn encode_line<T: Serialize>(message: &T) -> Result<String, ChannelError> {
    serde_json::to_string(message).map_err(ChannelError::Encode)
}

/// Decodes one JSON line produced by [`encode_line`] or by the interpreter.
pub fn decode_line<T: DeserializeOwned>(line: &str) -> Result<T, ChannelError> {
    serde_json::from_str(line.trim_end()).map_err(|source| ChannelError::Decode {
        line: line.to_string(),
        source,
    })
}
