//! Compile-and-play session control for an interactive story editor.
//!
//! Edits are debounced into compile requests against an external story
//! interpreter. Each compile is a new session; interpreter events from any
//! session other than the current one are discarded. Choices the user made
//! are replayed against every recompile so play resumes where it left off,
//! and diagnostics are projected onto the editor and an issue panel.
//!
//! # Public API Overview
//! - [`App`] wires the [`ChangeDebouncer`] to the [`SessionController`] and
//!   turns host [`Command`]s into controller transitions.
//! - Host surfaces are abstracted by the traits in [`host`]; implement all of
//!   them plus [`interpreter_protocol::InterpreterChannel`] to get [`HostOps`].
//! - [`navigation`] resolves divert targets for jump-to-definition.

pub mod app;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod host;
pub mod issues;
pub mod logging;
pub mod navigation;
pub mod projector;
pub mod replay;

pub use crate::app::{App, Command};
pub use crate::config::{DebounceConfig, LogConfig, PlayConfig};
pub use crate::controller::{
    ChoicePoint, DispatchOutcome, SessionController, SessionPhase, SessionState,
};
pub use crate::debounce::ChangeDebouncer;
pub use crate::error::{ConfigError, LoggingError, SelectionError};
pub use crate::host::{
    Annotation, ChoicePrompt, DecorationStyle, EditorSurface, HostOps, IssuePanel, LineRange,
    MarkerId, TerminationKind, TranscriptSurface,
};
pub use crate::issues::{IssueCounts, IssueStore};
pub use crate::logging::init_logging;
pub use crate::navigation::{DivertJump, PointerStyle, Position, Token};
pub use crate::projector::{DiagnosticsProjector, IssueRow, IssueSummary, NO_ISSUES_MESSAGE};
pub use crate::replay::{ChoiceReplayLog, ReplayCursor};
