//! Interpreter backend selection.
//!
//! `INK_PLAY_BACKEND=scripted` (the default) plays a built-in demo story
//! in-process. `INK_PLAY_BACKEND=process` launches the program named by
//! `INK_PLAY_INTERPRETER` and talks to it over JSON lines.

use interpreter_mock::{ScriptedInterpreter, SCRIPTED_INTERPRETER_ID};
use interpreter_process::{InterpreterCommand, InterpreterProcess, ProcessChannel};
use interpreter_protocol::{ChannelError, Inbound, InterpreterChannel, Outbound};
use tokio::sync::mpsc::UnboundedReceiver;

pub const BACKEND_ENV_VAR: &str = "INK_PLAY_BACKEND";
pub const PROCESS_BACKEND_ID: &str = "process";
pub const DEFAULT_BACKEND_ID: &str = SCRIPTED_INTERPRETER_ID;

#[derive(Debug)]
pub enum Backend {
    Scripted(ScriptedInterpreter),
    Process(ProcessChannel),
}

impl Backend {
    /// Replies that are already available without awaiting.
    pub fn take_ready(&mut self) -> Vec<Inbound> {
        match self {
            Self::Scripted(interpreter) => interpreter.drain(),
            Self::Process(_) => Vec::new(),
        }
    }
}

impl InterpreterChannel for Backend {
    fn send(&mut self, message: Outbound) -> Result<(), ChannelError> {
        match self {
            Self::Scripted(interpreter) => interpreter.send(message),
            Self::Process(channel) => channel.send(message),
        }
    }
}

/// A selected backend plus whatever must outlive the play loop.
#[derive(Debug)]
pub struct BackendHandle {
    pub backend: Backend,
    pub replies: Option<UnboundedReceiver<Inbound>>,
    pub process: Option<InterpreterProcess>,
}

pub fn backend_from_env() -> Result<BackendHandle, String> {
    let backend_id = std::env::var(BACKEND_ENV_VAR)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    backend_for_id(backend_id.as_deref().unwrap_or(DEFAULT_BACKEND_ID))
}

/// Resolves a backend id. The process backend must be resolved inside a
/// tokio runtime.
pub fn backend_for_id(backend_id: &str) -> Result<BackendHandle, String> {
    match backend_id {
        SCRIPTED_INTERPRETER_ID => Ok(BackendHandle {
            backend: Backend::Scripted(ScriptedInterpreter::default()),
            replies: None,
            process: None,
        }),
        PROCESS_BACKEND_ID => {
            let command = InterpreterCommand::from_env().map_err(|error| error.to_string())?;
            let (process, replies) =
                InterpreterProcess::spawn(&command).map_err(|error| error.to_string())?;
            Ok(BackendHandle {
                backend: Backend::Process(process.channel()),
                replies: Some(replies),
                process: Some(process),
            })
        }
        unknown => Err(format!(
            "Unsupported interpreter backend '{unknown}'. Available backends: {SCRIPTED_INTERPRETER_ID}, {PROCESS_BACKEND_ID}"
        )),
    }
}
