use std::env;

use crate::error::ProcessError;

pub const INTERPRETER_ENV_VAR: &str = "INK_PLAY_INTERPRETER";

/// Program plus arguments used to launch the story interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl InterpreterCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Splits a whitespace-separated command line. Quoting is not supported.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next()?;
        Some(Self {
            program: program.to_string(),
            args: parts.map(str::to_string).collect(),
        })
    }

    pub fn from_env() -> Result<Self, ProcessError> {
        env::var(INTERPRETER_ENV_VAR)
            .ok()
            .and_then(|value| Self::parse(&value))
            .ok_or(ProcessError::MissingCommand {
                var: INTERPRETER_ENV_VAR,
            })
    }
}
