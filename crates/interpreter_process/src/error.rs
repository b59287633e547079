use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("{var} is not set; expected the interpreter program and its arguments")]
    MissingCommand { var: &'static str },

    #[error("I/O error while spawning interpreter {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("interpreter {stream} was not piped")]
    MissingPipe { stream: &'static str },
}

impl ProcessError {
    #[must_use]
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }
}
