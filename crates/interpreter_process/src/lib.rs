//! Child-process transport for the story interpreter.
//!
//! Requests are written to the interpreter's stdin and replies read from its
//! stdout, one JSON object per line. Both directions run on tokio tasks so
//! [`ProcessChannel::send`] never blocks the caller. If stdout closes, the
//! most recently started session receives a synthesized `unexpectedExit` and
//! every later send fails with [`ChannelError::Closed`]. A request that cannot
//! be written gets a synthesized `unexpectedExit` for its own session.

mod config;
mod error;

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use interpreter_protocol::{
    decode_line, encode_line, ChannelError, Inbound, InterpreterChannel, InterpreterEvent,
    Outbound, SessionId,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub use config::{InterpreterCommand, INTERPRETER_ENV_VAR};
pub use error::ProcessError;

/// Cloneable sending half. Safe to hand to the controller as its channel.
#[derive(Debug, Clone)]
pub struct ProcessChannel {
    outbound: UnboundedSender<Outbound>,
    last_run: Arc<AtomicU64>,
    exited: Arc<AtomicBool>,
}

impl InterpreterChannel for ProcessChannel {
    fn send(&mut self, message: Outbound) -> Result<(), ChannelError> {
        if self.exited.load(Ordering::SeqCst) {
            return Err(ChannelError::Closed);
        }

        if let Outbound::Run { session_id, .. } = &message {
            self.last_run.store(*session_id, Ordering::SeqCst);
        }

        self.outbound
            .send(message)
            .map_err(|_| ChannelError::Closed)
    }
}

#[derive(Debug)]
pub struct InterpreterProcess {
    child: Child,
    channel: ProcessChannel,
    writer: JoinHandle<()>,
    reader: JoinHandle<()>,
}

impl InterpreterProcess {
    /// Launches the interpreter. Must be called from within a tokio runtime.
    pub fn spawn(
        command: &InterpreterCommand,
    ) -> Result<(Self, UnboundedReceiver<Inbound>), ProcessError> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::spawn(&command.program, source))?;

        let stdin = child
            .stdin
            .take()
            .ok_or(ProcessError::MissingPipe { stream: "stdin" })?;
        let stdout = child
            .stdout
            .take()
            .ok_or(ProcessError::MissingPipe { stream: "stdout" })?;

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let last_run = Arc::new(AtomicU64::new(0));
        let exited = Arc::new(AtomicBool::new(false));

        let writer = tokio::spawn(write_requests(
            stdin,
            outbound_rx,
            inbound_tx.clone(),
            Arc::clone(&exited),
        ));
        let reader = tokio::spawn(read_replies(
            stdout,
            inbound_tx,
            Arc::clone(&last_run),
            Arc::clone(&exited),
        ));

        debug!(program = %command.program, pid = ?child.id(), "interpreter spawned");

        Ok((
            Self {
                child,
                channel: ProcessChannel {
                    outbound: outbound_tx,
                    last_run,
                    exited,
                },
                writer,
                reader,
            },
            inbound_rx,
        ))
    }

    #[must_use]
    pub fn channel(&self) -> ProcessChannel {
        self.channel.clone()
    }

    /// Kills the interpreter and waits for its output to drain.
    pub async fn shutdown(mut self) {
        if let Err(error) = self.child.kill().await {
            debug!(%error, "interpreter already exited");
        }
        self.writer.abort();
        if let Err(error) = self.reader.await {
            debug!(%error, "interpreter reader did not finish cleanly");
        }
    }
}

async fn write_requests(
    mut stdin: ChildStdin,
    mut requests: UnboundedReceiver<Outbound>,
    replies: UnboundedSender<Inbound>,
    exited: Arc<AtomicBool>,
) {
    while let Some(request) = requests.recv().await {
        let line = match encode_line(&request) {
            Ok(line) => line,
            Err(error) => {
                warn!(%error, "dropping unencodable interpreter request");
                continue;
            }
        };

        let written = async {
            stdin.write_all(line.as_bytes()).await?;
            stdin.write_all(b"\n").await?;
            stdin.flush().await
        };
        if let Err(error) = written.await {
            warn!(%error, "interpreter stdin closed");
            exited.store(true, Ordering::SeqCst);
            requests.close();
            report_lost(&replies, &request);
            while let Some(request) = requests.recv().await {
                report_lost(&replies, &request);
            }
            return;
        }
    }
}

/// Ends the session of a request that never reached the interpreter.
fn report_lost(replies: &UnboundedSender<Inbound>, request: &Outbound) {
    if let Outbound::Stop { .. } = request {
        return;
    }

    let session_id = request.session_id();
    debug!(session_id, "interpreter request lost");
    if replies
        .send(Inbound::new(session_id, InterpreterEvent::UnexpectedExit))
        .is_err()
    {
        debug!(session_id, "reply stream closed before exit could be reported");
    }
}

async fn read_replies(
    stdout: ChildStdout,
    replies: UnboundedSender<Inbound>,
    last_run: Arc<AtomicU64>,
    exited: Arc<AtomicBool>,
) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match decode_line::<Inbound>(&line) {
                    Ok(reply) => {
                        if replies.send(reply).is_err() {
                            break;
                        }
                    }
                    Err(error) => warn!(%error, "skipping malformed interpreter output"),
                }
            }
            Ok(None) => break,
            Err(error) => {
                warn!(%error, "failed to read interpreter stdout");
                break;
            }
        }
    }

    exited.store(true, Ordering::SeqCst);

    let session_id: SessionId = last_run.load(Ordering::SeqCst);
    if session_id > 0 {
        debug!(session_id, "interpreter output ended");
        if replies
            .send(Inbound::new(session_id, InterpreterEvent::UnexpectedExit))
            .is_err()
        {
            debug!(session_id, "reply stream closed before exit could be reported");
        }
    }
}
