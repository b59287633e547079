use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ink_play::{App, Command};
use interpreter_protocol::{Inbound, InterpreterChannel, Outbound};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::commands::{parse_input, PlayerInput, HELP_TEXT};
use crate::host::TerminalHost;
use crate::watch::FileWatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Glues the session controller to a terminal host and a watched story file.
pub struct Player<W: Write> {
    app: App,
    host: TerminalHost<W>,
    watcher: FileWatcher,
}

impl<W: Write> Player<W> {
    pub fn new(app: App, host: TerminalHost<W>, watcher: FileWatcher) -> Self {
        Self { app, host, watcher }
    }

    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }

    #[must_use]
    pub fn host(&self) -> &TerminalHost<W> {
        &self.host
    }

    pub fn on_tick(&mut self, now: Instant) -> io::Result<()> {
        if let Some(content) = self.watcher.poll()? {
            debug!(path = %self.watcher.path().display(), "story modified");
            self.host.set_content(content);
            self.app.on_content_modified(now);
        }

        self.app.on_tick(now, &mut self.host);
        self.pump_ready();
        Ok(())
    }

    pub fn on_reply(&mut self, reply: Inbound) {
        self.app.on_interpreter_message(reply, &mut self.host);
        self.pump_ready();
    }

    pub fn on_input(&mut self, line: &str) -> Flow {
        let Some(input) = parse_input(line) else {
            return Flow::Continue;
        };

        let command = match input {
            PlayerInput::Choose(choice_number) => Command::SelectChoice {
                session_id: self.app.controller.current_session(),
                choice_number,
            },
            PlayerInput::Rewind => Command::Rewind,
            PlayerInput::Back => Command::StepBack,
            PlayerInput::NextIssue => Command::NextIssue,
            PlayerInput::Line(line) => Command::JumpToLine { line },
            PlayerInput::Issues => {
                self.host.print_issues();
                return Flow::Continue;
            }
            PlayerInput::Help => {
                self.host.print(format_args!("  {HELP_TEXT}\n"));
                return Flow::Continue;
            }
            PlayerInput::Quit => return Flow::Quit,
            PlayerInput::Unknown(input) => {
                self.host
                    .print(format_args!("  Unknown input '{input}'. Type :help\n"));
                return Flow::Continue;
            }
        };

        if let Err(error) = self.app.on_command(command, &mut self.host) {
            self.host.print(format_args!("  ({error})\n"));
        }
        self.pump_ready();
        Flow::Continue
    }

    /// Asks the interpreter to abandon the current session.
    pub fn stop(&mut self) {
        let session_id = self.app.controller.current_session();
        if session_id == 0 {
            return;
        }

        if let Err(error) = self.host.send(Outbound::Stop { session_id }) {
            debug!(session_id, %error, "interpreter gone before stop");
        }
    }

    /// Dispatches replies the backend produced synchronously, until none remain.
    pub fn pump_ready(&mut self) {
        loop {
            let ready = self.host.backend.take_ready();
            if ready.is_empty() {
                return;
            }
            for reply in ready {
                self.app.on_interpreter_message(reply, &mut self.host);
            }
        }
    }
}

pub async fn run<W: Write>(
    player: &mut Player<W>,
    mut replies: Option<UnboundedReceiver<Inbound>>,
    poll_interval: Duration,
    interrupted: Arc<AtomicBool>,
) -> io::Result<()> {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    player.host.print(format_args!("  {HELP_TEXT}\n"));

    loop {
        if interrupted.load(Ordering::SeqCst) {
            info!("interrupted");
            break;
        }

        let mut quit = false;
        let mut replies_closed = false;

        tokio::select! {
            _ = ticker.tick() => {
                if let Err(error) = player.on_tick(Instant::now()) {
                    warn!(%error, "failed to read story file");
                }
            }
            line = input.next_line(), if input_open => {
                match line? {
                    Some(line) => quit = player.on_input(&line) == Flow::Quit,
                    None => {
                        debug!("stdin closed");
                        input_open = false;
                    }
                }
            }
            reply = next_reply(&mut replies) => {
                match reply {
                    Some(reply) => player.on_reply(reply),
                    None => replies_closed = true,
                }
            }
        }

        if replies_closed {
            debug!("interpreter reply stream ended");
            replies = None;
        }
        if quit {
            break;
        }
    }

    player.stop();
    Ok(())
}

async fn next_reply(replies: &mut Option<UnboundedReceiver<Inbound>>) -> Option<Inbound> {
    match replies {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}
