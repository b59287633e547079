#![cfg(unix)]

use std::time::Duration;

use assert_matches::assert_matches;
use interpreter_process::{InterpreterCommand, InterpreterProcess, ProcessError};
use interpreter_protocol::{ChannelError, Inbound, InterpreterChannel, InterpreterEvent, Outbound};
use pretty_assertions::assert_eq;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

/// A stand-in interpreter: waits for one request line, prints `replies`, exits.
fn echo_interpreter(replies: &[&str]) -> InterpreterCommand {
    let mut command = InterpreterCommand::new("sh")
        .with_arg("-c")
        .with_arg(r#"read request; for reply in "$@"; do printf '%s\n' "$reply"; done"#)
        .with_arg("sh");
    for reply in replies {
        command = command.with_arg(*reply);
    }
    command
}

async fn next(replies: &mut UnboundedReceiver<Inbound>) -> Option<Inbound> {
    timeout(Duration::from_secs(5), replies.recv())
        .await
        .expect("interpreter replied in time")
}

#[tokio::test(flavor = "current_thread")]
async fn replies_are_decoded_and_eof_synthesizes_unexpected_exit() {
    let command = echo_interpreter(&[
        r#"{"sessionId":3,"event":{"kind":"textProduced","text":"Once upon a time"}}"#,
        r#"{"sessionId":3,"event":{"kind":"inputRequired"}}"#,
    ]);
    let (process, mut replies) = InterpreterProcess::spawn(&command).expect("sh spawns");
    let mut channel = process.channel();

    channel
        .send(Outbound::Run {
            content: "Once upon a time".to_string(),
            session_id: 3,
        })
        .expect("request queued");

    assert_eq!(
        next(&mut replies).await,
        Some(Inbound::new(
            3,
            InterpreterEvent::TextProduced {
                text: "Once upon a time".to_string(),
            },
        ))
    );
    assert_eq!(
        next(&mut replies).await,
        Some(Inbound::new(3, InterpreterEvent::InputRequired))
    );
    assert_eq!(
        next(&mut replies).await,
        Some(Inbound::new(3, InterpreterEvent::UnexpectedExit))
    );

    process.shutdown().await;
}

#[tokio::test(flavor = "current_thread")]
async fn malformed_lines_are_skipped() {
    let command = echo_interpreter(&[
        "compiler banner, not json",
        r#"{"sessionId":1,"event":{"kind":"storyCompleted"}}"#,
    ]);
    let (process, mut replies) = InterpreterProcess::spawn(&command).expect("sh spawns");
    let mut channel = process.channel();

    channel
        .send(Outbound::Run {
            content: String::new(),
            session_id: 1,
        })
        .expect("request queued");

    assert_eq!(
        next(&mut replies).await,
        Some(Inbound::new(1, InterpreterEvent::StoryCompleted))
    );
    assert_eq!(
        next(&mut replies).await,
        Some(Inbound::new(1, InterpreterEvent::UnexpectedExit))
    );

    process.shutdown().await;
}

#[tokio::test(flavor = "current_thread")]
async fn requests_after_exit_report_a_closed_channel() {
    let (process, mut replies) =
        InterpreterProcess::spawn(&echo_interpreter(&[])).expect("sh spawns");
    let mut channel = process.channel();

    channel
        .send(Outbound::Run {
            content: String::new(),
            session_id: 1,
        })
        .expect("request queued");
    assert_eq!(
        next(&mut replies).await,
        Some(Inbound::new(1, InterpreterEvent::UnexpectedExit))
    );

    assert_matches!(
        channel.send(Outbound::Stop { session_id: 1 }),
        Err(ChannelError::Closed)
    );
    assert_matches!(
        channel.send(Outbound::Run {
            content: String::new(),
            session_id: 2,
        }),
        Err(ChannelError::Closed)
    );

    process.shutdown().await;
}

#[tokio::test(flavor = "current_thread")]
async fn unwritable_request_ends_its_session() {
    let command = InterpreterCommand::new("sh")
        .with_arg("-c")
        .with_arg(r#"exec 0<&-; printf '%s\n' "$1"; exec sleep 5"#)
        .with_arg("sh")
        .with_arg(r#"{"sessionId":1,"event":{"kind":"stopAcknowledged"}}"#);
    let (process, mut replies) = InterpreterProcess::spawn(&command).expect("sh spawns");
    let mut channel = process.channel();

    assert_eq!(
        next(&mut replies).await,
        Some(Inbound::new(1, InterpreterEvent::StopAcknowledged))
    );

    channel
        .send(Outbound::Run {
            content: String::new(),
            session_id: 2,
        })
        .expect("request queued before the write fails");
    assert_eq!(
        next(&mut replies).await,
        Some(Inbound::new(2, InterpreterEvent::UnexpectedExit))
    );
    assert_matches!(
        channel.send(Outbound::Run {
            content: String::new(),
            session_id: 3,
        }),
        Err(ChannelError::Closed)
    );

    process.shutdown().await;
}

#[tokio::test(flavor = "current_thread")]
async fn missing_program_is_a_spawn_error() {
    let command = InterpreterCommand::new("definitely-not-an-ink-interpreter");

    let error = InterpreterProcess::spawn(&command).expect_err("program does not exist");

    assert_matches!(
        error,
        ProcessError::Spawn { ref program, .. } if program == "definitely-not-an-ink-interpreter"
    );
}
