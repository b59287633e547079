mod support;

use std::time::{Duration, Instant};

use interpreter_mock::ScriptedInterpreter;
use ink_play::{App, Command, PlayConfig};
use pretty_assertions::assert_eq;
use support::{pump_app, HostSpy};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Ticks every `step` until `until`, returning the offsets at which a session started.
fn run_ticks(app: &mut App, host: &mut HostSpy, start: Instant, step: u64, until: u64) -> Vec<u64> {
    let mut fired = Vec::new();
    let mut offset = step;
    while offset <= until {
        if app.on_tick(start + ms(offset), host) {
            fired.push(offset);
            pump_app(app, host);
        }
        offset += step;
    }
    fired
}

#[test]
fn burst_of_ten_edits_compiles_once_after_quiet_period() {
    let start = Instant::now();
    let mut app = App::new(PlayConfig::default(), start);
    let mut host = HostSpy::new(ScriptedInterpreter::default());

    for edit in 0..10 {
        app.on_content_modified(start + ms(edit * 10));
        assert!(!app.on_tick(start + ms(edit * 10 + 5), &mut host));
    }

    let fired = run_ticks(&mut app, &mut host, start, 10, 3000);

    assert_eq!(fired, vec![590]);
    assert_eq!(host.interpreter.run_count(), 1);
}

#[test]
fn default_polling_interval_picks_up_the_burst_on_a_later_tick() {
    let start = Instant::now();
    let config = PlayConfig::default();
    let poll = config.debounce.poll_interval.as_millis() as u64;
    let mut app = App::new(config, start);
    let mut host = HostSpy::new(ScriptedInterpreter::default());

    for edit in 0..10 {
        app.on_content_modified(start + ms(edit * 10));
    }

    assert_eq!(run_ticks(&mut app, &mut host, start, poll, 3000), vec![750]);
    assert_eq!(host.interpreter.run_count(), 1);
}

#[test]
fn untouched_document_compiles_once_on_load() {
    let start = Instant::now();
    let mut app = App::new(PlayConfig::default(), start);
    let mut host = HostSpy::new(ScriptedInterpreter::default());

    assert_eq!(run_ticks(&mut app, &mut host, start, 250, 5000), vec![1000]);
}

#[test]
fn custom_idle_threshold_is_honoured() {
    let start = Instant::now();
    let config = PlayConfig::default()
        .with_idle_threshold(ms(200))
        .with_startup_delay(ms(10_000));
    let mut app = App::new(config, start);
    let mut host = HostSpy::new(ScriptedInterpreter::default());

    app.on_content_modified(start);

    assert_eq!(run_ticks(&mut app, &mut host, start, 50, 1000), vec![200]);
}

#[test]
fn toolbar_restart_absorbs_pending_edits() {
    let start = Instant::now();
    let mut app = App::new(PlayConfig::default(), start);
    let mut host = HostSpy::new(ScriptedInterpreter::default());

    app.on_content_modified(start);
    app.on_command(Command::Rewind, &mut host)
        .expect("rewind never fails");
    pump_app(&mut app, &mut host);

    assert!(!app.debouncer().is_pending());
    assert!(run_ticks(&mut app, &mut host, start, 250, 3000).is_empty());
    assert_eq!(host.interpreter.run_count(), 1);
}
