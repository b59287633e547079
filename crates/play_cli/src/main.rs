use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ink_play::{init_logging, App, PlayConfig};
use play_cli::backends::backend_from_env;
use play_cli::host::TerminalHost;
use play_cli::runtime::{run, Player};
use play_cli::watch::FileWatcher;
use signal_hook::consts::{SIGINT, SIGTERM};

/// Stdin is read on a blocking thread that cannot be cancelled.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

fn main() -> io::Result<()> {
    let path = std::env::args_os().nth(1).ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "usage: ink-play <story.ink>")
    })?;

    let config = PlayConfig::from_env().map_err(io::Error::other)?;
    init_logging(&config.log).map_err(io::Error::other)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&interrupted))?;
    }

    let (watcher, content) = FileWatcher::open(path)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        let handle = backend_from_env().map_err(io::Error::other)?;
        let poll_interval = config.debounce.poll_interval;

        let app = App::new(config, Instant::now());
        let host = TerminalHost::new(io::stdout(), handle.backend, content);
        let mut player = Player::new(app, host, watcher);

        let outcome = run(&mut player, handle.replies, poll_interval, interrupted).await;
        if let Some(process) = handle.process {
            process.shutdown().await;
        }
        outcome
    });

    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}
