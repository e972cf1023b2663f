use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use keyfall::prompt::{prompt_path, select_port};
use keyfall::ui::{InputListener, TerminalScreen, forward_signals};
use keyfall::{
    Config, Engine, MidirBackend, PlaybackOutcome, PlayerError, Song, open_output,
};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = match Config::discover() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&config) {
        Ok(PlaybackOutcome::Completed) => ExitCode::SUCCESS,
        Ok(PlaybackOutcome::Interrupted) => {
            println!("{}", config.labels.playback_stopped);
            ExitCode::SUCCESS
        }
        Err(e) => {
            match &e {
                PlayerError::Load(_) => eprintln!("{} {e}", config.labels.load_failed),
                PlayerError::NoOutputDevice => eprintln!("{}", config.labels.no_output),
                _ => eprintln!("{e}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<PlaybackOutcome, PlayerError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();

    let path = match std::env::args_os().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => prompt_path(&mut input, &mut stdout, &config.labels)?,
    };
    let song = Song::load(&path)?;

    let backend = MidirBackend::new("keyfall")?;
    let sink = open_output(&backend, |ports| {
        Ok(select_port(&mut input, &mut stdout, ports, &config.labels)?)
    })?;

    let (command_tx, command_rx) = crossbeam::channel::unbounded();
    if let Err(e) = forward_signals(command_tx.clone()) {
        tracing::warn!("Failed to install signal handler: {}", e);
    }
    let screen = TerminalScreen::enter(io::stdout())?;
    let _listener = InputListener::spawn(command_tx);

    let mut engine = Engine::new(&song, config, sink, screen);
    engine.run(&command_rx)
}
