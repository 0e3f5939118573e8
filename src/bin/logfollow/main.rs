// SPDX-License-Identifier: Apache-2.0

mod control;
mod input;

use clap::{Parser, ValueEnum};
use std::process::ExitCode;
use std::thread;
use std::io::BufReader;
use tokio::io::AsyncWriteExt;
use tokio::select;
use tokio::signal::unix::{SignalKind, signal};
use tower::BoxError;
use tracing::metadata::LevelFilter;
use tracing::{debug, error, info, warn};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use logfollow::bounded_channel::{self, BoundedSender, SendError};
use logfollow::follow::{Entry, FollowConfig, FollowEvent, LineEntryParser, LogFollower};
use logfollow::init::args::FollowArgs;
use logfollow::init::config::load_config;

use crate::control::{Control, control_loop};
use crate::input::spawn_line_reader;

const CONTROL_QUEUE_SIZE: usize = 16;
const STDIN_QUEUE_SIZE: usize = 16;

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Follow a log file, printing entries to stdout as JSON lines
    Follow(Box<FollowArgs>),

    /// Return version
    Version,
}

#[derive(Debug, Parser)]
#[command(name = "logfollow")]
#[command(bin_name = "logfollow")]
#[command(version, about, long_about = None)]
#[command(subcommand_required = true)]
struct Arguments {
    #[arg(
        value_enum,
        long,
        global = true,
        env = "LOGFOLLOW_LOG_FORMAT",
        default_value = "text"
    )]
    /// Log format
    log_format: LogFormatArg,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

fn main() -> ExitCode {
    let opt = Arguments::parse();

    match opt.command {
        Some(Commands::Version) => {
            println!("{}", get_version())
        }
        Some(Commands::Follow(args)) => {
            let _guard = match setup_logging(&opt.log_format) {
                Ok(guard) => guard,
                Err(e) => {
                    eprintln!("ERROR: failed to setup logging: {}", e);
                    return ExitCode::from(1);
                }
            };

            let config = match load_config(&args) {
                Ok(config) => config,
                Err(e) => {
                    error!(error = e, "Invalid configuration.");
                    return ExitCode::from(1);
                }
            };

            match run_follow(*args, config) {
                Ok(_) => {}
                Err(e) => {
                    error!(error = e, "Failed to follow log file.");
                    return ExitCode::from(1);
                }
            }
        }
        _ => {
            // it shouldn't be possible to get here since we mark a subcommand as
            // required
            eprintln!("ERROR: Must specify a command");
            return ExitCode::from(2);
        }
    }

    ExitCode::SUCCESS
}

#[tokio::main]
async fn run_follow(args: FollowArgs, config: FollowConfig) -> Result<(), BoxError> {
    let parser = LineEntryParser::from_config(&config)?;
    let (event_tx, mut event_rx) = bounded_channel::bounded(config.event_channel_size);
    let (control_tx, control_rx) = bounded_channel::bounded::<Control>(CONTROL_QUEUE_SIZE);

    let mut follower = LogFollower::new(config, parser, event_tx);
    follower.set_path(&args.file);
    follower.start()?;
    if follower.is_paused() {
        info!("Follower is paused, send 'resume' on stdin to stream entries");
    }

    // Follower calls block while the tail loop is joined, so they run on their
    // own thread and this task keeps draining events meanwhile.
    let controller = thread::Builder::new()
        .name("logfollow-control".to_string())
        .spawn(move || control_loop(follower, control_rx))?;

    // Tokio's stdin reads on the blocking pool, which would keep the runtime
    // alive after a quit until another line arrives.
    let (stdin_tx, mut stdin_rx) = bounded_channel::bounded::<String>(STDIN_QUEUE_SIZE);
    spawn_line_reader(BufReader::new(std::io::stdin()), stdin_tx)?;
    let mut stdin_open = true;
    let mut stdout = tokio::io::stdout();

    let mut sig_term = signal(SignalKind::terminate())?;
    let mut sig_int = signal(SignalKind::interrupt())?;

    loop {
        select! {
            event = event_rx.next() => match event {
                Some(event) => write_event(&mut stdout, event).await?,
                // The follower was dropped by the control thread
                None => break,
            },
            line = stdin_rx.next(), if stdin_open => match line {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => match line.parse::<Control>() {
                    Ok(command) => send_control(&control_tx, command),
                    Err(e) => warn!("{}", e),
                },
                None => stdin_open = false,
            },
            _ = sig_term.recv() => {
                info!("Shutdown signal received.");
                send_control(&control_tx, Control::Quit);
            },
            _ = sig_int.recv() => {
                info!("Interrupt received.");
                send_control(&control_tx, Control::Quit);
            },
        }
    }

    stdout.flush().await?;
    if controller.join().is_err() {
        return Err("control thread panicked".into());
    }

    Ok(())
}

fn send_control(control_tx: &BoundedSender<Control>, command: Control) {
    match control_tx.try_send(command) {
        Ok(()) => {}
        Err(SendError::Full) => warn!("Too many pending commands, dropping command"),
        Err(SendError::Disconnected) => debug!("Control thread has exited, dropping command"),
    }
}

async fn write_event(
    stdout: &mut tokio::io::Stdout,
    event: FollowEvent<Entry>,
) -> Result<(), BoxError> {
    match event {
        FollowEvent::NewEntry(entry) => {
            let mut line = serde_json::to_vec(&entry)?;
            line.push(b'\n');
            stdout.write_all(&line).await?;
        }
        FollowEvent::CycleEndReached(offset) => {
            stdout.flush().await?;
            debug!(offset, "Cycle end reached");
        }
        FollowEvent::FileSizeChanged(size) => debug!(size, "File size changed"),
        FollowEvent::PathChanged(path) => info!(path = ?path, "Following new path"),
        FollowEvent::PausedChanged(paused) => info!(paused, "Pause state changed"),
        FollowEvent::ErrorOccurred { path, message } => {
            error!(path = ?path, "{}", message)
        }
    }
    Ok(())
}

type LoggerGuard = tracing_appender::non_blocking::WorkerGuard;

// Entries own stdout, so logs always go to stderr.
fn setup_logging(log_format: &LogFormatArg) -> Result<LoggerGuard, BoxError> {
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?;

    if *log_format == LogFormatArg::Json {
        let app_name = format!("{}-{}", env!("CARGO_PKG_NAME"), get_version());
        let bunyan_formatting_layer = BunyanFormattingLayer::new(app_name, non_blocking_writer);

        let subscriber = Registry::default()
            .with(filter)
            .with(JsonStorageLayer)
            .with(bunyan_formatting_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        use std::io;
        use std::io::IsTerminal;

        // Skip color codes when not in a terminal
        let use_ansi = io::stderr().is_terminal();

        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking_writer)
            .with_target(false)
            .with_level(true)
            .with_ansi(use_ansi)
            .compact();

        let subscriber = Registry::default().with(filter).with(stderr_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(guard)
}

fn get_version() -> String {
    // Set during CI
    let version_build = option_env!("BUILD_SHORT_SHA").unwrap_or("dev");

    format!("{}-{}", env!("CARGO_PKG_VERSION"), version_build)
}
