// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use flowercam::config::Config;
use flowercam::constants::CaptureInterval;
use flowercam::storage;
use flowercam::terminal::{self, TerminalOptions};
use flowercam::{CaptureMode, constants};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "flowercam")]
#[command(about = "Capture flower photos and count them with a remote service")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    /// Counting service base URL (overrides config and FLOWERCAM_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive terminal client (default)
    Terminal {
        /// Manual capture: toggle capturing, then shoot with 'p'
        #[arg(long)]
        manual: bool,

        /// Use an image file as the camera feed
        #[arg(long)]
        source: Option<PathBuf>,
    },

    /// List available cameras
    List,

    /// Capture snapshots on a timer without the UI
    Capture {
        /// Seconds between captures (1, 2, 5 or 10)
        #[arg(short, long, default_value = "5", value_parser = parse_interval)]
        interval: CaptureInterval,

        /// Stop after this many snapshots (default: until Ctrl+C)
        #[arg(short = 'n', long)]
        shots: Option<usize>,

        /// Metadata attached to every snapshot
        #[arg(short, long, default_value = "")]
        metadata: String,

        /// Save snapshots into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Submit every snapshot for counting
        #[arg(short, long)]
        count: bool,

        /// Use an image file as the camera feed
        #[arg(long)]
        source: Option<PathBuf>,
    },

    /// Count the flowers in an image file
    Count {
        /// PNG or JPEG image
        file: PathBuf,
    },

    /// Check that the counting service is reachable
    Ping,
}

fn parse_interval(value: &str) -> Result<CaptureInterval, String> {
    let seconds: u64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))?;
    CaptureInterval::try_from(seconds)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let terminal_mode = matches!(cli.command, None | Some(Commands::Terminal { .. }));
    init_logging(terminal_mode);

    let mut config_error = None;
    let config = Config::load()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable config, using defaults");
            if terminal_mode {
                // Logs go to a file here, so tell the user directly
                eprintln!("{}: {}; using defaults", constants::APP_DIR, e);
            }
            config_error = Some(e.to_string());
            Config::default()
        })
        .with_overrides(Config::env_api_url(), cli.api_url);

    match cli.command {
        None => terminal::run(TerminalOptions {
            mode: CaptureMode::Timed,
            source: None,
            config,
            config_error,
        }),
        Some(Commands::Terminal { manual, source }) => terminal::run(TerminalOptions {
            mode: if manual {
                CaptureMode::Manual
            } else {
                CaptureMode::Timed
            },
            source,
            config,
            config_error,
        }),
        Some(Commands::List) => cli::list_cameras(),
        Some(Commands::Capture {
            interval,
            shots,
            metadata,
            output,
            count,
            source,
        }) => cli::capture(
            &config,
            cli::CaptureArgs {
                interval,
                shots,
                metadata,
                output,
                count,
                source,
            },
        ),
        Some(Commands::Count { file }) => cli::count_file(&config, &file),
        Some(Commands::Ping) => cli::ping(&config),
    }
}

/// Initialize logging
///
/// Set RUST_LOG to control the level, e.g. RUST_LOG=flowercam=debug. The
/// terminal client logs to a file so output does not garble the screen.
fn init_logging(terminal_mode: bool) {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if terminal_mode {
        let path = storage::log_file_path();
        let file = path
            .parent()
            .map(std::fs::create_dir_all)
            .transpose()
            .and_then(|_| OpenOptions::new().create(true).append(true).open(&path));
        match file {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter())
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true)
                    .with_level(true)
                    .init();
                return;
            }
            Err(e) => eprintln!(
                "{}: cannot open log file {}: {}",
                constants::APP_DIR,
                path.display(),
                e
            ),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();
}
