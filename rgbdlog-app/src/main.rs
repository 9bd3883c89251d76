//! RGB-D Log Tool
//!
//! Inspect, play back and export recorded RGB-D logs.
//!
//! Commands:
//! - `info`: calibration and frame counts as JSON
//! - `play`: decode every frame and report progress
//! - `dump`: write each frame as a pair of PNG files

mod commands;

use clap::{Parser, Subcommand};
use commands::LogArgs;
use std::path::PathBuf;

/// rgbdlog - Frame-indexed RGB-D log playback
#[derive(Parser, Debug)]
#[command(name = "rgbdlog")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print calibration and frame counts
    Info {
        #[command(flatten)]
        log: LogArgs,
    },
    /// Decode every frame in order
    Play {
        #[command(flatten)]
        log: LogArgs,

        /// Keep going when a frame fails to decode
        #[arg(long)]
        skip_bad: bool,
    },
    /// Write every frame as `{index:06}_rgb.png` and `{index:06}_depth.png`
    Dump {
        #[command(flatten)]
        log: LogArgs,

        /// Output directory, created if missing
        #[arg(short, long)]
        out: PathBuf,
    },
}

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(&args.log_level);

    let result = match &args.command {
        Command::Info { log } => commands::info(log),
        Command::Play { log, skip_bad } => commands::play(log, *skip_bad),
        Command::Dump { log, out } => commands::dump(log, out),
    };

    if let Err(e) = result {
        eprintln!("rgbdlog error: {}", e);
        std::process::exit(1);
    }
}
