//! Diary Coach CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use diary_coach::cli::Cli;
use diary_coach::commands;

fn main() {
    // Must run before parsing so clap sees COACH_* values from the files.
    if let Err(e) = coach_core::load_env_files() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let cli = Cli::parse();

    // stdout carries the conversation echo; logs go to stderr.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = commands::execute(cli.into_command()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
