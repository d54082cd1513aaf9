//! # caisson — minimal container launcher
//!
//! Launches a single command inside a fresh mount + PID namespace on an
//! overlay filesystem layered over a read-only image.

mod commands;

use std::process::ExitCode;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<ExitCode> {
    // Diagnostics go to stderr; stdout belongs to the launched command.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    commands::execute(cli)
}
