//! CLI command definitions and dispatch.

pub mod run;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// Caisson — minimal namespace + `OverlayFS` container launcher.
#[derive(Parser, Debug)]
#[command(name = "caisson", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Host scratch directory staging container filesystems.
    #[arg(
        long,
        global = true,
        value_name = "DIR",
        default_value = caisson_common::constants::DEFAULT_SCRATCH_DIR
    )]
    pub scratch_root: std::path::PathBuf,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Launch a command inside an isolated container filesystem.
    Run(run::RunArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Run(args) => run::execute(args, cli.scratch_root),
    }
}
