//! `caisson run` — launch a command in an isolated container filesystem.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Args;

use caisson_common::config::LauncherConfig;
use caisson_common::types::{ContainerId, ImageName};
use caisson_runtime::container::Container;
use caisson_runtime::supervisor::Supervisor;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Container identifier; becomes a path segment under the scratch
    /// root.
    pub id: String,

    /// Image name, resolved to `images/<IMAGE>` under the current
    /// directory as the read-only base layer.
    pub image: String,

    /// Command and arguments executed as the container's init process.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Executes the `run` command.
///
/// # Errors
///
/// Returns an error if the descriptor is invalid or the launch fails
/// before the child could be spawned; child failures surface through
/// the exit code instead.
pub fn execute(args: RunArgs, scratch_root: PathBuf) -> anyhow::Result<ExitCode> {
    let id = ContainerId::new(args.id)?;
    let image = ImageName::new(args.image)?;
    let working_dir =
        std::env::current_dir().context("resolving the current working directory")?;
    let container = Container::new(id, image, args.command, working_dir)?;

    let config = LauncherConfig { scratch_root, ..LauncherConfig::default() };
    tracing::debug!(id = %container.id, image = %container.image, "launch requested");

    let code = Supervisor::new(config).launch(&container)?;
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(u8::MAX)))
}
