//! Child-side container bootstrap.
//!
//! Runs as PID 1 of the fresh namespaces: severs mount propagation,
//! stages the overlay filesystem, switches root into the merged view,
//! and replaces itself with the requested command. Every step is a hard
//! dependency on the previous one succeeding.

use std::convert::Infallible;
use std::ffi::CString;

use caisson_common::config::LauncherConfig;
use caisson_common::error::{CaissonError, Result};
use caisson_core::filesystem::overlayfs::{self, OverlayConfig};
use caisson_core::filesystem::pivot_root::switch_root;
use caisson_core::filesystem::provision::{ensure_dir_tree, reset_dir};
use caisson_core::namespace::mount::make_mounts_private;

use crate::container::{Container, ContainerPaths};

/// Seam over the overlay mount syscall, so the staging sequence can be
/// exercised without privileges.
pub trait LayerMounter {
    /// Mounts the overlay described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the mount cannot be performed.
    fn mount(&self, config: &OverlayConfig) -> Result<()>;
}

/// Production mounter issuing the real `mount(2)` syscall.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyscallMounter;

impl LayerMounter for SyscallMounter {
    fn mount(&self, config: &OverlayConfig) -> Result<()> {
        overlayfs::mount_overlay(config)
    }
}

/// Scoped release of host-side resources acquired during staging.
///
/// Each acquisition registers its release action; on any exit path where
/// the guard is still armed, the actions run in reverse acquisition
/// order. Release failures are ignored — the guard runs on an already
/// failing path and must not mask the original error.
#[derive(Default)]
pub struct Rollback {
    actions: Vec<Box<dyn FnOnce()>>,
}

impl Rollback {
    /// Creates an empty, armed guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a release action for an acquired resource.
    pub fn push(&mut self, action: impl FnOnce() + 'static) {
        self.actions.push(Box::new(action));
    }

    /// Disarms the guard; registered actions will not run.
    pub fn disarm(&mut self) {
        self.actions.clear();
    }
}

impl Drop for Rollback {
    fn drop(&mut self) {
        while let Some(action) = self.actions.pop() {
            action();
        }
    }
}

/// Provisions the overlay directory tree and mounts the merged view.
///
/// Upper and merged are created if missing; the work directory is always
/// reset, since stale overlay state in it fails the next mount. Newly
/// created directories and the mount itself register release actions on
/// `rollback`.
///
/// # Errors
///
/// Returns an error on the first provisioning or mount failure; nothing
/// later in the sequence is attempted.
pub fn stage_rootfs(
    paths: &ContainerPaths,
    mounter: &dyn LayerMounter,
    rollback: &mut Rollback,
) -> Result<()> {
    if !paths.upper.exists() {
        let created = paths.upper.clone();
        rollback.push(move || {
            let _ = std::fs::remove_dir_all(&created);
        });
    }
    ensure_dir_tree(&paths.upper)?;

    let created = paths.work.clone();
    rollback.push(move || {
        let _ = std::fs::remove_dir_all(&created);
    });
    reset_dir(&paths.work)?;

    if !paths.merged.exists() {
        let created = paths.merged.clone();
        rollback.push(move || {
            let _ = std::fs::remove_dir_all(&created);
        });
    }
    ensure_dir_tree(&paths.merged)?;

    mounter.mount(&paths.overlay_config())?;
    let mounted = paths.merged.clone();
    rollback.push(move || {
        let _ = overlayfs::unmount_overlay(&mounted);
    });

    tracing::debug!(merged = %paths.merged.display(), "rootfs staged");
    Ok(())
}

/// Replaces the current process image with the given command.
///
/// The first element is resolved via the search path; the full vector is
/// passed through unchanged. Standard descriptors are inherited.
///
/// # Errors
///
/// Returns an error if an argument contains an interior NUL or the exec
/// syscall fails; on success this never returns.
pub fn exec_command(command: &[String]) -> Result<Infallible> {
    let program = command.first().ok_or_else(|| CaissonError::InvalidDescriptor {
        message: "command must not be empty".into(),
    })?;
    let argv = command
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| CaissonError::Exec {
            command: program.clone(),
            message: "argument contains an interior NUL byte".into(),
        })?;

    match nix::unistd::execvp(&argv[0], &argv) {
        Ok(never) => match never {},
        Err(e) => Err(CaissonError::Exec {
            command: program.clone(),
            message: e.to_string(),
        }),
    }
}

/// The full init sequence for the isolated child.
///
/// Namespace privatization, staging, root switch, exec — strictly in
/// that order. The rollback guard is disarmed once the root switch
/// succeeds: past that point the staging paths resolve inside the new
/// root and the host-side entries can no longer be addressed.
///
/// # Errors
///
/// Returns the first failing step's error; on success this never
/// returns.
pub fn container_init(
    container: &Container,
    config: &LauncherConfig,
    mounter: &dyn LayerMounter,
) -> Result<Infallible> {
    make_mounts_private()?;

    let paths = ContainerPaths::derive(container, config);
    let mut rollback = Rollback::new();
    stage_rootfs(&paths, mounter, &mut rollback)?;

    switch_root(&paths.merged)?;
    rollback.disarm();

    tracing::info!(id = %container.id, command = ?container.command, "entering container");
    exec_command(&container.command)
}

/// Process boundary for the cloned child: runs the init sequence and
/// converts any failure into a non-zero exit status with a diagnostic on
/// standard error.
#[allow(clippy::print_stderr)]
pub fn container_main(container: &Container, config: &LauncherConfig) -> i32 {
    match container_init(container, config, &SyscallMounter) {
        Ok(never) => match never {},
        Err(e) => {
            eprintln!("caisson: container {}: {e}", container.id);
            1
        }
    }
}
