//! Parent-side launch orchestration.
//!
//! Prepares the host scratch area, takes the per-identifier launch lock,
//! clones the isolated child into fresh namespaces, and blocks until it
//! exits. The child's outcome is reflected in the returned exit code.

use std::io;
use std::path::{Path, PathBuf};

use caisson_common::config::LauncherConfig;
use caisson_common::constants::LOCK_FILE_NAME;
use caisson_common::error::{CaissonError, Result};
use caisson_common::types::ContainerId;
use caisson_core::filesystem::provision::ensure_dir_tree;

use crate::container::Container;

/// Exclusive hold on a container identifier for the supervisor lifetime.
///
/// Backed by an exclusively created marker file under the identifier's
/// scratch subtree; removed on drop, after the child has been reaped.
/// Concurrent launches sharing an identifier are rejected instead of
/// racing on the same staging paths.
#[derive(Debug)]
pub struct LaunchLock {
    path: PathBuf,
}

impl LaunchLock {
    /// Acquires the lock for `id`, creating the scratch subtree if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`CaissonError::Busy`] if another launch holds the lock,
    /// or an I/O error if the subtree or marker cannot be created.
    pub fn acquire(state_dir: &Path, id: &ContainerId) -> Result<Self> {
        ensure_dir_tree(state_dir)?;
        let path = state_dir.join(LOCK_FILE_NAME);
        match std::fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {
                tracing::debug!(id = %id, lock = %path.display(), "launch lock acquired");
                Ok(Self { path })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(CaissonError::Busy { id: id.to_string() })
            }
            Err(e) => Err(CaissonError::Io { path, source: e }),
        }
    }
}

impl Drop for LaunchLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Ensures the scratch root exists, backing it with a dedicated tmpfs
/// when first created.
///
/// The tmpfs keeps overlay upper/work layers working even when the host
/// root filesystem cannot host them (NFS, or an overlay itself, as when
/// running inside another container). An already existing scratch root
/// is used as-is, whatever backs it.
///
/// # Errors
///
/// Returns an error if the directory or the tmpfs mount cannot be
/// created.
pub fn prepare_scratch(scratch_root: &Path) -> Result<()> {
    if scratch_root.is_dir() {
        return Ok(());
    }
    ensure_dir_tree(scratch_root)?;
    mount_scratch_tmpfs(scratch_root)?;
    tracing::info!(scratch = %scratch_root.display(), "scratch area prepared");
    Ok(())
}

#[cfg(target_os = "linux")]
fn mount_scratch_tmpfs(scratch_root: &Path) -> Result<()> {
    use nix::mount::{MsFlags, mount};

    mount(
        Some("tmpfs"),
        scratch_root,
        Some("tmpfs"),
        MsFlags::empty(),
        None::<&str>,
    )
    .map_err(|e| CaissonError::Mount {
        target: scratch_root.to_path_buf(),
        message: format!("tmpfs mount failed: {e}"),
    })
}

#[cfg(not(target_os = "linux"))]
fn mount_scratch_tmpfs(_scratch_root: &Path) -> Result<()> {
    Err(CaissonError::Unsupported {
        message: "Linux required for scratch tmpfs".into(),
    })
}

/// Spawns and reaps a single isolated container launch.
#[derive(Debug, Clone)]
pub struct Supervisor {
    config: LauncherConfig,
}

impl Supervisor {
    /// Creates a supervisor with the given launch configuration.
    #[must_use]
    pub fn new(config: LauncherConfig) -> Self {
        Self { config }
    }

    /// Launches the container and blocks until its init process exits.
    ///
    /// Returns the exit code the supervisor should itself exit with:
    /// the child's own code for a normal exit, or `128 + signo` when the
    /// child was killed by a signal.
    ///
    /// # Errors
    ///
    /// Returns an error if scratch preparation, the launch lock, the
    /// clone, or the wait fails. Failures inside the child after a
    /// successful spawn surface only through the returned exit code and
    /// the child's own diagnostics.
    #[cfg(target_os = "linux")]
    pub fn launch(&self, container: &Container) -> Result<i32> {
        use caisson_core::namespace::NamespaceConfig;
        use nix::sys::wait::{WaitStatus, waitpid};

        use crate::launcher;

        prepare_scratch(&self.config.scratch_root)?;
        let state_dir = self.config.scratch_root.join(container.id.as_str());
        let _lock = LaunchLock::acquire(&state_dir, &container.id)?;

        let mut stack = vec![0u8; self.config.child_stack_bytes];
        let flags = NamespaceConfig::default().clone_flags();

        // SAFETY: the callback only touches data borrowed from this
        // frame, and the parent blocks in waitpid below until the child
        // is gone, so the stack and descriptor outlive the child.
        let pid = unsafe {
            nix::sched::clone(
                Box::new(|| launcher::container_main(container, &self.config) as isize),
                &mut stack,
                flags,
                Some(libc::SIGCHLD),
            )
        }
        .map_err(|e| CaissonError::Spawn { message: format!("clone failed: {e}") })?;

        tracing::info!(id = %container.id, pid = %pid, "container init spawned");

        match waitpid(pid, None)
            .map_err(|e| CaissonError::Spawn { message: format!("waitpid failed: {e}") })?
        {
            WaitStatus::Exited(_, code) => {
                tracing::info!(id = %container.id, code, "container exited");
                Ok(code)
            }
            WaitStatus::Signaled(_, signal, _) => {
                tracing::warn!(id = %container.id, signal = %signal, "container killed by signal");
                Ok(128 + signal as i32)
            }
            other => Err(CaissonError::Spawn {
                message: format!("unexpected wait status: {other:?}"),
            }),
        }
    }

    /// Stub for non-Linux platforms.
    ///
    /// # Errors
    ///
    /// Always returns an error — namespace'd launches require Linux.
    #[cfg(not(target_os = "linux"))]
    pub fn launch(&self, _container: &Container) -> Result<i32> {
        Err(CaissonError::Unsupported {
            message: "Linux required for container launches".into(),
        })
    }
}
