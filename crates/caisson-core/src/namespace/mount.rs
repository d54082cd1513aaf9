//! Mount namespace isolation.
//!
//! Gives the container its own mount table, enabling private filesystem
//! views that never propagate back to the host.

use caisson_common::error::{CaissonError, Result};

/// Remounts `/` private and recursive in the calling process's namespace.
///
/// On hosts with shared root propagation (systemd default), a fresh mount
/// namespace still shares mount events with the host until this runs.
/// Must be called inside the new namespace before any overlay staging.
///
/// # Errors
///
/// Returns an error if the propagation change syscall fails.
#[cfg(target_os = "linux")]
pub fn make_mounts_private() -> Result<()> {
    use nix::mount::{MsFlags, mount};

    mount(
        None::<&str>,
        "/",
        None::<&str>,
        MsFlags::MS_PRIVATE | MsFlags::MS_REC,
        None::<&str>,
    )
    .map_err(|e| CaissonError::Mount {
        target: "/".into(),
        message: format!("remount / private failed: {e}"),
    })?;

    tracing::debug!("mount propagation severed from host");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — mount namespaces require Linux.
#[cfg(not(target_os = "linux"))]
pub fn make_mounts_private() -> Result<()> {
    Err(CaissonError::Unsupported {
        message: "Linux required for mount namespaces".into(),
    })
}
