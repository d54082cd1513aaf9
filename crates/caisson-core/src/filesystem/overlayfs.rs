//! `OverlayFS` management for layered container filesystems.
//!
//! Stacks a read-only image layer with a writable upper layer into one
//! merged view, capturing writes copy-on-write.

use std::path::{Path, PathBuf};

use caisson_common::error::{CaissonError, Result};

/// Configuration for an `OverlayFS` mount.
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Read-only image layer. Never written to; must pre-exist.
    pub lower_dir: PathBuf,
    /// Writable upper layer directory.
    pub upper_dir: PathBuf,
    /// Work directory required by `OverlayFS`; must share a filesystem
    /// with the upper layer.
    pub work_dir: PathBuf,
    /// Final merged mount point.
    pub merged_dir: PathBuf,
}

impl OverlayConfig {
    /// Renders the `mount(2)` data string for this configuration.
    #[must_use]
    pub fn mount_options(&self) -> String {
        format!(
            "lowerdir={},upperdir={},workdir={}",
            self.lower_dir.display(),
            self.upper_dir.display(),
            self.work_dir.display()
        )
    }
}

/// Mounts an `OverlayFS` with the given configuration.
///
/// The upper, work, and merged directories must already be provisioned.
/// The lower directory is checked up front so a missing image fails with
/// a diagnostic naming the image layer instead of a bare mount errno.
///
/// # Errors
///
/// Returns [`CaissonError::NotFound`] if the lower directory does not
/// exist, or [`CaissonError::Mount`] if the mount syscall fails.
#[cfg(target_os = "linux")]
pub fn mount_overlay(config: &OverlayConfig) -> Result<()> {
    use nix::mount::{MsFlags, mount};

    if !config.lower_dir.is_dir() {
        return Err(CaissonError::NotFound {
            kind: "image layer",
            id: config.lower_dir.display().to_string(),
        });
    }

    let opts = config.mount_options();
    mount(
        Some("overlay"),
        &config.merged_dir,
        Some("overlay"),
        MsFlags::MS_RELATIME,
        Some(opts.as_str()),
    )
    .map_err(|e| CaissonError::Mount {
        target: config.merged_dir.clone(),
        message: format!("overlay mount failed: {e}"),
    })?;

    tracing::info!(merged = %config.merged_dir.display(), "overlayfs mounted");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — `OverlayFS` mounting requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn mount_overlay(_config: &OverlayConfig) -> Result<()> {
    Err(CaissonError::Unsupported {
        message: "Linux required for overlay mounts".into(),
    })
}

/// Unmounts an `OverlayFS` at the given path.
///
/// Uses `MNT_DETACH` to lazily detach the filesystem; used on the
/// rollback path when a later launch step fails.
///
/// # Errors
///
/// Returns an error if the unmount syscall fails.
#[cfg(target_os = "linux")]
pub fn unmount_overlay(merged_dir: &Path) -> Result<()> {
    nix::mount::umount2(merged_dir, nix::mount::MntFlags::MNT_DETACH).map_err(|e| {
        CaissonError::Mount {
            target: merged_dir.to_path_buf(),
            message: format!("unmount overlay failed: {e}"),
        }
    })?;
    tracing::info!(path = %merged_dir.display(), "overlayfs unmounted");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — `OverlayFS` unmounting requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn unmount_overlay(_merged_dir: &Path) -> Result<()> {
    Err(CaissonError::Unsupported {
        message: "Linux required for overlay mounts".into(),
    })
}
