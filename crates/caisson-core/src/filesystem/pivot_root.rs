//! Root filesystem switching via `pivot_root(2)`.
//!
//! More secure than `chroot` because it actually changes the root mount
//! point rather than just the process's view of `/`.

use std::path::Path;

use caisson_common::error::{CaissonError, Result};

/// Switches the process's root filesystem to `new_root`.
///
/// Stacks the new root over itself with `pivot_root(".", ".")` after
/// changing into it, then lazily detaches the old root underneath. When
/// this returns, `/` resolves to `new_root` and no reference to the
/// previous root remains reachable.
///
/// `new_root` must be a mount point in the caller's mount namespace; the
/// overlay mount onto the merged directory satisfies this.
///
/// # Errors
///
/// Returns an error if any step of the pivot sequence fails, naming the
/// intended new root.
#[cfg(target_os = "linux")]
pub fn switch_root(new_root: &Path) -> Result<()> {
    use nix::mount::{MntFlags, umount2};
    use nix::unistd::{chdir, pivot_root};

    let fail = |step: &str, e: nix::errno::Errno| CaissonError::RootSwitch {
        path: new_root.to_path_buf(),
        message: format!("{step}: {e}"),
    };

    chdir(new_root).map_err(|e| fail("chdir into new root", e))?;
    // With new_root and put_old identical, the old root ends up stacked
    // underneath the new one and can be dropped without a scratch dir.
    pivot_root(".", ".").map_err(|e| fail("pivot_root", e))?;
    umount2(".", MntFlags::MNT_DETACH).map_err(|e| fail("detach old root", e))?;
    chdir("/").map_err(|e| fail("chdir to /", e))?;

    tracing::info!(new_root = %new_root.display(), "root switched");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — root switching requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn switch_root(_new_root: &Path) -> Result<()> {
    Err(CaissonError::Unsupported {
        message: "Linux required for root switching".into(),
    })
}
