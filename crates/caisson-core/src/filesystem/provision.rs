//! Recursive directory provisioning for overlay staging trees.
//!
//! Walks a path segment by segment, creating every missing ancestor with
//! owner-only permissions. Re-running against an existing tree is a no-op,
//! so the launch path can call this unconditionally.

use std::io;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};

use caisson_common::error::{CaissonError, Result};

/// Mode applied to every directory created by the provisioner.
const DIR_MODE: u32 = 0o700;

/// Creates `path` and every missing ancestor with mode 0700.
///
/// Segments that already exist are skipped. After the walk, the leaf is
/// re-checked to be a directory (not a file or dangling symlink left by a
/// concurrent writer); anything else is an error.
///
/// # Errors
///
/// Returns an error naming the failing segment if the path is not
/// absolute, a segment cannot be created for a reason other than already
/// existing, or the leaf is not a directory after the walk.
pub fn ensure_dir_tree(path: &Path) -> Result<()> {
    if !path.is_absolute() {
        return Err(CaissonError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path must be absolute"),
        });
    }

    let mut current = PathBuf::new();
    for component in path.components() {
        current.push(component);
        match std::fs::DirBuilder::new().mode(DIR_MODE).create(&current) {
            Ok(()) => {
                tracing::trace!(dir = %current.display(), "created directory");
            }
            // mkdir(2) reports EEXIST for any existing entry, directory or
            // not; a non-directory segment fails at the next level or at
            // the leaf check below.
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(CaissonError::Io {
                    path: current,
                    source: e,
                });
            }
        }
    }

    let metadata = std::fs::symlink_metadata(path).map_err(|e| CaissonError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    if !metadata.is_dir() {
        return Err(CaissonError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotADirectory, "leaf is not a directory"),
        });
    }
    Ok(())
}

/// Removes `path` recursively if it exists, then re-creates it empty.
///
/// `OverlayFS` refuses a work directory holding state from a previous
/// mount, so the work tree is always reset before staging.
///
/// # Errors
///
/// Returns an error if removal or re-creation fails.
pub fn reset_dir(path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => {
            tracing::debug!(dir = %path.display(), "cleared stale directory");
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(CaissonError::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    }
    ensure_dir_tree(path)
}

#[cfg(test)]
mod tests {
    use std::os::unix::fs::PermissionsExt;

    use super::*;

    #[test]
    fn creates_deep_tree() {
        let dir = tempfile::tempdir().expect("tempdir");
        let leaf = dir.path().join("a/b/c/d");
        ensure_dir_tree(&leaf).expect("should create tree");
        assert!(leaf.is_dir());
    }

    #[test]
    fn provisioning_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let leaf = dir.path().join("x/y");
        ensure_dir_tree(&leaf).expect("first run");
        ensure_dir_tree(&leaf).expect("second run must also succeed");
        assert!(leaf.is_dir());
    }

    #[test]
    fn created_directories_are_owner_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let leaf = dir.path().join("private/inner");
        ensure_dir_tree(&leaf).expect("create");

        let mode = std::fs::metadata(&leaf).expect("metadata").permissions().mode() & 0o777;
        assert_eq!(mode, 0o700);
        let parent_mode = std::fs::metadata(dir.path().join("private"))
            .expect("metadata")
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(parent_mode, 0o700);
    }

    #[test]
    fn rejects_relative_paths() {
        assert!(ensure_dir_tree(Path::new("relative/path")).is_err());
    }

    #[test]
    fn fails_when_segment_is_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("blocker");
        std::fs::write(&file, b"not a dir").expect("write file");

        let err = ensure_dir_tree(&file.join("child")).expect_err("must fail");
        assert!(matches!(err, CaissonError::Io { .. }));
    }

    #[test]
    fn fails_when_leaf_is_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("leaf");
        std::fs::write(&file, b"").expect("write file");

        let err = ensure_dir_tree(&file).expect_err("must fail");
        assert!(matches!(err, CaissonError::Io { .. }));
    }

    #[test]
    fn reset_dir_clears_existing_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let work = dir.path().join("work");
        ensure_dir_tree(&work).expect("create");
        std::fs::write(work.join("stale"), b"old overlay state").expect("write");

        reset_dir(&work).expect("reset");
        assert!(work.is_dir());
        assert!(!work.join("stale").exists());
    }

    #[test]
    fn reset_dir_creates_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let work = dir.path().join("fresh/work");
        reset_dir(&work).expect("reset on missing path");
        assert!(work.is_dir());
    }
}
