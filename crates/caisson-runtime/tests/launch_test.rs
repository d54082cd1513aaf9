//! Integration tests for the container launch pipeline.
//!
//! The unprivileged tests exercise locking and configuration handling;
//! the mount- and namespace-touching scenarios need root and a Linux
//! kernel with `OverlayFS`, and skip themselves otherwise.

#![cfg(target_os = "linux")]
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::print_stderr)]

use std::path::{Path, PathBuf};

use caisson_common::config::LauncherConfig;
use caisson_common::error::CaissonError;
use caisson_common::types::{ContainerId, ImageName};
use caisson_core::filesystem::overlayfs::{self, OverlayConfig};
use caisson_core::filesystem::provision::ensure_dir_tree;
use caisson_runtime::container::{Container, ContainerPaths};
use caisson_runtime::supervisor::{LaunchLock, Supervisor, prepare_scratch};

fn running_as_root() -> bool {
    nix::unistd::Uid::effective().is_root()
}

fn config_with_scratch(scratch: &Path) -> LauncherConfig {
    LauncherConfig {
        scratch_root: scratch.to_path_buf(),
        ..LauncherConfig::default()
    }
}

fn descriptor(id: &str, image: &str, command: &[&str], working_dir: &Path) -> Container {
    Container::new(
        ContainerId::new(id).expect("id"),
        ImageName::new(image).expect("image"),
        command.iter().map(ToString::to_string).collect(),
        working_dir.to_path_buf(),
    )
    .expect("descriptor")
}

// ── Unprivileged ─────────────────────────────────────────────────────

#[test]
fn held_lock_rejects_launch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_with_scratch(dir.path());
    let container = descriptor("busy1", "alpine", &["/bin/true"], dir.path());

    let state_dir = dir.path().join("busy1");
    let _held = LaunchLock::acquire(&state_dir, &container.id).expect("acquire");

    let err = Supervisor::new(config)
        .launch(&container)
        .expect_err("launch must be rejected");
    assert!(matches!(err, CaissonError::Busy { .. }));
}

#[test]
fn lock_release_allows_sequential_launches() {
    let dir = tempfile::tempdir().expect("tempdir");
    let id = ContainerId::new("seq1").expect("id");
    let state_dir = dir.path().join("seq1");

    drop(LaunchLock::acquire(&state_dir, &id).expect("first"));
    drop(LaunchLock::acquire(&state_dir, &id).expect("second"));
}

// ── Root-gated ───────────────────────────────────────────────────────

/// Stages a scratch tmpfs plus a populated image directory, returning
/// (working_dir, scratch_root) inside the tempdir.
fn stage_environment(root: &Path, image: &str) -> (PathBuf, PathBuf) {
    let working_dir = root.join("project");
    let scratch = root.join("scratch");
    ensure_dir_tree(&working_dir.join("images").join(image)).expect("image dir");
    prepare_scratch(&scratch).expect("scratch tmpfs");
    (working_dir, scratch)
}

fn detach(path: &Path) {
    let _ = nix::mount::umount2(path, nix::mount::MntFlags::MNT_DETACH);
}

#[test]
fn overlay_isolates_writes_from_lower_layer() {
    if !running_as_root() {
        eprintln!("skipping: requires root");
        return;
    }

    let dir = tempfile::tempdir().expect("tempdir");
    let (working_dir, scratch) = stage_environment(dir.path(), "base");
    let lower = working_dir.join("images/base");
    std::fs::write(lower.join("from-image"), b"lower data").expect("seed lower");

    let state = scratch.join("iso1");
    let overlay = OverlayConfig {
        lower_dir: lower.clone(),
        upper_dir: state.join("upper"),
        work_dir: state.join("work"),
        merged_dir: state.join("merged"),
    };
    for dir in [&overlay.upper_dir, &overlay.work_dir, &overlay.merged_dir] {
        ensure_dir_tree(dir).expect("provision");
    }
    overlayfs::mount_overlay(&overlay).expect("mount");

    // Reads fall through to the image layer.
    let seen = std::fs::read(overlay.merged_dir.join("from-image")).expect("read through");
    assert_eq!(seen, b"lower data");

    // Writes are captured copy-on-write in the upper layer.
    std::fs::write(overlay.merged_dir.join("new-file"), b"upper data").expect("write");
    assert!(overlay.upper_dir.join("new-file").exists());
    assert!(!lower.join("new-file").exists());

    // Deleting an image file hides it from the merged view only.
    std::fs::remove_file(overlay.merged_dir.join("from-image")).expect("delete");
    assert!(!overlay.merged_dir.join("from-image").exists());
    assert!(lower.join("from-image").exists(), "lower layer must never be mutated");

    detach(&overlay.merged_dir);
    detach(&scratch);
}

#[test]
fn launch_reflects_child_exec_failure() {
    if !running_as_root() {
        eprintln!("skipping: requires root");
        return;
    }

    let dir = tempfile::tempdir().expect("tempdir");
    let (working_dir, scratch) = stage_environment(dir.path(), "empty");
    let container = descriptor("fail1", "empty", &["/no/such/binary"], &working_dir);

    let code = Supervisor::new(config_with_scratch(&scratch))
        .launch(&container)
        .expect("launch itself succeeds");
    assert_ne!(code, 0, "exec failure must surface in the exit code");

    // Staged directories survive; the mount died with the namespace.
    let paths = ContainerPaths::derive(&container, &config_with_scratch(&scratch));
    assert!(paths.upper.is_dir());
    assert!(!scratch.join("fail1/.lock").exists(), "lock released after reap");

    detach(&scratch);
}

#[test]
fn launch_rolls_back_when_image_is_missing() {
    if !running_as_root() {
        eprintln!("skipping: requires root");
        return;
    }

    let dir = tempfile::tempdir().expect("tempdir");
    let working_dir = dir.path().join("project");
    ensure_dir_tree(&working_dir).expect("working dir");
    let scratch = dir.path().join("scratch");
    prepare_scratch(&scratch).expect("scratch tmpfs");

    // No images/ tree at all: the mount step fails inside the child.
    let container = descriptor("noimg1", "ghost", &["/bin/true"], &working_dir);
    let config = config_with_scratch(&scratch);

    let code = Supervisor::new(config.clone()).launch(&container).expect("launch");
    assert_ne!(code, 0);

    let paths = ContainerPaths::derive(&container, &config);
    assert!(!paths.upper.exists(), "rollback must remove the staged upper layer");
    assert!(!paths.work.exists());
    assert!(!paths.merged.exists());

    detach(&scratch);
}

/// Returns the path of a statically linked busybox, if the host has one.
fn static_busybox() -> Option<PathBuf> {
    let candidate = PathBuf::from("/bin/busybox");
    let bytes = std::fs::read(&candidate).ok()?;
    let dynamic = bytes
        .windows(8)
        .any(|w| w == b"ld-linux" || w == b"ld-musl-");
    (!dynamic).then_some(candidate)
}

#[test]
fn launch_runs_command_to_completion() {
    if !running_as_root() {
        eprintln!("skipping: requires root");
        return;
    }
    let Some(busybox) = static_busybox() else {
        eprintln!("skipping: no static busybox on host");
        return;
    };

    let dir = tempfile::tempdir().expect("tempdir");
    let (working_dir, scratch) = stage_environment(dir.path(), "busybox");
    let image_bin = working_dir.join("images/busybox/bin");
    ensure_dir_tree(&image_bin).expect("image bin");
    std::fs::copy(&busybox, image_bin.join("busybox")).expect("copy busybox");
    std::fs::set_permissions(
        image_bin.join("busybox"),
        std::os::unix::fs::PermissionsExt::from_mode(0o755),
    )
    .expect("chmod");

    let container =
        descriptor("e2e1", "busybox", &["/bin/busybox", "echo", "hello"], &working_dir);
    let config = config_with_scratch(&scratch);

    let code = Supervisor::new(config.clone()).launch(&container).expect("launch");
    assert_eq!(code, 0, "echo inside the container must succeed");

    let paths = ContainerPaths::derive(&container, &config);
    assert!(paths.upper.is_dir(), "staging tree persists after exit");
    assert!(paths.merged.is_dir());

    detach(&scratch);
}
