//! # caisson-core
//!
//! Low-level Linux isolation primitives for the Caisson launcher.
//!
//! This crate provides safe abstractions over:
//! - **Namespaces**: mount and PID isolation for the container init process.
//! - **Filesystem**: overlay directory provisioning, `OverlayFS` mounting,
//!   and root switching via `pivot_root`.
//!
//! All unsafe system calls are encapsulated in safe wrappers with
//! proper error handling and `// SAFETY:` documentation.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod filesystem;
pub mod namespace;
