//! Filesystem management for container isolation.
//!
//! Provides overlay directory provisioning, `OverlayFS` mounting, and
//! root switching into the merged view.

pub mod overlayfs;
pub mod pivot_root;
pub mod provision;
