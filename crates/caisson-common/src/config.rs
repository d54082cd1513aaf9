//! Global configuration model for the Caisson launcher.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for a container launch.
///
/// The scratch root is injected rather than hardcoded so tests can
/// redirect staging into a sandbox directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Host directory staging per-container upper/work/merged trees.
    pub scratch_root: PathBuf,
    /// Stack size in bytes allocated for the cloned init process.
    pub child_stack_bytes: usize,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            scratch_root: PathBuf::from(crate::constants::DEFAULT_SCRATCH_DIR),
            child_stack_bytes: crate::constants::CHILD_STACK_SIZE,
        }
    }
}
