//! Container descriptor and canonical path derivation.
//!
//! The descriptor is the sole unit of state handed to the isolated launch
//! path; everything else is derived from it deterministically.

use std::path::PathBuf;

use caisson_common::config::LauncherConfig;
use caisson_common::constants::IMAGES_DIR;
use caisson_common::error::{CaissonError, Result};
use caisson_common::types::{ContainerId, ImageName};
use caisson_core::filesystem::overlayfs::OverlayConfig;

/// Everything the isolated child needs to stage and enter a container.
#[derive(Debug, Clone)]
pub struct Container {
    /// Unique identifier, scoping the scratch subtree.
    pub id: ContainerId,
    /// Base image providing the read-only lower layer.
    pub image: ImageName,
    /// Command and arguments executed as the container's init process.
    pub command: Vec<String>,
    /// Working directory captured at program start, anchoring the image
    /// lookup.
    pub working_dir: PathBuf,
}

impl Container {
    /// Assembles a container descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if the command is empty or the working directory
    /// is not absolute.
    pub fn new(
        id: ContainerId,
        image: ImageName,
        command: Vec<String>,
        working_dir: PathBuf,
    ) -> Result<Self> {
        if command.is_empty() {
            return Err(CaissonError::InvalidDescriptor {
                message: "command must not be empty".into(),
            });
        }
        if !working_dir.is_absolute() {
            return Err(CaissonError::InvalidDescriptor {
                message: format!("working directory {} is not absolute", working_dir.display()),
            });
        }
        Ok(Self { id, image, command, working_dir })
    }
}

/// The four canonical paths of a container's layered filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerPaths {
    /// Read-only image layer under `<working_dir>/images/<image>`.
    pub lower: PathBuf,
    /// Writable layer under `<scratch>/<id>/upper`.
    pub upper: PathBuf,
    /// Overlay scratch under `<scratch>/<id>/work`.
    pub work: PathBuf,
    /// Mount target under `<scratch>/<id>/merged`.
    pub merged: PathBuf,
}

impl ContainerPaths {
    /// Derives the canonical paths for a container under the configured
    /// scratch root.
    #[must_use]
    pub fn derive(container: &Container, config: &LauncherConfig) -> Self {
        let state_dir = config.scratch_root.join(container.id.as_str());
        Self {
            lower: container
                .working_dir
                .join(IMAGES_DIR)
                .join(container.image.as_str()),
            upper: state_dir.join("upper"),
            work: state_dir.join("work"),
            merged: state_dir.join("merged"),
        }
    }

    /// Renders these paths as an overlay mount configuration.
    #[must_use]
    pub fn overlay_config(&self) -> OverlayConfig {
        OverlayConfig {
            lower_dir: self.lower.clone(),
            upper_dir: self.upper.clone(),
            work_dir: self.work.clone(),
            merged_dir: self.merged.clone(),
        }
    }
}
