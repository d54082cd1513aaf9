//! Domain primitive types used across the Caisson workspace.
//!
//! Both identifiers end up verbatim as path components under the scratch
//! area or the image root, so their constructors reject anything that
//! could escape or corrupt those trees.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_CONTAINER_ID_LEN;
use crate::error::{CaissonError, Result};

fn validate_path_segment(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(CaissonError::InvalidDescriptor {
            message: format!("{kind} must not be empty"),
        });
    }
    if value.contains('/') || value.contains('\0') {
        return Err(CaissonError::InvalidDescriptor {
            message: format!("{kind} {value:?} must not contain '/' or NUL"),
        });
    }
    if value == "." || value == ".." {
        return Err(CaissonError::InvalidDescriptor {
            message: format!("{kind} must not be '.' or '..'"),
        });
    }
    Ok(())
}

/// Unique identifier for a container instance.
///
/// Used verbatim as a path segment under the scratch area.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(String);

impl ContainerId {
    /// Creates a container ID, validating it as a safe path segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is empty, longer than
    /// [`MAX_CONTAINER_ID_LEN`] characters, contains `/` or NUL, or is a
    /// dot segment.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        validate_path_segment("container id", &id)?;
        if id.chars().count() > MAX_CONTAINER_ID_LEN {
            return Err(CaissonError::InvalidDescriptor {
                message: format!(
                    "container id {id:?} exceeds {MAX_CONTAINER_ID_LEN} characters"
                ),
            });
        }
        Ok(Self(id))
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a base image, resolved to a subdirectory of the image root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageName(String);

impl ImageName {
    /// Creates an image name, validating it as a safe path segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is empty, contains `/` or NUL, or is
    /// a dot segment.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_path_segment("image name", &name)?;
        Ok(Self(name))
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
