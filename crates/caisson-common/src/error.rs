//! Unified error types for the Caisson workspace.
//!
//! Every fallible operation in the launch path maps onto one of these
//! variants; there is no local recovery, so each variant carries enough
//! context to make the terminating diagnostic self-explanatory.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum CaissonError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A container descriptor field failed validation.
    #[error("invalid descriptor: {message}")]
    InvalidDescriptor {
        /// Description of the rejected field.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// A mount syscall failed.
    #[error("mount failed at {target}: {message}")]
    Mount {
        /// Mount target path.
        target: PathBuf,
        /// Underlying syscall error.
        message: String,
    },

    /// The root switch into the merged view failed.
    #[error("root switch to {path} failed: {message}")]
    RootSwitch {
        /// Intended new root.
        path: PathBuf,
        /// Underlying syscall error.
        message: String,
    },

    /// Spawning or reaping the isolated child failed.
    #[error("container spawn failed: {message}")]
    Spawn {
        /// Underlying syscall error.
        message: String,
    },

    /// Replacing the child's process image failed.
    #[error("exec of {command:?} failed: {message}")]
    Exec {
        /// Command that could not be executed.
        command: String,
        /// Underlying syscall error.
        message: String,
    },

    /// A launch for this container identifier is already in flight.
    #[error("container id already in use: {id}")]
    Busy {
        /// Contended container identifier.
        id: String,
    },

    /// The operation is not supported on this platform.
    #[error("unsupported operation: {message}")]
    Unsupported {
        /// Description of the unsupported operation.
        message: String,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, CaissonError>;
