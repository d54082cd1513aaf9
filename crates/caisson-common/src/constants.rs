//! System-wide constants and default paths.

/// Default host-side scratch area staging per-container writable layers.
pub const DEFAULT_SCRATCH_DIR: &str = "/tmp/container";

/// Name of the image directory resolved relative to the working directory.
pub const IMAGES_DIR: &str = "images";

/// Maximum length of a container identifier in visible characters.
pub const MAX_CONTAINER_ID_LEN: usize = 15;

/// Stack size in bytes for the cloned container init process.
pub const CHILD_STACK_SIZE: usize = 1024 * 1024;

/// Marker file guarding a container identifier against concurrent launches.
pub const LOCK_FILE_NAME: &str = ".lock";

/// Application name used in diagnostics.
pub const APP_NAME: &str = "caisson";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "caisson";
