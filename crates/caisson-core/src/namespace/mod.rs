//! Linux namespace management for container isolation.
//!
//! Selects the namespaces the container init process is cloned into and
//! detaches its mount table from the host.

pub mod mount;

/// Configuration for which namespaces to give the container init process.
#[derive(Debug, Clone, Copy)]
pub struct NamespaceConfig {
    /// Isolate the mount table.
    pub mount: bool,
    /// Isolate the PID space; the init process becomes PID 1.
    pub pid: bool,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self { mount: true, pid: true }
    }
}

impl NamespaceConfig {
    /// Returns the `clone(2)` flags matching this configuration.
    #[cfg(target_os = "linux")]
    #[must_use]
    pub fn clone_flags(self) -> nix::sched::CloneFlags {
        use nix::sched::CloneFlags;

        let mut flags = CloneFlags::empty();
        if self.mount {
            flags |= CloneFlags::CLONE_NEWNS;
        }
        if self.pid {
            flags |= CloneFlags::CLONE_NEWPID;
        }
        flags
    }
}
