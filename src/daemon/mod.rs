//! Daemon process management for background tunnel supervision
//!
//! This module handles the daemonized supervisor process: pid-file
//! lifecycle, the status socket, and the supervision loop itself.

pub mod ipc;
pub mod process;
pub mod runner;

use std::path::PathBuf;

/// Runtime directory for the pid file and status socket
///
/// Uses XDG_RUNTIME_DIR when available, otherwise a uid-scoped /tmp
/// directory. TUNWARDEN_RUNTIME_DIR overrides both (used by tests).
pub fn runtime_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TUNWARDEN_RUNTIME_DIR") {
        return PathBuf::from(dir);
    }

    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir);
    }

    PathBuf::from("/tmp").join(format!("tunwarden-{}", nix::unistd::getuid()))
}
