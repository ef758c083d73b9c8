//! Daemon process management
//!
//! Handles daemonizing the supervisor, pid file management, and daemon
//! lifecycle.

use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use daemonize::Daemonize;
use tracing::info;

use tunwarden_core::error::{SupervisorError, TunwardenError};

/// How long the daemon gets to wind down its child before SIGKILL.
const DAEMON_STOP_TIMEOUT: Duration = Duration::from_secs(6);

/// Polling interval while waiting for the daemon to exit.
const DAEMON_STOP_POLL: Duration = Duration::from_millis(200);

/// Represents the daemonized supervisor process
pub struct DaemonProcess {
    pid_file: PathBuf,
}

impl DaemonProcess {
    /// Create a new daemon process manager
    pub fn new(pid_file: PathBuf) -> Self {
        Self { pid_file }
    }

    /// Check if a daemon is already running
    ///
    /// A pid file pointing at a dead process is treated as stale and
    /// removed.
    pub fn is_running(&self) -> Result<bool, TunwardenError> {
        let pid = match self.read_pid()? {
            Some(pid) => pid,
            None => return Ok(false),
        };

        match nix::unistd::getpgid(Some(nix::unistd::Pid::from_raw(pid))) {
            Ok(_) => Ok(true),
            Err(nix::errno::Errno::ESRCH) => {
                // Process doesn't exist, clean up the stale pid file
                let _ = fs::remove_file(&self.pid_file);
                Ok(false)
            }
            Err(e) => Err(TunwardenError::Supervisor(SupervisorError::SignalFailed {
                reason: format!("Failed to check daemon status: {}", e),
            })),
        }
    }

    /// Daemonize the current process
    ///
    /// Only the daemon survives this call; the invoking process exits.
    pub fn daemonize(&self) -> Result<(), TunwardenError> {
        // Ensure the pid file directory exists
        if let Some(parent) = self.pid_file.parent() {
            fs::create_dir_all(parent)?;
        }

        let daemonize = Daemonize::new()
            .pid_file(&self.pid_file)
            .chown_pid_file(true)
            .working_directory(std::env::current_dir()?)
            .umask(0o027);

        daemonize
            .start()
            .map_err(|e| TunwardenError::Supervisor(SupervisorError::SpawnFailed {
                reason: format!("Failed to daemonize supervisor: {}", e),
            }))?;

        info!("Supervisor daemonized, PID: {}", process::id());
        Ok(())
    }

    /// Get the PID recorded in the pid file, if any
    fn read_pid(&self) -> Result<Option<i32>, TunwardenError> {
        if !self.pid_file.exists() {
            return Ok(None);
        }

        let pid_content = fs::read_to_string(&self.pid_file)?;
        match pid_content.trim().parse() {
            Ok(pid) => Ok(Some(pid)),
            Err(_) => {
                // Unreadable pid file, treat as stale
                let _ = fs::remove_file(&self.pid_file);
                Ok(None)
            }
        }
    }

    /// Stop the daemon process
    ///
    /// SIGTERM first, which makes the daemon wind down its tunnel client
    /// gracefully, then SIGKILL if the daemon outlives the timeout.
    pub fn stop(&self) -> Result<(), TunwardenError> {
        let pid = match self.read_pid()? {
            Some(pid) => pid,
            None => return Ok(()),
        };
        let target = nix::unistd::Pid::from_raw(pid);

        match nix::sys::signal::kill(target, nix::sys::signal::Signal::SIGTERM) {
            Ok(()) | Err(nix::errno::Errno::ESRCH) => {}
            Err(e) => {
                return Err(TunwardenError::Supervisor(SupervisorError::SignalFailed {
                    reason: format!("Failed to send SIGTERM to daemon: {}", e),
                }));
            }
        }

        // The daemon needs the child's full grace period plus slack
        let polls = DAEMON_STOP_TIMEOUT.as_millis() / DAEMON_STOP_POLL.as_millis();
        let mut stopped = false;
        for _ in 0..polls {
            std::thread::sleep(DAEMON_STOP_POLL);
            if nix::sys::signal::kill(target, None).is_err() {
                stopped = true;
                break;
            }
        }

        if !stopped {
            let _ = nix::sys::signal::kill(target, nix::sys::signal::Signal::SIGKILL);
        }

        // Clean up the pid file
        let _ = fs::remove_file(&self.pid_file);

        info!("Stopped daemon process {}", pid);
        Ok(())
    }
}

/// Get the default pid file path
pub fn get_default_pid_file() -> PathBuf {
    super::runtime_dir().join("tunwarden.pid")
}
