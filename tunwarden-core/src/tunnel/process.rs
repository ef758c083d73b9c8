//! Tunnel client process probing and termination
//!
//! This module provides the PID-level primitives for the supervisor:
//! a non-destructive liveness probe and the graceful-then-forceful
//! termination ladder.

use crate::error::SupervisorError;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// How long a client gets to shut down after SIGTERM before SIGKILL.
const TERM_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Polling interval while waiting for the client to die.
const LIVENESS_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Bounded wait for SIGKILL to take effect.
const KILL_SETTLE: Duration = Duration::from_millis(500);

/// Check whether a process with the given PID exists
///
/// Uses signal 0, which performs permission and existence checks without
/// delivering anything to the target.
pub fn is_process_alive(pid: u32) -> bool {
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

/// Terminate a tunnel client process
///
/// Sends SIGTERM first, waits up to the grace period for the client to
/// exit on its own, then sends SIGKILL. Returns once the process is
/// confirmed gone. A target that disappeared before the first signal is
/// treated as already terminated.
///
/// # Errors
///
/// Returns `SignalFailed` if signal delivery itself errors (e.g. EPERM).
pub async fn terminate_with_grace(pid: u32) -> Result<(), SupervisorError> {
    let target = Pid::from_raw(pid as i32);

    match kill(target, Signal::SIGTERM) {
        Ok(()) => {}
        Err(Errno::ESRCH) => {
            info!("Tunnel client PID {} already terminated", pid);
            return Ok(());
        }
        Err(e) => {
            return Err(SupervisorError::SignalFailed {
                reason: format!("Failed to send SIGTERM to PID {}: {}", pid, e),
            });
        }
    }

    // Grace period: poll for the exit instead of sleeping it out in one
    // piece, so a prompt shutdown returns quickly.
    let polls = TERM_GRACE_PERIOD.as_millis() / LIVENESS_POLL_INTERVAL.as_millis();
    for _ in 0..polls {
        sleep(LIVENESS_POLL_INTERVAL).await;
        if !is_process_alive(pid) {
            info!("Tunnel client PID {} terminated gracefully", pid);
            return Ok(());
        }
    }

    warn!(
        "Tunnel client PID {} ignored SIGTERM for {:?}, sending SIGKILL",
        pid, TERM_GRACE_PERIOD
    );

    match kill(target, Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => {
            return Err(SupervisorError::SignalFailed {
                reason: format!("Failed to send SIGKILL to PID {}: {}", pid, e),
            });
        }
    }

    let polls = KILL_SETTLE.as_millis() / LIVENESS_POLL_INTERVAL.as_millis();
    for _ in 0..polls {
        sleep(LIVENESS_POLL_INTERVAL).await;
        if !is_process_alive(pid) {
            return Ok(());
        }
    }

    // SIGKILL cannot be ignored; a survivor here is stuck in the kernel
    // (uninterruptible sleep) and will die once that clears.
    warn!("Tunnel client PID {} still listed after SIGKILL", pid);
    Ok(())
}
