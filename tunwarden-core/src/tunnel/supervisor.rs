//! Tunnel client lifecycle supervision
//!
//! Manages a single tunnel client process from spawn to confirmed
//! termination: idempotent start/stop, liveness queries, and a detached
//! reaper that observes natural exits.

use crate::config::TunnelConfig;
use crate::error::SupervisorError;
use crate::tunnel::launcher::{
    resolve_client_binary, ClientOutput, ProcessSpawner, TokioSpawner, TunnelChild,
};
use crate::tunnel::process;
use crate::tunnel::state::{StatusReport, TunnelState};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// Delay after spawn before start returns, letting an immediately failing
/// client land its first output in the logs.
const SPAWN_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// The recorded child process.
#[derive(Debug, Clone)]
struct ActiveClient {
    pid: u32,
    epoch: u64,
    started_at: DateTime<Utc>,
}

/// Shared slot holding the at-most-one supervised child.
///
/// The epoch counter increments on every spawn so a reaper belonging to a
/// previous child can never clear a successor's entry.
#[derive(Debug, Default)]
struct SupervisorSlot {
    active: Option<ActiveClient>,
    epoch: u64,
}

/// Supervisor for a single tunnel client process
///
/// All operations are safe to call concurrently; the slot mutex
/// serializes every read and write of the recorded handle. Neither the
/// reaper task nor `stop`'s grace wait hold the lock while blocked.
pub struct TunnelSupervisor {
    config: TunnelConfig,
    slot: Arc<Mutex<SupervisorSlot>>,
    spawner: Arc<dyn ProcessSpawner>,
}

impl TunnelSupervisor {
    /// Create a supervisor using the default tokio-backed spawner
    pub fn new(config: TunnelConfig) -> Self {
        Self::with_spawner(config, Arc::new(TokioSpawner))
    }

    /// Create a supervisor with a custom spawning capability
    pub fn with_spawner(config: TunnelConfig, spawner: Arc<dyn ProcessSpawner>) -> Self {
        Self {
            config,
            slot: Arc::new(Mutex::new(SupervisorSlot::default())),
            spawner,
        }
    }

    /// Start the tunnel client
    ///
    /// Fails with `AlreadyRunning` when a client is already recorded,
    /// `BinaryNotFound` when the client binary cannot be resolved, and
    /// `SpawnFailed` when the OS refuses the spawn. On success the child
    /// PID is returned; the call does not wait for the client to finish
    /// connecting, let alone exit.
    pub async fn start(&self) -> Result<u32, SupervisorError> {
        // Precondition check, validation, and spawn happen under one lock
        // acquisition so two concurrent starts cannot both spawn.
        let (pid, epoch, child, output) = {
            let mut slot = self.slot.lock().unwrap();
            if let Some(active) = &slot.active {
                return Err(SupervisorError::AlreadyRunning { pid: active.pid });
            }

            let binary = resolve_client_binary(&self.config)?;
            let (child, output) = self.spawner.spawn(&binary, &self.config.client_config)?;
            let pid = child.pid();

            slot.epoch += 1;
            let epoch = slot.epoch;
            slot.active = Some(ActiveClient {
                pid,
                epoch,
                started_at: Utc::now(),
            });

            info!("Tunnel client spawned with PID {}", pid);
            (pid, epoch, child, output)
        };

        forward_output(output);
        self.watch_exit(child, epoch);

        tokio::time::sleep(SPAWN_SETTLE_DELAY).await;
        if !process::is_process_alive(pid) {
            warn!("Tunnel client PID {} exited right after spawn", pid);
        }

        Ok(pid)
    }

    /// Stop the tunnel client
    ///
    /// A no-op success when nothing is running. Otherwise sends SIGTERM,
    /// waits out the grace period, escalates to SIGKILL, and clears the
    /// slot only once termination is confirmed. Safe to call repeatedly.
    pub async fn stop(&self) -> Result<(), SupervisorError> {
        let (pid, epoch) = {
            let slot = self.slot.lock().unwrap();
            match &slot.active {
                Some(active) => (active.pid, active.epoch),
                // Stopping an already-stopped supervisor is not an error
                None => return Ok(()),
            }
        };

        info!("Stopping tunnel client PID {}", pid);
        let result = process::terminate_with_grace(pid).await;

        // Cleared even when signalling failed: the target is presumably
        // already gone or unreachable.
        self.clear_slot(epoch);
        result
    }

    /// Check whether the tunnel client is running
    ///
    /// Probes the recorded PID rather than trusting the flag alone. A
    /// client that exited on its own is reconciled here: the stale entry
    /// is cleared and `false` returned.
    pub fn is_running(&self) -> bool {
        let mut slot = self.slot.lock().unwrap();
        let pid = match &slot.active {
            Some(active) => active.pid,
            None => return false,
        };

        if process::is_process_alive(pid) {
            return true;
        }

        info!(
            "Tunnel client PID {} exited on its own, clearing stale state",
            pid
        );
        slot.active = None;
        false
    }

    /// PID of the running client, if any
    pub fn pid(&self) -> Option<u32> {
        self.slot.lock().unwrap().active.as_ref().map(|a| a.pid)
    }

    /// Current lifecycle state
    pub fn state(&self) -> TunnelState {
        if self.is_running() {
            TunnelState::Active
        } else {
            TunnelState::Idle
        }
    }

    /// Snapshot of the supervisor for status reporting
    pub fn status(&self) -> StatusReport {
        if !self.is_running() {
            return StatusReport::idle();
        }

        let slot = self.slot.lock().unwrap();
        match &slot.active {
            Some(active) => StatusReport {
                state: TunnelState::Active,
                pid: Some(active.pid),
                started_at: Some(active.started_at),
            },
            None => StatusReport::idle(),
        }
    }

    /// Detach a reaper task that consumes the child's exit status
    ///
    /// The task parks in `wait()` without the lock, then clears the slot
    /// if it still holds this child's entry. This is what keeps natural
    /// exits from leaving zombies behind.
    fn watch_exit(&self, mut child: Box<dyn TunnelChild>, epoch: u64) {
        let slot = Arc::clone(&self.slot);
        tokio::spawn(async move {
            let pid = child.pid();
            match child.wait().await {
                Ok(status) => info!("Tunnel client PID {} exited: {}", pid, status),
                Err(e) => warn!("Failed to reap tunnel client PID {}: {}", pid, e),
            }

            let mut slot = slot.lock().unwrap();
            if slot.active.as_ref().is_some_and(|a| a.epoch == epoch) {
                slot.active = None;
            }
        });
    }

    fn clear_slot(&self, epoch: u64) {
        let mut slot = self.slot.lock().unwrap();
        if slot.active.as_ref().is_some_and(|a| a.epoch == epoch) {
            slot.active = None;
        }
    }
}

/// Forward client output lines into the log, never parsing them
fn forward_output(output: ClientOutput) {
    if let Some(stdout) = output.stdout {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!("tunnel client stdout: {}", line);
            }
        });
    }

    if let Some(stderr) = output.stderr {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!("tunnel client stderr: {}", line);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::process::ExitStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Child whose PID is the test process itself, so liveness probes
    /// pass, and whose wait never resolves.
    struct FakeChild {
        pid: u32,
    }

    #[async_trait]
    impl TunnelChild for FakeChild {
        fn pid(&self) -> u32 {
            self.pid
        }

        async fn wait(&mut self) -> std::io::Result<ExitStatus> {
            std::future::pending().await
        }
    }

    struct FakeSpawner {
        spawned: AtomicUsize,
    }

    impl FakeSpawner {
        fn new() -> Self {
            Self {
                spawned: AtomicUsize::new(0),
            }
        }
    }

    impl ProcessSpawner for FakeSpawner {
        fn spawn(
            &self,
            _binary: &Path,
            _client_config: &Path,
        ) -> Result<(Box<dyn TunnelChild>, ClientOutput), SupervisorError> {
            self.spawned.fetch_add(1, Ordering::SeqCst);
            Ok((
                Box::new(FakeChild {
                    pid: std::process::id(),
                }),
                ClientOutput::none(),
            ))
        }
    }

    struct FailingSpawner;

    impl ProcessSpawner for FailingSpawner {
        fn spawn(
            &self,
            _binary: &Path,
            _client_config: &Path,
        ) -> Result<(Box<dyn TunnelChild>, ClientOutput), SupervisorError> {
            Err(SupervisorError::SpawnFailed {
                reason: "resource exhausted".to_string(),
            })
        }
    }

    /// Config whose binary resolves to something that always exists.
    fn fake_config() -> TunnelConfig {
        TunnelConfig {
            client_config: PathBuf::from("/dev/null"),
            client_binary: Some(PathBuf::from("/bin/sh")),
        }
    }

    #[tokio::test]
    async fn test_second_start_reports_already_running() {
        let spawner = Arc::new(FakeSpawner::new());
        let supervisor = TunnelSupervisor::with_spawner(fake_config(), spawner.clone());

        let pid = supervisor.start().await.unwrap();
        assert_eq!(pid, std::process::id());

        match supervisor.start().await {
            Err(SupervisorError::AlreadyRunning { pid: reported }) => {
                assert_eq!(reported, pid);
            }
            other => panic!("expected AlreadyRunning, got {:?}", other),
        }

        assert_eq!(spawner.spawned.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_starts_spawn_exactly_once() {
        let spawner = Arc::new(FakeSpawner::new());
        let supervisor = TunnelSupervisor::with_spawner(fake_config(), spawner.clone());

        let (a, b) = tokio::join!(supervisor.start(), supervisor.start());
        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();

        assert_eq!(successes, 1);
        assert!(matches!(
            [a, b].into_iter().find(|r| r.is_err()),
            Some(Err(SupervisorError::AlreadyRunning { .. }))
        ));
        assert_eq!(spawner.spawned.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_spawn_failure_leaves_state_idle() {
        let supervisor = TunnelSupervisor::with_spawner(fake_config(), Arc::new(FailingSpawner));

        assert!(matches!(
            supervisor.start().await,
            Err(SupervisorError::SpawnFailed { .. })
        ));
        assert!(!supervisor.is_running());
        assert!(supervisor.pid().is_none());

        // A failed spawn must not poison the precondition
        assert!(matches!(
            supervisor.start().await,
            Err(SupervisorError::SpawnFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_binary_not_found_before_spawn() {
        let spawner = Arc::new(FakeSpawner::new());
        let config = TunnelConfig {
            client_config: PathBuf::from("/dev/null"),
            client_binary: Some(PathBuf::from("/nonexistent/frpc")),
        };
        let supervisor = TunnelSupervisor::with_spawner(config, spawner.clone());

        assert!(matches!(
            supervisor.start().await,
            Err(SupervisorError::BinaryNotFound { .. })
        ));
        // Validation failed before any spawn attempt
        assert_eq!(spawner.spawned.load(Ordering::SeqCst), 0);
        assert!(!supervisor.is_running());
    }

    #[tokio::test]
    async fn test_stop_when_never_started() {
        let supervisor = TunnelSupervisor::new(fake_config());

        supervisor.stop().await.unwrap();
        supervisor.stop().await.unwrap();
        assert!(!supervisor.is_running());
        assert_eq!(supervisor.state(), TunnelState::Idle);
    }

    #[tokio::test]
    async fn test_status_reflects_running_client() {
        let supervisor =
            TunnelSupervisor::with_spawner(fake_config(), Arc::new(FakeSpawner::new()));

        assert!(!supervisor.status().is_active());

        let pid = supervisor.start().await.unwrap();
        let report = supervisor.status();
        assert!(report.is_active());
        assert_eq!(report.pid, Some(pid));
        assert!(report.started_at.is_some());
    }
}
