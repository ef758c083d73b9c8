//! Tunnel client binary resolution and spawning
//!
//! Locates the client executable and provides the spawning capability
//! behind a trait so tests can substitute fakes for real OS processes.

use crate::config::TunnelConfig;
use crate::error::SupervisorError;
use async_trait::async_trait;
use nix::unistd::AccessFlags;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::AsyncRead;
use tokio::process::Command;
use tracing::debug;

/// Conventional name of the tunnel client binary.
pub const CLIENT_BINARY_NAME: &str = "frpc";

/// Resolve the tunnel client binary for a configuration
///
/// Resolution order: the explicitly configured path, then a client
/// binary co-located with the client configuration file, then a `$PATH`
/// lookup. The chosen path must exist and be executable.
pub fn resolve_client_binary(config: &TunnelConfig) -> Result<PathBuf, SupervisorError> {
    if let Some(explicit) = &config.client_binary {
        if is_executable(explicit) {
            return Ok(explicit.clone());
        }
        return Err(SupervisorError::BinaryNotFound {
            path: explicit.clone(),
        });
    }

    // Co-location convention: the client ships next to its config file.
    let colocated = config
        .client_config
        .parent()
        .map(|dir| dir.join(CLIENT_BINARY_NAME));
    if let Some(candidate) = &colocated {
        if is_executable(candidate) {
            debug!("Using co-located tunnel client: {}", candidate.display());
            return Ok(candidate.clone());
        }
    }

    if let Ok(found) = which::which(CLIENT_BINARY_NAME) {
        debug!("Using tunnel client from PATH: {}", found.display());
        return Ok(found);
    }

    Err(SupervisorError::BinaryNotFound {
        path: colocated.unwrap_or_else(|| PathBuf::from(CLIENT_BINARY_NAME)),
    })
}

/// Check that a path points to an executable regular file
fn is_executable(path: &Path) -> bool {
    path.is_file() && nix::unistd::access(path, AccessFlags::X_OK).is_ok()
}

/// Handle to a spawned tunnel client process
///
/// Only the supervisor interacts with this handle; callers never see it.
#[async_trait]
pub trait TunnelChild: Send {
    /// OS process id of the client
    fn pid(&self) -> u32;

    /// Wait for the client to exit, consuming its exit status
    async fn wait(&mut self) -> std::io::Result<ExitStatus>;
}

/// Output streams taken from a freshly spawned client
pub struct ClientOutput {
    /// Piped stdout, if captured
    pub stdout: Option<Box<dyn AsyncRead + Send + Unpin>>,

    /// Piped stderr, if captured
    pub stderr: Option<Box<dyn AsyncRead + Send + Unpin>>,
}

impl ClientOutput {
    /// Output bundle with nothing captured
    pub fn none() -> Self {
        Self {
            stdout: None,
            stderr: None,
        }
    }
}

/// Capability to spawn the tunnel client
///
/// The supervisor takes this as an injected dependency; production code
/// uses [`TokioSpawner`], tests substitute fakes.
pub trait ProcessSpawner: Send + Sync {
    /// Spawn `binary -c client_config` as a new child process
    fn spawn(
        &self,
        binary: &Path,
        client_config: &Path,
    ) -> Result<(Box<dyn TunnelChild>, ClientOutput), SupervisorError>;
}

/// Default spawner backed by `tokio::process`
pub struct TokioSpawner;

struct SpawnedClient {
    pid: u32,
    child: tokio::process::Child,
}

#[async_trait]
impl TunnelChild for SpawnedClient {
    fn pid(&self) -> u32 {
        self.pid
    }

    async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        self.child.wait().await
    }
}

impl ProcessSpawner for TokioSpawner {
    fn spawn(
        &self,
        binary: &Path,
        client_config: &Path,
    ) -> Result<(Box<dyn TunnelChild>, ClientOutput), SupervisorError> {
        let mut cmd = Command::new(binary);
        cmd.arg("-c")
            .arg(client_config)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Run from the config's directory so clients resolving relative
        // paths (certificates, includes) behave as if launched there.
        if let Some(dir) = client_config.parent() {
            if !dir.as_os_str().is_empty() {
                cmd.current_dir(dir);
            }
        }

        let mut child = cmd.spawn().map_err(|e| SupervisorError::SpawnFailed {
            reason: format!("Failed to spawn {}: {}", binary.display(), e),
        })?;

        let pid = child.id().ok_or_else(|| SupervisorError::SpawnFailed {
            reason: "Spawned client has no PID".to_string(),
        })?;

        let stdout = child
            .stdout
            .take()
            .map(|s| Box::new(s) as Box<dyn AsyncRead + Send + Unpin>);
        let stderr = child
            .stderr
            .take()
            .map(|s| Box::new(s) as Box<dyn AsyncRead + Send + Unpin>);

        Ok((
            Box::new(SpawnedClient { pid, child }),
            ClientOutput { stdout, stderr },
        ))
    }
}
