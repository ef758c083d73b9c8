//! Unix socket IPC for daemon communication
//!
//! Lets the CLI query the daemonized supervisor for the tunnel status.

use std::fs;
use std::io::{Read, Write};
use std::net::Shutdown;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use tunwarden_core::error::{SupervisorError, TunwardenError};
use tunwarden_core::tunnel::{StatusReport, TunnelSupervisor};

/// IPC message types
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum IpcMessage {
    /// Request the current tunnel status
    StatusRequest,
    /// Response with the current tunnel status
    StatusResponse(StatusReport),
}

/// Get the default status socket path
pub fn get_default_socket_path() -> PathBuf {
    super::runtime_dir().join("tunwarden.sock")
}

/// IPC client for querying the daemon
pub struct IpcClient {
    socket_path: PathBuf,
}

impl IpcClient {
    /// Create a new IPC client
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    /// Send a message and receive a response
    fn send_message(&self, message: &IpcMessage) -> Result<IpcMessage, TunwardenError> {
        let mut stream = UnixStream::connect(&self.socket_path).map_err(|e| {
            TunwardenError::Supervisor(SupervisorError::SignalFailed {
                reason: format!("Failed to connect to daemon socket: {}", e),
            })
        })?;

        let message_data = serde_json::to_vec(message).map_err(|e| {
            TunwardenError::Supervisor(SupervisorError::SignalFailed {
                reason: format!("Failed to serialize message: {}", e),
            })
        })?;

        stream.write_all(&message_data)?;
        // Signal end-of-request so the server's read completes
        stream.shutdown(Shutdown::Write)?;

        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer)?;

        serde_json::from_slice(&buffer).map_err(|e| {
            TunwardenError::Supervisor(SupervisorError::SignalFailed {
                reason: format!("Failed to deserialize response: {}", e),
            })
        })
    }

    /// Get the current tunnel status from the daemon
    pub fn get_status(&self) -> Result<StatusReport, TunwardenError> {
        match self.send_message(&IpcMessage::StatusRequest)? {
            IpcMessage::StatusResponse(report) => Ok(report),
            other => Err(TunwardenError::Supervisor(SupervisorError::SignalFailed {
                reason: format!("Unexpected response to status request: {:?}", other),
            })),
        }
    }
}

/// IPC server answering status requests inside the daemon
pub struct IpcServer {
    socket_path: PathBuf,
}

impl IpcServer {
    /// Bind the status socket and serve requests on a background thread
    pub fn bind(
        socket_path: PathBuf,
        supervisor: Arc<TunnelSupervisor>,
    ) -> Result<Self, TunwardenError> {
        if let Some(parent) = socket_path.parent() {
            fs::create_dir_all(parent)?;
        }
        // A previous daemon may have left a stale socket behind
        let _ = fs::remove_file(&socket_path);

        let listener = UnixListener::bind(&socket_path)?;
        thread::spawn(move || Self::accept_loop(listener, supervisor));

        Ok(Self { socket_path })
    }

    fn accept_loop(listener: UnixListener, supervisor: Arc<TunnelSupervisor>) {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Err(e) = Self::handle_client(stream, &supervisor) {
                        warn!("Status request failed: {}", e);
                    }
                }
                Err(e) => {
                    warn!("Status socket accept failed: {}", e);
                    break;
                }
            }
        }
    }

    fn handle_client(
        mut stream: UnixStream,
        supervisor: &TunnelSupervisor,
    ) -> std::io::Result<()> {
        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer)?;

        let response = match serde_json::from_slice(&buffer) {
            Ok(IpcMessage::StatusRequest) => IpcMessage::StatusResponse(supervisor.status()),
            Ok(other) => {
                debug!("Ignoring unexpected IPC message: {:?}", other);
                return Ok(());
            }
            Err(e) => {
                debug!("Discarding malformed IPC message: {}", e);
                return Ok(());
            }
        };

        let data = serde_json::to_vec(&response)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        stream.write_all(&data)?;
        stream.flush()
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.socket_path);
    }
}
