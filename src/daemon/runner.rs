//! Daemonized supervision loop
//!
//! Runs after the process has daemonized: starts the tunnel client,
//! serves status requests, and winds the client down on SIGTERM/SIGINT
//! or when the client dies on its own.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

use tunwarden_core::config::TunnelConfig;
use tunwarden_core::error::TunwardenError;
use tunwarden_core::tunnel::TunnelSupervisor;

use crate::daemon::ipc::{get_default_socket_path, IpcServer};

/// How often the loop reconciles supervisor state against reality.
const WATCH_INTERVAL: Duration = Duration::from_secs(1);

/// Run the supervision loop until the tunnel ends
///
/// Must be called in the daemonized process, before any tokio runtime
/// exists.
pub fn run_daemon(config: TunnelConfig) -> Result<(), TunwardenError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(supervise(config))
}

async fn supervise(config: TunnelConfig) -> Result<(), TunwardenError> {
    let supervisor = Arc::new(TunnelSupervisor::new(config));

    supervisor.start().await.map_err(TunwardenError::Supervisor)?;

    let _ipc = IpcServer::bind(get_default_socket_path(), Arc::clone(&supervisor))?;

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut watch = tokio::time::interval(WATCH_INTERVAL);

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, stopping tunnel client");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, stopping tunnel client");
                break;
            }
            _ = watch.tick() => {
                if !supervisor.is_running() {
                    // Implicit exit: the client died without a stop, the
                    // supervisor has already reconciled, nothing to kill.
                    info!("Tunnel client exited on its own, shutting down");
                    return Ok(());
                }
            }
        }
    }

    supervisor.stop().await.map_err(TunwardenError::Supervisor)?;
    Ok(())
}
