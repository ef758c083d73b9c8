//! Tunnel management commands
//!
//! The start command daemonizes a supervisor process; stop and status
//! talk to it through the pid file and the status socket.

use std::path::PathBuf;

use chrono::Utc;
use colored::Colorize;
use tracing::info;

use tunwarden_core::config::{toml_config, TunnelConfig};
use tunwarden_core::error::TunwardenError;
use tunwarden_core::tunnel::launcher::resolve_client_binary;

use crate::daemon::ipc::{get_default_socket_path, IpcClient};
use crate::daemon::process::{get_default_pid_file, DaemonProcess};
use crate::daemon::runner;

/// Load the supervisor configuration, from an explicit path or the
/// default location
fn load_config(config_override: Option<PathBuf>) -> Result<TunnelConfig, TunwardenError> {
    match config_override {
        Some(path) => Ok(toml_config::TomlConfig::from_file(&path)?.tunnel),
        None => toml_config::load_config(),
    }
}

/// Run the start command
pub fn run_start(config_override: Option<PathBuf>) -> Result<(), TunwardenError> {
    let config = load_config(config_override)?;

    // Resolve the client binary before daemonizing so a broken
    // deployment fails here, synchronously, instead of in the journal.
    let binary = resolve_client_binary(&config).map_err(TunwardenError::Supervisor)?;

    let daemon = DaemonProcess::new(get_default_pid_file());
    if daemon.is_running()? {
        println!("Tunnel is already running.");
        return Ok(());
    }

    println!(
        "Starting tunnel client {} with config {}",
        binary.display(),
        config.client_config.display()
    );

    // Everything after this line runs in the daemon
    daemon.daemonize()?;
    info!("Supervisor daemon starting");
    runner::run_daemon(config)
}

/// Run the stop command
pub fn run_stop() -> Result<(), TunwardenError> {
    let daemon = DaemonProcess::new(get_default_pid_file());
    if !daemon.is_running()? {
        println!("Tunnel is not running.");
        return Ok(());
    }

    daemon.stop()?;
    println!("Tunnel stopped.");
    Ok(())
}

/// Run the status command
pub fn run_status() -> Result<(), TunwardenError> {
    let daemon = DaemonProcess::new(get_default_pid_file());
    if !daemon.is_running()? {
        println!("Tunnel: {}", "not running".red());
        return Ok(());
    }

    match IpcClient::new(get_default_socket_path()).get_status() {
        Ok(report) if report.is_active() => {
            println!("Tunnel: {}", "active".green().bold());
            if let Some(pid) = report.pid {
                println!("  client PID: {}", pid);
            }
            if let Some(started_at) = report.started_at {
                let uptime = Utc::now().signed_duration_since(started_at);
                println!("  up since:   {} ({}s)", started_at, uptime.num_seconds());
            }
        }
        Ok(_) => {
            // Daemon alive but the client is not; it is about to exit
            println!("Tunnel: {}", "winding down".yellow());
        }
        Err(_) => {
            // Daemon alive but not answering yet (still starting up)
            println!("Tunnel: {}", "starting".yellow());
        }
    }

    Ok(())
}
