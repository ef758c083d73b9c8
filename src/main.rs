//! tunwarden - Reverse-Proxy Tunnel Client Supervisor
//!
//! A command-line tool for supervising an frp-style tunnel client:
//! start it in the background, keep an eye on it, stop it cleanly.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tunwarden_core::{error::TunwardenError, init_logging};

mod cli;
mod daemon;

#[derive(Parser)]
#[command(name = "tunwarden")]
#[command(about = "Reverse-proxy tunnel client supervisor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the supervisor configuration
    Init {
        /// Path to the tunnel client's own configuration file
        client_config: PathBuf,

        /// Explicit path to the tunnel client binary
        #[arg(long)]
        binary: Option<PathBuf>,

        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
    /// Start the tunnel client in the background
    Start {
        /// Use this supervisor config file instead of the default
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Stop the tunnel client
    Stop,
    /// Show tunnel status
    Status,
}

fn main() {
    // Initialize logging
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(2);
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init {
            client_config,
            binary,
            force,
        } => cli::init::run_init(client_config, binary, force),
        Commands::Start { config } => cli::tunnel::run_start(config),
        Commands::Stop => cli::tunnel::run_stop(),
        Commands::Status => cli::tunnel::run_status(),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            let exit_code = match e {
                // Configuration and deployment errors (exit code 2)
                TunwardenError::Config(_)
                | TunwardenError::Toml(_)
                | TunwardenError::TomlSerialize(_) => 2,
                // Supervisor errors - distinguish deployment vs runtime
                TunwardenError::Supervisor(ref supervisor_error) => match supervisor_error {
                    tunwarden_core::error::SupervisorError::BinaryNotFound { .. } => 2,
                    tunwarden_core::error::SupervisorError::AlreadyRunning { .. } => 0,
                    tunwarden_core::error::SupervisorError::SpawnFailed { .. } => 1,
                    tunwarden_core::error::SupervisorError::SignalFailed { .. } => 1,
                },
                // IO errors (exit code 1 - runtime)
                TunwardenError::Io(_) => 1,
            };

            eprintln!("{}", e);
            std::process::exit(exit_code);
        }
    }
}
