//! Error types for the tunwarden supervisor
//!
//! This module defines all error types used throughout the application,
//! providing consistent error handling and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the tunwarden application
#[derive(Error, Debug)]
pub enum TunwardenError {
    /// Errors related to configuration loading/parsing
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors related to supervising the tunnel client process
    #[error("Supervisor error: {0}")]
    Supervisor(#[from] SupervisorError),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {path}")]
    LoadFailed { path: String },

    #[error("Failed to save configuration file: {path}")]
    SaveFailed { path: String },

    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    #[error("Configuration validation error: {message}")]
    ValidationError { message: String },

    #[error("I/O error: {message}")]
    IoError { message: String },
}

/// Tunnel client supervision errors
///
/// The variants map one-to-one onto the numeric result codes exposed to
/// host-application bridges, see [`SupervisorError::result_code`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SupervisorError {
    #[error("Tunnel client is already running with PID {pid}")]
    AlreadyRunning { pid: u32 },

    #[error("Tunnel client binary not found or not executable: {}", path.display())]
    BinaryNotFound { path: PathBuf },

    #[error("Failed to spawn tunnel client: {reason}")]
    SpawnFailed { reason: String },

    #[error("Failed to signal tunnel client: {reason}")]
    SignalFailed { reason: String },
}

impl SupervisorError {
    /// Stable numeric code for language-boundary bridges.
    ///
    /// Start codes: 0 success, -1 already running, -2 binary not found,
    /// -3 spawn failed. Stop codes: 0 success, -1 signal failed. Success
    /// is 0 by convention and has no variant here.
    pub fn result_code(&self) -> i32 {
        match self {
            SupervisorError::AlreadyRunning { .. } => -1,
            SupervisorError::BinaryNotFound { .. } => -2,
            SupervisorError::SpawnFailed { .. } => -3,
            SupervisorError::SignalFailed { .. } => -1,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, TunwardenError>;
