//! Configuration module
//!
//! Handles loading and saving the supervisor configuration from TOML files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod toml_config;

/// Tunnel supervision configuration
///
/// Describes where the tunnel client binary and its configuration file
/// live. The contents of the client configuration file are opaque to the
/// supervisor, it only hands the path to the client via `-c`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelConfig {
    /// Path to the tunnel client's own configuration file
    pub client_config: PathBuf,

    /// Explicit path to the tunnel client binary
    ///
    /// When absent the binary is resolved by convention: a `frpc`
    /// executable co-located with the client configuration file, then a
    /// `$PATH` lookup.
    pub client_binary: Option<PathBuf>,
}

impl TunnelConfig {
    /// Create a new tunnel configuration
    pub fn new(client_config: PathBuf) -> Self {
        Self {
            client_config,
            client_binary: None,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.client_config.as_os_str().is_empty() {
            return Err("Client config path cannot be empty".to_string());
        }

        if let Some(binary) = &self.client_binary {
            if binary.as_os_str().is_empty() {
                return Err("Client binary path cannot be empty when set".to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_minimal_config() {
        let config = TunnelConfig::new(PathBuf::from("/etc/frpc/frpc.toml"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_paths() {
        let config = TunnelConfig::new(PathBuf::new());
        assert!(config.validate().is_err());

        let config = TunnelConfig {
            client_config: PathBuf::from("/etc/frpc/frpc.toml"),
            client_binary: Some(PathBuf::new()),
        };
        assert!(config.validate().is_err());
    }
}
