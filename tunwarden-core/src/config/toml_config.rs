//! TOML configuration file I/O
//!
//! Handles loading and saving the supervisor configuration to/from TOML
//! files in the user's configuration directory.

use crate::config::TunnelConfig;
use crate::error::{ConfigError, TunwardenError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete TOML configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Tunnel supervision settings
    #[serde(rename = "tunnel")]
    pub tunnel: TunnelConfig,
}

impl TomlConfig {
    /// Create a new TOML configuration
    pub fn new(tunnel: TunnelConfig) -> Self {
        Self { tunnel }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, TunwardenError> {
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TunwardenError::Config(ConfigError::LoadFailed {
                path: path.to_string_lossy().to_string(),
            }),
            _ => TunwardenError::Config(ConfigError::IoError {
                message: format!("Failed to read config file: {}", e),
            }),
        })?;

        let config: TomlConfig = toml::from_str(&contents).map_err(|e| {
            TunwardenError::Config(ConfigError::ValidationError {
                message: format!("Failed to parse config file: {}", e),
            })
        })?;

        config.tunnel.validate().map_err(|e| {
            TunwardenError::Config(ConfigError::ValidationError { message: e })
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<(), TunwardenError> {
        let contents = toml::to_string_pretty(self).map_err(|e| {
            TunwardenError::Config(ConfigError::ValidationError {
                message: format!("Failed to serialize config: {}", e),
            })
        })?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TunwardenError::Config(ConfigError::IoError {
                    message: format!("Failed to create config directory: {}", e),
                })
            })?;
        }

        std::fs::write(path, contents).map_err(|_| {
            TunwardenError::Config(ConfigError::SaveFailed {
                path: path.to_string_lossy().to_string(),
            })
        })?;

        Ok(())
    }
}

/// Default configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the default configuration directory
///
/// Returns ~/.config/tunwarden, or TUNWARDEN_CONFIG_DIR environment
/// variable if set (used by tests to isolate their state).
pub fn get_config_dir() -> Result<PathBuf, TunwardenError> {
    if let Ok(config_dir) = std::env::var("TUNWARDEN_CONFIG_DIR") {
        return Ok(PathBuf::from(config_dir));
    }

    let home = std::env::var("HOME").map_err(|_| {
        TunwardenError::Config(ConfigError::IoError {
            message: "HOME environment variable not set".to_string(),
        })
    })?;

    Ok(PathBuf::from(home).join(".config").join("tunwarden"))
}

/// Get the default configuration file path
pub fn get_config_path() -> Result<PathBuf, TunwardenError> {
    let config_dir = get_config_dir()?;
    Ok(config_dir.join(CONFIG_FILE_NAME))
}

/// Check whether a configuration file already exists at the default path
pub fn config_exists() -> Result<bool, TunwardenError> {
    Ok(get_config_path()?.exists())
}

/// Load the supervisor configuration from the default TOML file
pub fn load_config() -> Result<TunnelConfig, TunwardenError> {
    let config_path = get_config_path()?;
    Ok(TomlConfig::from_file(&config_path)?.tunnel)
}

/// Save the supervisor configuration to the default TOML file
pub fn save_config(config: &TunnelConfig) -> Result<(), TunwardenError> {
    let config_path = get_config_path()?;
    TomlConfig::new(config.clone()).to_file(&config_path)
}
