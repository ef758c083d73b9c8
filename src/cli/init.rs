//! Init command implementation
//!
//! Writes the supervisor's own configuration file. The tunnel client's
//! configuration stays whatever the user points us at; we never touch it.

use std::path::PathBuf;

use tunwarden_core::config::toml_config;
use tunwarden_core::config::TunnelConfig;
use tunwarden_core::error::{ConfigError, TunwardenError};

/// Run the init command
pub fn run_init(
    client_config: PathBuf,
    client_binary: Option<PathBuf>,
    force: bool,
) -> Result<(), TunwardenError> {
    if toml_config::config_exists()? && !force {
        println!("Configuration already exists, use --force to overwrite.");
        println!("  {}", toml_config::get_config_path()?.display());
        return Ok(());
    }

    let config = TunnelConfig {
        client_config,
        client_binary,
    };

    config
        .validate()
        .map_err(|e| TunwardenError::Config(ConfigError::ValidationError { message: e }))?;

    toml_config::save_config(&config)?;

    println!(
        "Configuration saved to {}",
        toml_config::get_config_path()?.display()
    );
    println!();
    println!("You can now use:");
    println!("  tunwarden start   - Start the tunnel client");
    println!("  tunwarden stop    - Stop the tunnel client");
    println!("  tunwarden status  - Show tunnel status");

    Ok(())
}
