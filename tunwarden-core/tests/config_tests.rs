//! Integration tests for configuration file handling

use std::path::PathBuf;
use tempfile::TempDir;
use tunwarden_core::config::toml_config::{
    config_exists, get_config_path, load_config, save_config,
};
use tunwarden_core::config::TunnelConfig;

/// Single test so the TUNWARDEN_CONFIG_DIR override cannot race a
/// parallel test in this binary.
#[test]
fn test_default_path_round_trip_with_env_override() {
    let temp_dir = TempDir::new().unwrap();
    std::env::set_var("TUNWARDEN_CONFIG_DIR", temp_dir.path());

    assert!(!config_exists().unwrap());

    let config = TunnelConfig {
        client_config: PathBuf::from("/srv/tunnel/frpc.toml"),
        client_binary: None,
    };
    save_config(&config).unwrap();

    assert!(config_exists().unwrap());
    assert_eq!(
        get_config_path().unwrap(),
        temp_dir.path().join("config.toml")
    );

    let loaded = load_config().unwrap();
    assert_eq!(loaded, config);

    std::env::remove_var("TUNWARDEN_CONFIG_DIR");
}
