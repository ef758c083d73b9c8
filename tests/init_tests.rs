//! Integration tests for the init command

use std::fs;
use std::process::Command;
use tempfile::TempDir;

const TUNWARDEN_BINARY: &str = "target/debug/tunwarden";

#[test]
fn test_init_writes_config_file() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let output = Command::new(TUNWARDEN_BINARY)
        .args(["init", "/srv/tunnel/frpc.toml", "--binary", "/usr/local/bin/frpc"])
        .env("TUNWARDEN_CONFIG_DIR", temp_dir.path())
        .output()
        .expect("failed to run init");

    assert!(output.status.success());

    let config_path = temp_dir.path().join("config.toml");
    assert!(config_path.exists());

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("client_config"));
    assert!(contents.contains("/srv/tunnel/frpc.toml"));
    assert!(contents.contains("/usr/local/bin/frpc"));
}

#[test]
fn test_init_preserves_existing_config_without_force() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        "[tunnel]\nclient_config = \"/original/frpc.toml\"\n",
    )
    .unwrap();

    let output = Command::new(TUNWARDEN_BINARY)
        .args(["init", "/other/frpc.toml"])
        .env("TUNWARDEN_CONFIG_DIR", temp_dir.path())
        .output()
        .expect("failed to run init");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("already exists"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("/original/frpc.toml"));
}

#[test]
fn test_init_force_overwrites() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        "[tunnel]\nclient_config = \"/original/frpc.toml\"\n",
    )
    .unwrap();

    let output = Command::new(TUNWARDEN_BINARY)
        .args(["init", "/other/frpc.toml", "--force"])
        .env("TUNWARDEN_CONFIG_DIR", temp_dir.path())
        .output()
        .expect("failed to run init");

    assert!(output.status.success());
    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("/other/frpc.toml"));
}
