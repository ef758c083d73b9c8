//! Integration tests for the status and stop commands
//!
//! Tests CLI behavior when no daemon is running, with the runtime
//! directory isolated so a developer's real tunnel is never touched.

use std::process::Command;
use tempfile::TempDir;

const TUNWARDEN_BINARY: &str = "target/debug/tunwarden";

#[test]
fn test_status_command_exists() {
    let output = Command::new(TUNWARDEN_BINARY)
        .args(["status", "--help"])
        .output()
        .expect("Failed to run status --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("status"));
}

#[test]
fn test_status_without_daemon() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let output = Command::new(TUNWARDEN_BINARY)
        .arg("status")
        .env("TUNWARDEN_RUNTIME_DIR", temp_dir.path())
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to run status without daemon");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("not running"));
}

#[test]
fn test_stop_without_daemon_is_success() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let output = Command::new(TUNWARDEN_BINARY)
        .arg("stop")
        .env("TUNWARDEN_RUNTIME_DIR", temp_dir.path())
        .output()
        .expect("Failed to run stop without daemon");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("not running"));
}

#[test]
fn test_start_without_config_fails_with_config_error() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let output = Command::new(TUNWARDEN_BINARY)
        .arg("start")
        .env("TUNWARDEN_CONFIG_DIR", temp_dir.path())
        .env("TUNWARDEN_RUNTIME_DIR", temp_dir.path())
        .output()
        .expect("Failed to run start without config");

    assert_eq!(output.status.code(), Some(2));
}
