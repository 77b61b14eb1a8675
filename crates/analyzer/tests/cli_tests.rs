//! CLI integration tests

use std::process::Command;

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "capacity-analyzer", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("Fleet capacity analysis and forecasting"),
        "Should show app description"
    );
    assert!(stdout.contains("analyze"), "Should show analyze command");
    assert!(stdout.contains("forecast"), "Should show forecast command");
    assert!(stdout.contains("run"), "Should show run command");
    assert!(stdout.contains("show"), "Should show show command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = Command::new("cargo")
        .args(["run", "-p", "capacity-analyzer", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(
        stdout.contains("capacity-analyzer"),
        "Should show binary name"
    );
}

/// Test show subcommand help lists the artifact targets
#[test]
fn test_show_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "capacity-analyzer", "--", "show", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Show help should succeed");
    assert!(stdout.contains("summary"), "Should list summary target");
    assert!(
        stdout.contains("recommendations"),
        "Should list recommendations target"
    );
}
