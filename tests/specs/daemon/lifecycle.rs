//! Daemon lifecycle specs
//!
//! Verify daemon start/stop/status lifecycle.

use crate::prelude::*;

#[test]
fn daemon_status_when_not_running() {
    let temp = Project::empty();
    temp.kord()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_start_reports_success() {
    let temp = Project::empty();
    temp.kord()
        .args(&["daemon", "start"])
        .passes()
        .stdout_has("Daemon started");
}

#[test]
fn daemon_start_twice_reports_already_running() {
    let temp = Project::empty();
    temp.kord().args(&["daemon", "start"]).passes();
    temp.kord()
        .args(&["daemon", "start"])
        .passes()
        .stdout_has("Daemon already running");
}

#[test]
fn daemon_status_shows_running_details() {
    let temp = Project::empty();
    temp.kord().args(&["daemon", "start"]).passes();
    temp.kord()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Status: running")
        .stdout_has("Version:")
        .stdout_has("Uptime:")
        .stdout_has("Objects: 0");
}

#[test]
fn daemon_status_counts_objects() {
    let temp = Project::empty();
    temp.kord().args(&["mutex", "create", "a"]).passes();
    temp.kord().args(&["job", "create", "b"]).passes();
    temp.kord()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Objects: 2");
}

#[test]
fn daemon_stop_reports_success() {
    let temp = Project::empty();
    temp.kord().args(&["daemon", "start"]).passes();
    temp.kord()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("Daemon stopped");
    temp.kord()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_stop_when_not_running() {
    let temp = Project::empty();
    temp.kord()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_creates_state_files() {
    let temp = Project::empty();
    temp.kord().args(&["daemon", "start"]).passes();
    let state = temp.state_path();

    let ready = wait_for(SPEC_WAIT_MAX_MS, || {
        state.join("daemon.pid").exists() && state.join("daemon.version").exists()
    });
    assert!(ready, "daemon.pid and daemon.version should exist");

    let has_socket = std::fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .any(|e| e.path().extension().is_some_and(|ext| ext == "sock"));
    assert!(has_socket, "daemon socket should be in KORD_SOCKET_DIR");
}

#[test]
fn commands_auto_start_the_daemon() {
    let temp = Project::empty();
    temp.kord().args(&["list", "mutex"]).passes();
    temp.kord()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Status: running");
}

#[test]
fn state_survives_a_restart() {
    let temp = Project::empty();
    temp.kord().args(&["semaphore", "create", "pool", "--permits", "2"]).passes();
    temp.kord().args(&["daemon", "stop"]).passes();

    temp.kord()
        .args(&["get", "semaphore", "pool"])
        .passes()
        .stdout_has("pool");
}

#[test]
fn invalid_config_fails_start_with_reason() {
    let temp = Project::empty();
    temp.file("config.toml", "[scheduler]\nthreads = 2\n");

    temp.kord()
        .args(&["daemon", "start"])
        .fails()
        .stderr_has("Invalid config")
        .stderr_lacks("Connection timeout");
}
