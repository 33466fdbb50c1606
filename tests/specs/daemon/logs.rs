//! Daemon logs specs

use crate::prelude::*;

#[test]
fn daemon_logs_before_start() {
    let temp = Project::empty();
    temp.kord()
        .args(&["daemon", "logs"])
        .passes()
        .stdout_has("No daemon log");
}

#[test]
fn daemon_logs_show_startup_marker() {
    let temp = Project::empty();
    temp.kord().args(&["daemon", "start"]).passes();
    temp.kord()
        .args(&["daemon", "logs", "--lines", "10"])
        .passes()
        .stdout_has("kordd: starting");
}

#[test]
fn daemon_logs_show_ready_line() {
    let temp = Project::empty();
    temp.kord().args(&["daemon", "start"]).passes();

    let ready = wait_for(SPEC_WAIT_MAX_MS, || temp.daemon_log().contains("Daemon ready"));
    assert!(ready, "daemon log should report readiness");
    temp.kord()
        .args(&["daemon", "logs"])
        .passes()
        .stdout_has("Daemon ready");
}
