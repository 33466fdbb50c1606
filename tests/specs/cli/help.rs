//! Help and completion specs
//!
//! None of these need a daemon.

use crate::prelude::*;

#[test]
fn help_lists_every_primitive() {
    let temp = Project::empty();
    let out = temp.kord().args(&["--help"]).passes();
    for command in [
        "daemon", "mutex", "rwmutex", "semaphore", "barrier", "lease", "gate", "once",
        "waitgroup", "job", "get", "list", "delete",
    ] {
        assert!(out.stdout().contains(command), "missing {command} in help");
    }
}

#[test]
fn version_flag_prints_version() {
    let temp = Project::empty();
    temp.kord()
        .args(&["--version"])
        .passes()
        .stdout_has(env!("CARGO_PKG_VERSION"));
}

#[test]
fn subcommand_help_describes_flags() {
    let temp = Project::empty();
    temp.kord()
        .args(&["mutex", "lock", "--help"])
        .passes()
        .stdout_has("--holder")
        .stdout_has("--wait")
        .stdout_has("--timeout");
}

#[test]
fn completions_are_generated_without_a_daemon() {
    let temp = Project::empty();
    temp.kord()
        .args(&["completions", "bash"])
        .passes()
        .stdout_has("kord");
    assert!(!temp.state_path().join("daemon.pid").exists());
}
