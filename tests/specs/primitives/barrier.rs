//! Barrier specs

use crate::prelude::*;

#[test]
fn barrier_opens_when_all_arrive() {
    let temp = Project::empty();
    temp.kord()
        .args(&["barrier", "create", "stage", "--expected", "2"])
        .passes();
    temp.kord()
        .args(&["barrier", "arrive", "stage", "--holder", "a"])
        .passes()
        .stdout_has("a arrived at stage");
    temp.kord()
        .args(&["barrier", "wait", "stage", "--timeout", "300ms"])
        .fails()
        .stderr_has("timed out");

    temp.kord()
        .args(&["barrier", "arrive", "stage", "--holder", "b"])
        .passes();
    temp.kord()
        .args(&["barrier", "wait", "stage", "--timeout", "5s"])
        .passes()
        .stdout_has("Barrier stage open (2 arrived)");
}

#[test]
fn barrier_quorum_opens_early() {
    let temp = Project::empty();
    temp.kord()
        .args(&["barrier", "create", "q", "--expected", "5", "--quorum", "2"])
        .passes();
    temp.kord()
        .args(&["barrier", "arrive", "q", "--holder", "a"])
        .passes();
    temp.kord()
        .args(&["barrier", "arrive", "q", "--holder", "b", "--wait", "--timeout", "5s"])
        .passes()
        .stdout_has("Barrier q open");
}

#[test]
fn arriving_twice_is_idempotent() {
    let temp = Project::empty();
    temp.kord()
        .args(&["barrier", "create", "stage", "--expected", "2"])
        .passes();
    temp.kord()
        .args(&["barrier", "arrive", "stage", "--holder", "a"])
        .passes();
    temp.kord()
        .args(&["barrier", "arrive", "stage", "--holder", "a"])
        .passes();

    let out = temp.kord().args(&["list", "arrivals"]).passes();
    assert_eq!(out.stdout().matches("stage-a").count(), 1);
}

#[test]
fn barrier_timeout_fails_it() {
    let temp = Project::empty();
    temp.kord()
        .args(&["barrier", "create", "late", "--expected", "3", "--timeout", "1s"])
        .passes();
    temp.kord()
        .args(&["barrier", "wait", "late", "--timeout", "10s"])
        .fails()
        .stderr_has("failed");
}
