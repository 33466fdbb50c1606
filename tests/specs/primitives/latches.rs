//! Once and WaitGroup specs

use crate::prelude::*;

#[test]
fn once_runs_for_a_single_executor() {
    let temp = Project::empty();
    temp.kord().args(&["once", "create", "migrate"]).passes();
    temp.kord()
        .args(&["once", "mark", "migrate", "--executor", "a"])
        .passes()
        .stdout_has("migrate executed by a");
    temp.kord()
        .args(&["once", "mark", "migrate", "--executor", "b"])
        .fails()
        .stderr_has("already executed by a");
}

#[test]
fn waitgroup_counts_down_to_done() {
    let temp = Project::empty();
    temp.kord().args(&["waitgroup", "create", "workers"]).passes();
    temp.kord()
        .args(&["waitgroup", "add", "workers", "2"])
        .passes()
        .stdout_has("workers counter: 2");
    temp.kord()
        .args(&["waitgroup", "done", "workers"])
        .passes()
        .stdout_has("workers counter: 1");
    temp.kord()
        .args(&["waitgroup", "wait", "workers", "--timeout", "300ms"])
        .fails()
        .stderr_has("timed out");

    temp.kord().args(&["waitgroup", "done", "workers"]).passes();
    temp.kord()
        .args(&["waitgroup", "wait", "workers", "--timeout", "5s"])
        .passes()
        .stdout_has("Waitgroup workers done");
}

#[test]
fn waitgroup_accepts_negative_delta() {
    let temp = Project::empty();
    temp.kord().args(&["waitgroup", "create", "workers"]).passes();
    temp.kord().args(&["waitgroup", "add", "workers", "3"]).passes();
    temp.kord()
        .args(&["waitgroup", "add", "workers", "-2"])
        .passes()
        .stdout_has("workers counter: 1");
}
