//! Gate specs

use crate::prelude::*;

#[test]
fn gate_opens_when_job_succeeds() {
    let temp = Project::empty();
    temp.kord().args(&["job", "create", "build"]).passes();
    temp.kord()
        .args(&["gate", "create", "deploy", "-c", "job:build"])
        .passes()
        .stdout_has("Created gate deploy with 1 conditions");
    temp.kord()
        .args(&["gate", "wait", "deploy", "--timeout", "300ms"])
        .fails()
        .stderr_has("timed out");

    temp.kord()
        .args(&["job", "complete", "build"])
        .passes()
        .stdout_has("Job build Succeeded");
    temp.kord()
        .args(&["gate", "wait", "deploy", "--timeout", "5s"])
        .passes()
        .stdout_has("Gate deploy open");
}

#[test]
fn gate_waits_on_every_condition() {
    let temp = Project::empty();
    temp.kord().args(&["job", "create", "build"]).passes();
    temp.kord()
        .args(&["barrier", "create", "stage", "--expected", "1"])
        .passes();
    temp.kord()
        .args(&["gate", "create", "deploy", "-c", "job:build", "-c", "barrier:stage"])
        .passes()
        .stdout_has("with 2 conditions");

    temp.kord().args(&["job", "complete", "build"]).passes();
    temp.kord()
        .args(&["gate", "wait", "deploy", "--timeout", "300ms"])
        .fails()
        .stderr_has("timed out");

    temp.kord()
        .args(&["barrier", "arrive", "stage", "--holder", "a"])
        .passes();
    temp.kord()
        .args(&["gate", "wait", "deploy", "--timeout", "5s"])
        .passes()
        .stdout_has("Gate deploy open");
}
