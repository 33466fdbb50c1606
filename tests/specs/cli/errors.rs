//! Argument and error rendering specs

use crate::prelude::*;

#[test]
fn unknown_kind_is_rejected_by_the_parser() {
    let temp = Project::empty();
    temp.kord()
        .args(&["get", "queue", "q"])
        .fails()
        .stderr_has("unknown kind: queue");
}

#[test]
fn malformed_gate_condition_is_rejected() {
    let temp = Project::empty();
    temp.kord()
        .args(&["gate", "create", "g", "--condition", "lease:leader=Expired"])
        .fails()
        .stderr_has("unknown state 'Expired'");
}

#[test]
fn missing_resource_shows_suggestion() {
    let temp = Project::empty();
    temp.kord()
        .args(&["get", "mutex", "nope"])
        .fails()
        .stderr_has("error: not found")
        .stderr_has("suggestions:");
}

#[test]
fn refusal_names_the_current_holder() {
    let temp = Project::empty();
    temp.kord().args(&["mutex", "create", "m"]).passes();
    temp.kord()
        .args(&["mutex", "lock", "m", "--holder", "alice"])
        .passes();
    temp.kord()
        .args(&["mutex", "lock", "m", "--holder", "bob"])
        .fails()
        .stderr_has("held by alice")
        .stderr_has("'alice' currently holds it");
}
