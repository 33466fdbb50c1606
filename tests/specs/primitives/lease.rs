//! Lease specs

use crate::prelude::*;

#[test]
fn lease_grant_and_release() {
    let temp = Project::empty();
    temp.kord()
        .args(&["lease", "create", "leader", "--ttl", "30s"])
        .passes()
        .stdout_has("Created lease leader");
    temp.kord()
        .args(&["lease", "acquire", "leader", "--holder", "a", "--timeout", "5s"])
        .passes()
        .stdout_has("Lease leader held by a");
    temp.kord()
        .args(&["lease", "wait", "leader", "--timeout", "300ms"])
        .fails()
        .stderr_has("timed out");

    temp.kord()
        .args(&["lease", "release", "leader", "--holder", "a"])
        .passes()
        .stdout_has("Released leader");
    temp.kord()
        .args(&["lease", "wait", "leader", "--timeout", "5s"])
        .passes()
        .stdout_has("Lease leader available");
}

#[test]
fn renew_counts_renewals() {
    let temp = Project::empty();
    temp.kord()
        .args(&["lease", "create", "leader", "--ttl", "30s"])
        .passes();
    temp.kord()
        .args(&["lease", "acquire", "leader", "--holder", "a", "--timeout", "5s"])
        .passes();
    temp.kord()
        .args(&["lease", "renew", "leader", "--holder", "a"])
        .passes()
        .stdout_has("(1 renewals)");
}

#[test]
fn contended_acquire_times_out() {
    let temp = Project::empty();
    temp.kord()
        .args(&["lease", "create", "leader", "--ttl", "30s"])
        .passes();
    temp.kord()
        .args(&["lease", "acquire", "leader", "--holder", "a", "--timeout", "5s"])
        .passes();
    temp.kord()
        .args(&["lease", "acquire", "leader", "--holder", "b", "--timeout", "500ms"])
        .fails()
        .stderr_has("timed out");
}
