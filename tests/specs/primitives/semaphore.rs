//! Semaphore specs

use crate::prelude::*;

#[test]
fn permits_are_bounded() {
    let temp = Project::empty();
    temp.kord()
        .args(&["semaphore", "create", "pool", "--permits", "1"])
        .passes()
        .stdout_has("with 1 permits");

    temp.kord()
        .args(&["semaphore", "acquire", "pool", "--holder", "a"])
        .passes()
        .stdout_has("Acquired permit pool-a for a");
    temp.kord()
        .args(&["semaphore", "acquire", "pool", "--holder", "b"])
        .fails()
        .stderr_has("no permits available");

    temp.kord()
        .args(&["semaphore", "release", "pool", "--holder", "a"])
        .passes();
    temp.kord()
        .args(&["semaphore", "acquire", "pool", "--holder", "b"])
        .passes();
}

#[test]
fn permits_are_listed_as_objects() {
    let temp = Project::empty();
    temp.kord()
        .args(&["semaphore", "create", "pool", "--permits", "3"])
        .passes();
    temp.kord()
        .args(&["semaphore", "acquire", "pool", "--holder", "a"])
        .passes();
    temp.kord()
        .args(&["semaphore", "acquire", "pool", "--holder", "b"])
        .passes();

    let out = temp.kord().args(&["list", "permits"]).passes();
    let stdout = out.stdout();
    assert!(stdout.contains("pool-a"), "{stdout}");
    assert!(stdout.contains("pool-b"), "{stdout}");
}

#[test]
fn controller_reports_usage_on_the_semaphore() {
    let temp = Project::empty();
    temp.kord()
        .args(&["semaphore", "create", "pool", "--permits", "2"])
        .passes();
    temp.kord()
        .args(&["semaphore", "acquire", "pool", "--holder", "a"])
        .passes();

    let counted = wait_for(SPEC_WAIT_MAX_MS, || {
        temp.kord()
            .args(&["-o", "json", "get", "semaphore", "pool"])
            .passes()
            .stdout()
            .contains("\"inUse\": 1")
    });
    assert!(counted, "semaphore status should count the permit");
}

#[test]
fn release_without_permit_is_refused() {
    let temp = Project::empty();
    temp.kord()
        .args(&["semaphore", "create", "pool", "--permits", "1"])
        .passes();
    temp.kord()
        .args(&["semaphore", "release", "pool", "--holder", "ghost"])
        .fails()
        .stderr_has("ghost does not hold it");
}
