//! Mutex and RWMutex specs

use crate::prelude::*;

#[test]
fn mutex_lock_unlock_hands_over() {
    let temp = Project::empty();
    temp.kord().args(&["mutex", "create", "deploy"]).passes();

    temp.kord()
        .args(&["mutex", "lock", "deploy", "--holder", "alice"])
        .passes()
        .stdout_has("Locked deploy for alice");
    temp.kord()
        .args(&["mutex", "lock", "deploy", "--holder", "bob"])
        .fails();
    temp.kord()
        .args(&["mutex", "unlock", "deploy", "--holder", "alice"])
        .passes()
        .stdout_has("Unlocked deploy");
    temp.kord()
        .args(&["mutex", "lock", "deploy", "--holder", "bob"])
        .passes();
}

#[test]
fn mutex_unlock_by_non_holder_is_refused() {
    let temp = Project::empty();
    temp.kord().args(&["mutex", "create", "m"]).passes();
    temp.kord()
        .args(&["mutex", "lock", "m", "--holder", "alice"])
        .passes();
    temp.kord()
        .args(&["mutex", "unlock", "m", "--holder", "mallory"])
        .fails()
        .stderr_has("mallory does not hold it");
}

#[test]
fn mutex_wait_times_out_while_held() {
    let temp = Project::empty();
    temp.kord().args(&["mutex", "create", "m"]).passes();
    temp.kord()
        .args(&["mutex", "lock", "m", "--holder", "alice"])
        .passes();
    temp.kord()
        .args(&["mutex", "lock", "m", "--holder", "bob", "--wait", "--timeout", "300ms"])
        .fails()
        .stderr_has("timed out");
}

#[test]
fn mutex_hold_expires_after_ttl() {
    let temp = Project::empty();
    temp.kord().args(&["mutex", "create", "m"]).passes();
    temp.kord()
        .args(&["mutex", "lock", "m", "--holder", "alice", "--ttl", "1s"])
        .passes();
    temp.kord()
        .args(&["mutex", "lock", "m", "--holder", "bob", "--wait", "--timeout", "10s"])
        .passes()
        .stdout_has("Locked m for bob");
}

#[test]
fn mutex_json_output_is_the_resource() {
    let temp = Project::empty();
    temp.kord().args(&["mutex", "create", "m"]).passes();
    temp.kord()
        .args(&["-o", "json", "mutex", "lock", "m", "--holder", "alice"])
        .passes()
        .stdout_has("\"kind\": \"Mutex\"")
        .stdout_has("\"holder\": \"alice\"");
}

#[test]
fn rwmutex_readers_share_and_exclude_writers() {
    let temp = Project::empty();
    temp.kord().args(&["rwmutex", "create", "cfg"]).passes();

    temp.kord()
        .args(&["rwmutex", "rlock", "cfg", "--holder", "r1"])
        .passes();
    temp.kord()
        .args(&["rwmutex", "rlock", "cfg", "--holder", "r2"])
        .passes();
    temp.kord()
        .args(&["rwmutex", "lock", "cfg", "--holder", "w"])
        .fails();

    temp.kord()
        .args(&["rwmutex", "runlock", "cfg", "--holder", "r1"])
        .passes();
    temp.kord()
        .args(&["rwmutex", "runlock", "cfg", "--holder", "r2"])
        .passes();
    temp.kord()
        .args(&["rwmutex", "lock", "cfg", "--holder", "w"])
        .passes()
        .stdout_has("Write-locked cfg for w");
    temp.kord()
        .args(&["rwmutex", "rlock", "cfg", "--holder", "r1"])
        .fails();
}
