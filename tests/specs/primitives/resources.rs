//! Generic get/list/delete specs

use crate::prelude::*;
use similar_asserts::assert_eq;

#[test]
fn namespaces_isolate_resources() {
    let temp = Project::empty();
    temp.kord()
        .args(&["-n", "team-a", "mutex", "create", "m"])
        .passes();

    temp.kord()
        .args(&["get", "mutex", "m"])
        .fails()
        .stderr_has("not found");
    temp.kord()
        .args(&["-n", "team-a", "get", "mutex", "m"])
        .passes()
        .stdout_has("team-a");
    temp.kord()
        .args(&["list", "mutexes"])
        .passes()
        .stdout_has("No resources found");
    temp.kord()
        .args(&["list", "mutex", "-A"])
        .passes()
        .stdout_has("team-a");
}

#[test]
fn delete_removes_the_resource() {
    let temp = Project::empty();
    temp.kord().args(&["mutex", "create", "m"]).passes();
    temp.kord()
        .args(&["delete", "mutex", "m"])
        .passes()
        .stdout_has("Deleted Mutex m");
    temp.kord()
        .args(&["get", "mutex", "m"])
        .fails()
        .stderr_has("not found");
}

#[test]
fn json_output_is_parseable() {
    let temp = Project::empty();
    temp.kord().args(&["mutex", "create", "m"]).passes();

    let out = temp.kord().args(&["-o", "json", "get", "mutex", "m"]).passes();
    let value: serde_json::Value = serde_json::from_str(&out.stdout()).unwrap();
    assert_eq!(value["kind"], "Mutex");
    assert_eq!(value["metadata"]["name"], "m");
    assert_eq!(value["metadata"]["namespace"], "default");

    let out = temp.kord().args(&["-o", "json", "list", "mutex"]).passes();
    let value: serde_json::Value = serde_json::from_str(&out.stdout()).unwrap();
    assert_eq!(value.as_array().map(Vec::len), Some(1));
}
