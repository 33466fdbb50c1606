// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use kord_core::Kind;
use std::time::Duration;

#[test]
fn display_lists_context_and_numbered_suggestions() {
    let err = KordError::new("Something went wrong")
        .with_context("First context")
        .with_context("Second context")
        .with_suggestion("Try this")
        .with_suggestion("Or this");

    let output = err.to_string();
    assert!(output.contains("error: Something went wrong"));
    assert!(output.contains("-> First context"));
    assert!(output.contains("-> Second context"));
    assert!(output.contains("1. Try this"));
    assert!(output.contains("2. Or this"));
}

#[test]
fn lock_held_names_the_holder() {
    let err = KordError::from_client(&ClientError::Refused {
        key: ObjectKey::new(Kind::Mutex, "default", "deploy"),
        refusal: Refusal::LockHeld {
            holder: "worker-1".to_string(),
        },
    });
    let output = err.to_string();
    assert!(output.contains("Mutex/default/deploy"), "{output}");
    assert!(output.contains("'worker-1' currently holds it"));
    assert!(output.contains("--wait"));
}

#[test]
fn timeout_points_at_the_resource() {
    let err = KordError::from_client(&ClientError::Timeout {
        key: ObjectKey::new(Kind::Barrier, "default", "stage"),
        timeout: Duration::from_secs(2),
    });
    assert!(err.to_string().contains("kord get barrier stage"));
}

#[test]
fn daemon_not_running_suggests_start() {
    let err = KordError::from_daemon(&DaemonError::DaemonNotRunning);
    assert!(err.to_string().contains("kord daemon start"));
}

#[test]
fn anyhow_errors_are_downcast() {
    let wrapped = anyhow::Error::new(ClientError::Store(StoreError::NotFound(
        "Gate/default/g".to_string(),
    )));
    let err = KordError::from_anyhow(&wrapped);
    assert!(err.message.contains("Gate/default/g"));
    assert!(!err.suggestions.is_empty());

    let plain = anyhow::anyhow!("bad input").context("parsing --condition");
    let err = KordError::from_anyhow(&plain);
    assert_eq!(err.message, "parsing --condition");
    assert_eq!(err.context, vec!["bad input".to_string()]);
}
