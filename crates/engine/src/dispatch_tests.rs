// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use kord_core::coordination::{
    barrier, lease, GateCondition, Job, JobSpec, Mutex, MutexSpec, Semaphore, SemaphoreSpec,
};
use kord_core::{Kind, ObjectMeta};

fn gate(namespace: &str, name: &str, conditions: Vec<GateCondition>) -> Gate {
    Gate::new(
        ObjectMeta::new(namespace, name),
        GateSpec {
            conditions,
            timeout: None,
        },
    )
}

fn semaphore(namespace: &str, name: &str) -> Object {
    Semaphore::new(
        ObjectMeta::new(namespace, name),
        SemaphoreSpec {
            permits: 1,
            ttl: None,
        },
    )
    .into_object()
}

fn on_semaphore(name: &str) -> GateCondition {
    GateCondition::Semaphore {
        name: name.to_string(),
        value: Some(1),
    }
}

#[test]
fn own_kind_maps_to_itself() {
    let registry = Registry::standard();
    let object = Mutex::new(ObjectMeta::new("default", "m"), MutexSpec::default()).into_object();
    assert_eq!(
        affected_keys(&object, &registry, &[]),
        vec![ObjectKey::new(Kind::Mutex, "default", "m")]
    );
}

#[test]
fn children_map_to_their_parent() {
    let registry = Registry::standard();
    let arrival = barrier::arrival("team", "start", "w1").into_object();
    assert_eq!(
        affected_keys(&arrival, &registry, &[]),
        vec![ObjectKey::new(Kind::Barrier, "team", "start")]
    );

    let request = lease::request("default", "leader", "a", None, None).into_object();
    assert_eq!(
        affected_keys(&request, &registry, &[]),
        vec![ObjectKey::new(Kind::Lease, "default", "leader")]
    );
}

#[test]
fn unlabelled_child_maps_nowhere() {
    let registry = Registry::standard();
    let mut arrival = barrier::arrival("default", "start", "w1");
    arrival.metadata.labels.clear();
    assert!(affected_keys(&arrival.into_object(), &registry, &[]).is_empty());
}

#[test]
fn referenced_kinds_wake_gates_in_the_same_namespace() {
    let registry = Registry::standard();
    let gates = vec![
        gate("default", "deploy", vec![on_semaphore("db")]),
        gate("default", "other", vec![on_semaphore("cache")]),
        gate("team", "elsewhere", vec![on_semaphore("db")]),
    ];
    let keys = affected_keys(&semaphore("default", "db"), &registry, &gates);
    assert_eq!(
        keys,
        vec![
            ObjectKey::new(Kind::Semaphore, "default", "db"),
            ObjectKey::new(Kind::Gate, "default", "deploy"),
        ]
    );
}

#[test]
fn jobs_only_wake_gates() {
    let registry = Registry::standard();
    let job = Job::new(ObjectMeta::new("default", "build"), JobSpec {}).into_object();
    let gates = vec![gate(
        "default",
        "release",
        vec![GateCondition::Job {
            name: "build".to_string(),
        }],
    )];
    assert_eq!(
        affected_keys(&job, &registry, &gates),
        vec![ObjectKey::new(Kind::Gate, "default", "release")]
    );
}

#[tokio::test]
async fn keys_for_lists_gates_from_the_store() {
    let store = kord_storage::MemoryStore::new();
    store
        .create(gate("default", "deploy", vec![on_semaphore("db")]).into_object())
        .await
        .unwrap();
    let keys = keys_for(&store, &Registry::standard(), &semaphore("default", "db"))
        .await
        .unwrap();
    assert!(keys.contains(&ObjectKey::new(Kind::Gate, "default", "deploy")));
}
