// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use kord_core::coordination::{Mutex, MutexSpec, Once, OnceSpec, WaitGroup, WaitGroupSpec};
use kord_core::{FakeClock, ObjectKey, ObjectMeta, SequentialIdGen};
use kord_storage::{FaultyStore, MemoryStore};

fn once(name: &str, ttl: Option<Duration>) -> kord_core::Object {
    Once::new(ObjectMeta::new("default", name), OnceSpec { ttl }).into_object()
}

#[tokio::test]
async fn sweep_deletes_only_elapsed_ttls() {
    let clock = FakeClock::new();
    let store = Arc::new(MemoryStore::with_clock(
        clock.clone(),
        SequentialIdGen::new("uid"),
    ));
    store
        .create(once("short", Some(Duration::from_secs(60))))
        .await
        .unwrap();
    store
        .create(once("long", Some(Duration::from_secs(3600))))
        .await
        .unwrap();
    store.create(once("forever", None)).await.unwrap();
    store
        .create(
            WaitGroup::new(
                ObjectMeta::new("default", "batch"),
                WaitGroupSpec {
                    ttl: Some(Duration::from_secs(30)),
                },
            )
            .into_object(),
        )
        .await
        .unwrap();
    // A ttl on a Mutex bounds holds, not the object
    store
        .create(
            Mutex::new(
                ObjectMeta::new("default", "m"),
                MutexSpec {
                    ttl: Some(Duration::from_secs(1)),
                },
            )
            .into_object(),
        )
        .await
        .unwrap();

    clock.advance(Duration::from_secs(120));
    let janitor = Janitor::new(store.clone(), clock, JanitorConfig::default());
    let stats = janitor.sweep().await.unwrap();
    assert_eq!(
        stats,
        SweepStats {
            scanned: 4,
            deleted: 2
        }
    );

    let remaining: Vec<String> = store
        .snapshot()
        .iter()
        .map(|o| o.metadata().name.clone())
        .collect();
    assert_eq!(remaining, vec!["long", "forever", "m"]);
}

#[tokio::test]
async fn sweep_ignores_objects_already_gone() {
    let clock = FakeClock::new();
    let store = Arc::new(FaultyStore::new(MemoryStore::with_clock(
        clock.clone(),
        SequentialIdGen::new("uid"),
    )));
    store
        .create(once("short", Some(Duration::from_secs(1))))
        .await
        .unwrap();
    store.fail_delete(StoreError::NotFound("Once/default/short".to_string()));

    clock.advance(Duration::from_secs(2));
    let janitor = Janitor::new(store.clone(), clock, JanitorConfig::default());
    let stats = janitor.sweep().await.unwrap();
    assert_eq!(stats.deleted, 0);
    assert!(store
        .inner()
        .get(&ObjectKey::new(Kind::Once, "default", "short"))
        .await
        .is_ok());
}
