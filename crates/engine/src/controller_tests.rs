// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use kord_core::coordination::{
    barrier, Barrier, BarrierPhase, BarrierSpec, GateCondition, GatePhase, GateSpec, Mutex,
    MutexPhase, MutexSpec,
};
use kord_core::{FakeClock, Kind, ObjectMeta, SequentialIdGen};
use kord_storage::{get_as, FaultyStore, MemoryStore};
use std::future::Future;

type TestStore = MemoryStore<FakeClock, SequentialIdGen>;

fn store(clock: &FakeClock) -> Arc<TestStore> {
    Arc::new(MemoryStore::with_clock(
        clock.clone(),
        SequentialIdGen::new("uid"),
    ))
}

fn controller(store: Arc<dyn Store>, clock: FakeClock) -> Controller<FakeClock> {
    Controller::new(
        store,
        Arc::new(Registry::standard()),
        clock,
        Intervals::default(),
        ControllerConfig {
            workers: 2,
            resync: Duration::from_secs(60),
        },
    )
}

async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..300 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}

fn barrier_of(name: &str, expected: u32) -> kord_core::Object {
    Barrier::new(
        ObjectMeta::new("default", name),
        BarrierSpec {
            expected,
            quorum: None,
            timeout: None,
        },
    )
    .into_object()
}

#[tokio::test]
async fn barrier_opens_from_watch_events() {
    let clock = FakeClock::new();
    let store = store(&clock);
    let (stop, shutdown) = watch::channel(false);
    let running = tokio::spawn(controller(store.clone(), clock).run(shutdown));

    store.create(barrier_of("start", 2)).await.unwrap();
    for holder in ["w1", "w2"] {
        store
            .create(barrier::arrival("default", "start", holder).into_object())
                .await
            .unwrap();
    }

    eventually(|| {
        let store = store.clone();
        async move {
            get_as::<BarrierSpec>(store.as_ref(), "default", "start")
                .await
                .is_ok_and(|b| b.status.phase == Some(BarrierPhase::Open))
        }
    })
    .await;

    stop.send(true).unwrap();
    running.await.unwrap().unwrap();
}

#[tokio::test]
async fn referenced_change_wakes_gate() {
    let clock = FakeClock::new();
    let store = store(&clock);
    store
        .create(
            kord_core::coordination::Gate::new(
                ObjectMeta::new("default", "deploy"),
                GateSpec {
                    conditions: vec![GateCondition::Barrier {
                        name: "start".to_string(),
                        state: BarrierPhase::Open,
                    }],
                    timeout: None,
                },
            )
            .into_object(),
        )
        .await
        .unwrap();

    let (stop, shutdown) = watch::channel(false);
    let running = tokio::spawn(controller(store.clone(), clock).run(shutdown));

    eventually(|| {
        let store = store.clone();
        async move {
            get_as::<GateSpec>(store.as_ref(), "default", "deploy")
                .await
                .is_ok_and(|g| g.status.phase == Some(GatePhase::Waiting))
        }
    })
    .await;

    store.create(barrier_of("start", 1)).await.unwrap();
    store
        .create(barrier::arrival("default", "start", "w1").into_object())
        .await
        .unwrap();

    eventually(|| {
        let store = store.clone();
        async move {
            get_as::<GateSpec>(store.as_ref(), "default", "deploy")
                .await
                .is_ok_and(|g| g.status.phase == Some(GatePhase::Open))
        }
    })
    .await;

    stop.send(true).unwrap();
    running.await.unwrap().unwrap();
}

#[tokio::test]
async fn conflict_is_retried_immediately() {
    let clock = FakeClock::new();
    let store = Arc::new(FaultyStore::new(MemoryStore::with_clock(
        clock.clone(),
        SequentialIdGen::new("uid"),
    )));
    let key = store
        .create(Mutex::new(ObjectMeta::new("default", "m"), MutexSpec::default()).into_object())
        .await
        .unwrap()
        .key();
    store.fail_update_status(StoreError::Conflict("stale".to_string()));

    let controller = controller(store.clone(), clock);
    controller.reconcile_now(&key).await;
    assert_eq!(controller.stats().ready, 1);
    assert_eq!(controller.stats().delayed, 0);

    controller.reconcile_now(&key).await;
    let current = get_as::<MutexSpec>(store.as_ref(), "default", "m")
        .await
        .unwrap();
    assert_eq!(current.status.phase, Some(MutexPhase::Unlocked));
}

#[tokio::test]
async fn store_failure_backs_off() {
    let clock = FakeClock::new();
    let store = Arc::new(FaultyStore::new(MemoryStore::with_clock(
        clock.clone(),
        SequentialIdGen::new("uid"),
    )));
    let key = store
        .create(Mutex::new(ObjectMeta::new("default", "m"), MutexSpec::default()).into_object())
        .await
        .unwrap()
        .key();
    store.fail_get(StoreError::Internal("unavailable".to_string()));

    let controller = controller(store.clone(), clock);
    controller.reconcile_now(&key).await;
    assert_eq!(controller.stats().ready, 0);
    assert_eq!(controller.stats().delayed, 1);
}

#[tokio::test]
async fn missing_object_is_dropped() {
    let clock = FakeClock::new();
    let controller = controller(store(&clock), clock);
    controller
        .reconcile_now(&ObjectKey::new(Kind::Mutex, "default", "ghost"))
        .await;
    assert_eq!(controller.stats(), QueueStats::default());
}

#[tokio::test]
async fn enqueue_all_covers_registered_kinds() {
    let clock = FakeClock::new();
    let store = store(&clock);
    store.create(barrier_of("start", 1)).await.unwrap();
    store
        .create(barrier::arrival("default", "start", "w1").into_object())
        .await
        .unwrap();
    store
        .create(Mutex::new(ObjectMeta::new("team", "m"), MutexSpec::default()).into_object())
        .await
        .unwrap();

    let controller = controller(store, clock);
    // Arrivals have no reconciler of their own
    assert_eq!(controller.enqueue_all().await.unwrap(), 2);
    assert_eq!(controller.stats().ready, 2);
}
