// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use kord_core::clock::before;
use kord_core::coordination::{
    BarrierPhase, GateCondition, GatePhase, LeasePhase, LeaseRequestPhase, Mutex, MutexPhase,
    Once, OncePhase, Permit, PermitPhase, PermitStatus, Semaphore, SemaphorePhase,
};
use kord_core::{Clock, FakeClock, ObjectMeta, SequentialIdGen};
use kord_storage::{get_as, FaultyStore, MemoryStore};
use std::time::Duration;

type TestStore = MemoryStore<FakeClock, SequentialIdGen>;

struct Harness {
    store: TestStore,
    clock: FakeClock,
    intervals: Intervals,
}

impl Harness {
    fn new() -> Self {
        let clock = FakeClock::new();
        Self {
            store: MemoryStore::with_clock(clock.clone(), SequentialIdGen::new("uid")),
            clock,
            intervals: Intervals::default(),
        }
    }

    async fn run(&self, reconciler: &dyn Reconciler, key: &ObjectKey) -> Action {
        let ctx = Context {
            store: &self.store,
            now: self.clock.now(),
            intervals: &self.intervals,
        };
        reconciler.reconcile(&ctx, key).await.unwrap()
    }

    async fn create(&self, object: impl Into<kord_core::Object>) -> ObjectKey {
        self.store.create(object.into()).await.unwrap().key()
    }
}

fn meta(name: &str) -> ObjectMeta {
    ObjectMeta::new("default", name)
}

#[tokio::test]
async fn expired_mutex_is_released() {
    let h = Harness::new();
    let mut m = Mutex::new(meta("m"), MutexSpec::default());
    m.status
        .lock("w1", Some(Duration::from_secs(5)), h.clock.now())
        .unwrap();
    let key = h.create(m).await;

    let action = h.run(&mutex_reconciler(), &key).await;
    assert_eq!(action, Action::RequeueAfter(Duration::from_secs(5)));

    h.clock.advance(Duration::from_secs(6));
    assert_eq!(h.run(&mutex_reconciler(), &key).await, Action::NoRequeue);
    let current = get_as::<MutexSpec>(&h.store, "default", "m").await.unwrap();
    assert_eq!(current.status.holder, None);
    assert_eq!(current.status.phase, Some(MutexPhase::Unlocked));
}

#[tokio::test]
async fn converged_status_is_not_rewritten() {
    let clock = FakeClock::new();
    let store = FaultyStore::new(MemoryStore::with_clock(
        clock.clone(),
        SequentialIdGen::new("uid"),
    ));
    let key = store
        .create(Once::new(meta("init"), OnceSpec::default()).into_object())
        .await
        .unwrap()
        .key();
    let intervals = Intervals::default();
    let ctx = Context {
        store: &store,
        now: clock.now(),
        intervals: &intervals,
    };

    once_reconciler().reconcile(&ctx, &key).await.unwrap();
    once_reconciler().reconcile(&ctx, &key).await.unwrap();
    assert_eq!(store.update_count(), 1);

    let current = get_as::<OnceSpec>(&store, "default", "init").await.unwrap();
    assert_eq!(current.status.phase, Some(OncePhase::Pending));
}

#[tokio::test]
async fn conflicting_write_surfaces_as_conflict() {
    let clock = FakeClock::new();
    let store = FaultyStore::new(MemoryStore::with_clock(
        clock.clone(),
        SequentialIdGen::new("uid"),
    ));
    let key = store
        .create(Once::new(meta("init"), OnceSpec::default()).into_object())
        .await
        .unwrap()
        .key();
    store.fail_update_status(StoreError::Conflict("stale".to_string()));
    let intervals = Intervals::default();
    let ctx = Context {
        store: &store,
        now: clock.now(),
        intervals: &intervals,
    };

    let err = once_reconciler().reconcile(&ctx, &key).await.unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn missing_object_is_not_found() {
    let h = Harness::new();
    let ctx = Context {
        store: &h.store,
        now: h.clock.now(),
        intervals: &h.intervals,
    };
    let key = ObjectKey::new(Kind::Mutex, "default", "ghost");
    let err = mutex_reconciler().reconcile(&ctx, &key).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn semaphore_counts_only_live_permits() {
    let h = Harness::new();
    let sem = Semaphore::new(
        meta("db"),
        SemaphoreSpec {
            permits: 3,
            ttl: None,
        },
    );
    let key = h.create(sem.clone()).await;
    for holder in ["a", "b"] {
        let permit = semaphore::grant(&sem, &[], holder, None, h.clock.now()).unwrap();
        h.create(permit).await;
    }
    let mut expired: Permit = semaphore::grant(&sem, &[], "c", None, h.clock.now()).unwrap();
    expired.status = PermitStatus {
        acquired_at: Some(before(h.clock.now(), Duration::from_secs(60))),
        expires_at: Some(before(h.clock.now(), Duration::from_secs(1))),
        phase: Some(PermitPhase::Granted),
    };
    h.create(expired).await;

    let action = h.run(&SemaphoreReconciler, &key).await;
    assert_eq!(action, Action::RequeueAfter(h.intervals.semaphore_resync));
    let current = get_as::<SemaphoreSpec>(&h.store, "default", "db").await.unwrap();
    assert_eq!(current.status.in_use, 2);
    assert_eq!(current.status.available, 1);
    assert_eq!(current.status.phase, Some(SemaphorePhase::Ready));
}

#[tokio::test]
async fn permit_expires_on_its_own() {
    let h = Harness::new();
    let sem = Semaphore::new(
        meta("db"),
        SemaphoreSpec {
            permits: 1,
            ttl: Some(Duration::from_secs(10)),
        },
    );
    let permit = semaphore::grant(&sem, &[], "a", None, h.clock.now()).unwrap();
    let key = h.create(permit).await;

    h.clock.advance(Duration::from_secs(11));
    h.run(&permit_reconciler(), &key).await;
    let current = get_as::<PermitSpec>(&h.store, "default", "db-a").await.unwrap();
    assert_eq!(current.status.phase, Some(PermitPhase::Expired));
}

#[tokio::test]
async fn barrier_opens_with_arrivals_in_order() {
    let h = Harness::new();
    let key = h
        .create(coordination::Barrier::new(
            meta("start"),
            BarrierSpec {
                expected: 2,
                quorum: None,
                timeout: None,
            },
        ))
        .await;
    h.create(barrier::arrival("default", "start", "w2")).await;
    assert_eq!(
        h.run(&BarrierReconciler, &key).await,
        Action::RequeueAfter(h.intervals.barrier_poll)
    );

    h.create(barrier::arrival("default", "start", "w1")).await;
    assert_eq!(h.run(&BarrierReconciler, &key).await, Action::NoRequeue);
    let current = get_as::<BarrierSpec>(&h.store, "default", "start").await.unwrap();
    assert_eq!(current.status.phase, Some(BarrierPhase::Open));
    assert_eq!(current.status.arrivals, vec!["w2", "w1"]);
}

#[tokio::test]
async fn barrier_times_out_when_short() {
    let h = Harness::new();
    let key = h
        .create(coordination::Barrier::new(
            meta("start"),
            BarrierSpec {
                expected: 3,
                quorum: None,
                timeout: Some(Duration::from_secs(3600)),
            },
        ))
        .await;
    h.clock.advance(Duration::from_secs(7200));
    h.run(&BarrierReconciler, &key).await;

    // Arrivals after failure change nothing
    h.create(barrier::arrival("default", "start", "late")).await;
    assert_eq!(h.run(&BarrierReconciler, &key).await, Action::NoRequeue);
    let current = get_as::<BarrierSpec>(&h.store, "default", "start").await.unwrap();
    assert_eq!(current.status.phase, Some(BarrierPhase::Failed));
    assert_eq!(current.status.arrived, 0);
}

#[tokio::test]
async fn lease_grants_highest_priority_and_marks_request() {
    let h = Harness::new();
    let key = h
        .create(coordination::Lease::new(
            meta("leader"),
            LeaseSpec {
                ttl: Duration::from_secs(30),
                tie_break: None,
            },
        ))
        .await;
    h.create(lease::request("default", "leader", "low", Some(1), None))
        .await;
    h.create(lease::request("default", "leader", "high", Some(5), None))
        .await;

    let action = h.run(&LeaseReconciler, &key).await;
    assert_eq!(action, Action::RequeueAfter(Duration::from_secs(30)));

    let current = get_as::<LeaseSpec>(&h.store, "default", "leader").await.unwrap();
    assert_eq!(current.status.holder.as_deref(), Some("high"));
    assert_eq!(current.status.phase, Some(LeasePhase::Held));

    let granted = get_as::<LeaseRequestSpec>(&h.store, "default", "leader-high")
        .await
        .unwrap();
    assert_eq!(granted.status.phase, Some(LeaseRequestPhase::Granted));
    let waiting = get_as::<LeaseRequestSpec>(&h.store, "default", "leader-low")
        .await
        .unwrap();
    assert_eq!(waiting.status.phase, Some(LeaseRequestPhase::Pending));
}

#[tokio::test]
async fn gate_waits_on_semaphore_availability() {
    let h = Harness::new();
    let mut sem = Semaphore::new(
        meta("db"),
        SemaphoreSpec {
            permits: 2,
            ttl: None,
        },
    );
    sem.status.available = 2;
    h.create(sem).await;
    let key = h
        .create(coordination::Gate::new(
            meta("deploy"),
            GateSpec {
                conditions: vec![
                    GateCondition::Semaphore {
                        name: "db".to_string(),
                        value: Some(3),
                    },
                    GateCondition::Job {
                        name: "build".to_string(),
                    },
                ],
                timeout: None,
            },
        ))
        .await;

    h.run(&GateReconciler, &key).await;
    let current = get_as::<GateSpec>(&h.store, "default", "deploy").await.unwrap();
    assert_eq!(current.status.phase, Some(GatePhase::Waiting));
    let conditions = &current.status.conditions;
    assert!(!conditions[0].met);
    assert_eq!(conditions[0].message.as_deref(), Some("2 available, need 3"));
    assert_eq!(conditions[1].message.as_deref(), Some("Job build not found"));
}

#[tokio::test]
async fn gate_with_no_conditions_opens_immediately() {
    let h = Harness::new();
    let key = h
        .create(coordination::Gate::new(meta("empty"), GateSpec::default()))
        .await;
    h.run(&GateReconciler, &key).await;
    let current = get_as::<GateSpec>(&h.store, "default", "empty").await.unwrap();
    assert_eq!(current.status.phase, Some(GatePhase::Open));
    assert_eq!(current.status.opened_at, Some(h.clock.now()));
}

#[tokio::test]
async fn waitgroup_projects_counter() {
    let h = Harness::new();
    let mut wg = coordination::WaitGroup::new(meta("batch"), WaitGroupSpec::default());
    wg.status.add(2);
    let key = h.create(wg).await;
    assert_eq!(h.run(&waitgroup_reconciler(), &key).await, Action::NoRequeue);
    let current = get_as::<WaitGroupSpec>(&h.store, "default", "batch").await.unwrap();
    assert_eq!(current.status.counter, 2);
    assert_eq!(
        current.status.phase,
        Some(coordination::WaitGroupPhase::Waiting)
    );
}
