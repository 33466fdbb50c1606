// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Controller runtime: watch, dispatch, and a pool of reconcile workers

use crate::dispatch;
use crate::queue::WorkQueue;
use crate::reconciler::Context;
use crate::registry::Registry;
use kord_core::{Action, Clock, Intervals, LabelSelector, ObjectKey};
use kord_storage::{Store, StoreError, WatchEvent};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, watch, Notify};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::Instrument;

/// Controller tuning, read from the `[controller]` config table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Concurrent reconcile workers
    pub workers: usize,
    /// Relist every registered kind this often
    #[serde(with = "humantime_serde")]
    pub resync: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            resync: Duration::from_secs(30),
        }
    }
}

/// Counters reported by [`Controller::stats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub ready: usize,
    pub in_flight: usize,
    pub delayed: usize,
}

struct Shared<C: Clock> {
    store: Arc<dyn Store>,
    registry: Arc<Registry>,
    clock: C,
    intervals: Intervals,
    queue: Mutex<WorkQueue>,
    wake: Notify,
}

impl<C: Clock> Shared<C> {
    fn queue(&self) -> std::sync::MutexGuard<'_, WorkQueue> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn enqueue(&self, key: ObjectKey) {
        if self.queue().add(key) {
            self.wake.notify_one();
        }
    }

    /// Run one key through its reconciler and schedule what comes next
    async fn process(&self, key: &ObjectKey) {
        let Some(reconciler) = self.registry.get(key.kind).cloned() else {
            tracing::warn!(%key, "no reconciler registered");
            return;
        };
        let ctx = Context {
            store: self.store.as_ref(),
            now: self.clock.now(),
            intervals: &self.intervals,
        };
        let span = tracing::debug_span!(
            "reconcile",
            kind = %key.kind,
            namespace = %key.namespace,
            name = %key.name
        );
        let result = reconciler.reconcile(&ctx, key).instrument(span).await;

        let mut queue = self.queue();
        match result {
            Ok(Action::NoRequeue) => {
                queue.forget(key);
            }
            Ok(Action::RequeueAfter(delay)) => {
                queue.forget(key);
                queue.add_after(key.clone(), delay, Instant::now());
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(%key, "object gone");
                queue.forget(key);
                queue.cancel(key);
            }
            Err(e) if e.is_conflict() => {
                tracing::debug!(%key, "stale write, retrying");
                queue.add(key.clone());
            }
            Err(e) => {
                let delay = queue.backoff(key);
                tracing::error!(%key, error = %e, retry_ms = delay.as_millis() as u64, "reconcile failed");
                queue.add_after(key.clone(), delay, Instant::now());
            }
        }
    }

    /// Next ready key, or the instant the earliest timer fires
    fn next(&self) -> Result<ObjectKey, Option<Instant>> {
        let mut queue = self.queue();
        queue.poll_timers(Instant::now());
        queue.pop().ok_or_else(|| queue.next_deadline())
    }

    fn done(&self, key: &ObjectKey) {
        let requeued = {
            let mut queue = self.queue();
            queue.done(key);
            !queue.is_empty()
        };
        if requeued {
            self.wake.notify_one();
        }
    }
}

/// Drives every registered reconciler from store watch events, periodic
/// resyncs and requeue timers.
pub struct Controller<C: Clock> {
    shared: Arc<Shared<C>>,
    config: ControllerConfig,
}

impl<C: Clock> Controller<C> {
    pub fn new(
        store: Arc<dyn Store>,
        registry: Arc<Registry>,
        clock: C,
        intervals: Intervals,
        config: ControllerConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                registry,
                clock,
                intervals,
                queue: Mutex::new(WorkQueue::new()),
                wake: Notify::new(),
            }),
            config,
        }
    }

    pub fn stats(&self) -> QueueStats {
        let queue = self.shared.queue();
        QueueStats {
            ready: queue.len(),
            in_flight: queue.in_flight(),
            delayed: queue.delayed(),
        }
    }

    /// Queue a key for reconciliation
    pub fn enqueue(&self, key: ObjectKey) {
        self.shared.enqueue(key);
    }

    /// List every registered kind and queue each object
    pub async fn enqueue_all(&self) -> Result<usize, StoreError> {
        let mut count = 0;
        for kind in self.shared.registry.kinds() {
            let objects = self
                .shared
                .store
                .list(kind, None, &LabelSelector::everything())
                .await?;
            for object in objects {
                self.shared.enqueue(object.key());
                count += 1;
            }
        }
        Ok(count)
    }

    /// Reconcile one key inline, bypassing the workers
    pub async fn reconcile_now(&self, key: &ObjectKey) {
        self.shared.process(key).await;
    }

    async fn dispatch(&self, event: &WatchEvent) {
        let object = event.object();
        match dispatch::keys_for(self.shared.store.as_ref(), &self.shared.registry, object).await {
            Ok(keys) => {
                for key in keys {
                    self.shared.enqueue(key);
                }
            }
            Err(e) => {
                tracing::warn!(key = %object.key(), error = %e, "could not map watch event");
            }
        }
    }

    async fn resync(&self) {
        match self.enqueue_all().await {
            Ok(count) => tracing::debug!(count, "resync"),
            Err(e) => tracing::error!(error = %e, "resync failed"),
        }
    }

    /// Run until `shutdown` flips to true or the watch stream closes
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), StoreError> {
        let mut events = self.shared.store.watch()?;
        tracing::info!(
            workers = self.config.workers,
            kinds = self.shared.registry.len(),
            "controller started"
        );
        self.resync().await;

        let mut workers = JoinSet::new();
        for id in 0..self.config.workers.max(1) {
            let shared = Arc::clone(&self.shared);
            workers.spawn(worker(shared, id, shutdown.clone()));
        }

        let mut resync = tokio::time::interval_at(
            Instant::now() + self.config.resync,
            self.config.resync,
        );
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = resync.tick() => self.resync().await,
                event = events.recv() => match event {
                    Ok(event) => self.dispatch(&event).await,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "watch lagged, relisting");
                        self.resync().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::warn!("watch closed");
                        break;
                    }
                },
            }
        }

        self.shared.wake.notify_waiters();
        while workers.join_next().await.is_some() {}
        tracing::info!("controller stopped");
        Ok(())
    }
}

async fn worker<C: Clock>(shared: Arc<Shared<C>>, id: usize, mut shutdown: watch::Receiver<bool>) {
    tracing::debug!(worker = id, "worker started");
    loop {
        if *shutdown.borrow() {
            break;
        }
        match shared.next() {
            Ok(key) => {
                shared.process(&key).await;
                shared.done(&key);
            }
            Err(deadline) => {
                let sleep = async {
                    match deadline {
                        Some(at) => tokio::time::sleep_until(at).await,
                        None => std::future::pending().await,
                    }
                };
                tokio::select! {
                    _ = shared.wake.notified() => {}
                    _ = sleep => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    }
    tracing::debug!(worker = id, "worker stopped");
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
