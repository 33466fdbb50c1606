// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deduplicating work queue with delayed requeues
//!
//! A key is queued at most once and processed by at most one worker at a
//! time. A key added while it is being processed is marked dirty and
//! queued again when its worker calls [`WorkQueue::done`].

use kord_core::ObjectKey;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::time::Duration;
use tokio::time::Instant;

/// First retry delay after a failed reconcile
pub const BACKOFF_BASE: Duration = Duration::from_millis(5);
/// Longest retry delay after repeated failures
pub const BACKOFF_MAX: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Timer {
    fire_at: Instant,
    key: ObjectKey,
}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Min-heap: earliest first
        Reverse(self.fire_at)
            .cmp(&Reverse(other.fire_at))
            .then_with(|| other.key.cmp(&self.key))
    }
}

#[derive(Debug, Default)]
pub struct WorkQueue {
    ready: VecDeque<ObjectKey>,
    queued: HashSet<ObjectKey>,
    processing: HashSet<ObjectKey>,
    dirty: HashSet<ObjectKey>,
    timers: BinaryHeap<Timer>,
    /// Earliest pending timer per key; heap entries that disagree are stale
    scheduled: HashMap<ObjectKey, Instant>,
    failures: HashMap<ObjectKey, u32>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a key now. Returns false if it was already queued.
    pub fn add(&mut self, key: ObjectKey) -> bool {
        if self.processing.contains(&key) {
            return self.dirty.insert(key);
        }
        if !self.queued.insert(key.clone()) {
            return false;
        }
        self.ready.push_back(key);
        true
    }

    /// Queue a key once `delay` has passed.
    ///
    /// An earlier pending timer for the same key wins.
    pub fn add_after(&mut self, key: ObjectKey, delay: Duration, now: Instant) {
        if delay.is_zero() {
            self.add(key);
            return;
        }
        let fire_at = now + delay;
        if self.scheduled.get(&key).is_some_and(|at| *at <= fire_at) {
            return;
        }
        self.scheduled.insert(key.clone(), fire_at);
        self.timers.push(Timer { fire_at, key });
    }

    /// Move every due timer onto the ready queue
    pub fn poll_timers(&mut self, now: Instant) -> usize {
        let mut fired = 0;
        while let Some(timer) = self.timers.peek() {
            if timer.fire_at > now {
                break;
            }
            let Some(timer) = self.timers.pop() else {
                break;
            };
            if self.scheduled.get(&timer.key) != Some(&timer.fire_at) {
                continue;
            }
            self.scheduled.remove(&timer.key);
            self.add(timer.key);
            fired += 1;
        }
        fired
    }

    /// When the earliest live timer fires
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduled.values().min().copied()
    }

    /// Take the next ready key and mark it in flight
    pub fn pop(&mut self) -> Option<ObjectKey> {
        let key = self.ready.pop_front()?;
        self.queued.remove(&key);
        self.processing.insert(key.clone());
        Some(key)
    }

    /// Finish processing a key, requeueing it if it was added meanwhile
    pub fn done(&mut self, key: &ObjectKey) {
        self.processing.remove(key);
        if self.dirty.remove(key) {
            self.add(key.clone());
        }
    }

    /// Next retry delay for a failing key: 5ms doubled per failure, capped
    pub fn backoff(&mut self, key: &ObjectKey) -> Duration {
        let failures = self.failures.entry(key.clone()).or_insert(0);
        let delay = BACKOFF_BASE
            .checked_mul(2u32.saturating_pow(*failures))
            .map_or(BACKOFF_MAX, |d| d.min(BACKOFF_MAX));
        *failures = failures.saturating_add(1);
        delay
    }

    /// Reset a key's failure count
    pub fn forget(&mut self, key: &ObjectKey) {
        self.failures.remove(key);
    }

    /// Drop a pending timer for a key
    pub fn cancel(&mut self, key: &ObjectKey) {
        self.scheduled.remove(key);
    }

    pub fn is_queued(&self, key: &ObjectKey) -> bool {
        self.queued.contains(key) || self.dirty.contains(key)
    }

    /// Keys ready to be processed
    pub fn len(&self) -> usize {
        self.ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }

    pub fn in_flight(&self) -> usize {
        self.processing.len()
    }

    /// Keys waiting on a timer
    pub fn delayed(&self) -> usize {
        self.scheduled.len()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
