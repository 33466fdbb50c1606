// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconcile outcomes and requeue scheduling
//!
//! Reconcilers never sleep. Waiting is expressed as an [`Action`] that tells
//! the controller when to run the reconciler again.

use crate::clock;
use crate::effect::{Effect, Event};
use crate::meta::{Kind, ObjectMeta};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;

/// What the controller should do after a successful reconcile
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Wait for the next watch event or resync
    NoRequeue,
    /// Run again after the given delay even without new events
    RequeueAfter(Duration),
}

/// Result of a pure reconcile: the status to write, when to run again,
/// and side effects for the engine to carry out
#[derive(Clone, Debug, PartialEq)]
pub struct Reconciled<T> {
    pub status: T,
    pub action: Action,
    pub effects: Vec<Effect>,
}

impl<T> Reconciled<T> {
    pub fn new(status: T, action: Action) -> Self {
        Self {
            status,
            action,
            effects: Vec::new(),
        }
    }

    pub fn emit(mut self, event: Event) -> Self {
        self.effects.push(Effect::Emit(event));
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Emit a phase change event when `to` differs from `from`
    pub fn phase_change<P: Display + PartialEq>(
        self,
        kind: Kind,
        meta: &ObjectMeta,
        from: Option<&P>,
        to: &P,
    ) -> Self {
        if from == Some(to) {
            return self;
        }
        self.emit(Event::PhaseChanged {
            kind,
            namespace: meta.namespace.clone(),
            name: meta.name.clone(),
            from: from.map(ToString::to_string),
            to: to.to_string(),
        })
    }

    /// Events among the effects, in emission order
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.effects.iter().filter_map(|effect| match effect {
            Effect::Emit(event) => Some(event),
            Effect::GrantRequest { .. } => None,
        })
    }
}

/// Requeue intervals shared by all reconcilers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Intervals {
    /// Floor applied to every computed requeue delay
    #[serde(with = "humantime_serde")]
    pub min_requeue: Duration,
    /// Fixed resync for semaphores so expired permits age out
    #[serde(with = "humantime_serde")]
    pub semaphore_resync: Duration,
    /// Poll while a barrier is waiting
    #[serde(with = "humantime_serde")]
    pub barrier_poll: Duration,
    /// Poll for new requests while a lease is available
    #[serde(with = "humantime_serde")]
    pub lease_fallback: Duration,
    /// Lower bound of the adaptive gate poll
    #[serde(with = "humantime_serde")]
    pub gate_min: Duration,
    /// Upper bound of the adaptive gate poll
    #[serde(with = "humantime_serde")]
    pub gate_max: Duration,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            min_requeue: Duration::from_millis(100),
            semaphore_resync: Duration::from_secs(10),
            barrier_poll: Duration::from_secs(5),
            lease_fallback: Duration::from_secs(5),
            gate_min: Duration::from_secs(1),
            gate_max: Duration::from_secs(30),
        }
    }
}

impl Intervals {
    /// Delay until `deadline`, never shorter than `min_requeue`
    pub fn requeue_until(&self, deadline: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
        clock::until(deadline, now).max(self.min_requeue)
    }

    /// Adaptive poll for a waiting gate.
    ///
    /// Roughly a tenth of the time left before `deadline`, clamped to
    /// `[gate_min, gate_max]`. Without a deadline the gate polls at `gate_max`.
    pub fn gate_poll(&self, deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Duration {
        let Some(deadline) = deadline else {
            return self.gate_max;
        };
        let remaining = clock::until(deadline, now);
        let floor = self.gate_min.min(self.gate_max);
        (remaining / 10).clamp(floor, self.gate_max)
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
