// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mutex: exclusive lock with optional TTL
//!
//! Clients acquire and release by patching status through conditional
//! writes. The reconciler only derives the phase and enforces expiry.

use super::{normalize_holder, Refusal};
use crate::clock::{after, is_expired};
use crate::effect::Event;
use crate::meta::Kind;
use crate::reconcile::{Action, Intervals, Reconciled};
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub type Mutex = Resource<MutexSpec, MutexStatus>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutexSpec {
    /// How long a hold lasts before the reconciler clears it
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<Duration>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutexPhase {
    Unlocked,
    Locked,
}

impl fmt::Display for MutexPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutexPhase::Unlocked => write!(f, "Unlocked"),
            MutexPhase::Locked => write!(f, "Locked"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutexStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<MutexPhase>,
}

impl MutexStatus {
    /// Take the lock for `holder`.
    ///
    /// Re-locking by the current holder refreshes the expiry.
    pub fn lock(
        &mut self,
        holder: &str,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<(), Refusal> {
        normalize_holder(&mut self.holder);
        let live_holder = match (&self.holder, self.expires_at) {
            (Some(_), Some(expires)) if is_expired(expires, now) => None,
            (current, _) => current.clone(),
        };
        match live_holder {
            Some(current) if current != holder => Err(Refusal::LockHeld { holder: current }),
            Some(_) => {
                self.expires_at = ttl.map(|ttl| after(now, ttl));
                Ok(())
            }
            None => {
                self.holder = Some(holder.to_string());
                self.locked_at = Some(now);
                self.expires_at = ttl.map(|ttl| after(now, ttl));
                self.phase = Some(MutexPhase::Locked);
                Ok(())
            }
        }
    }

    /// Release the lock if `holder` holds it
    pub fn unlock(&mut self, holder: &str) -> Result<(), Refusal> {
        if self.holder.as_deref() != Some(holder) {
            return Err(Refusal::NotHolder {
                holder: holder.to_string(),
            });
        }
        *self = MutexStatus {
            phase: Some(MutexPhase::Unlocked),
            ..MutexStatus::default()
        };
        Ok(())
    }
}

/// Derive the phase from the holder and clear expired holds
pub fn reconcile(mutex: &Mutex, now: DateTime<Utc>, intervals: &Intervals) -> Reconciled<MutexStatus> {
    let previous = mutex.status.phase;
    let mut status = mutex.status.clone();
    normalize_holder(&mut status.holder);

    if let Some(expires) = status.expires_at {
        if is_expired(expires, now) {
            let holders: Vec<String> = status.holder.take().into_iter().collect();
            let status = MutexStatus {
                phase: Some(MutexPhase::Unlocked),
                ..MutexStatus::default()
            };
            let mut out = Reconciled::new(status, Action::NoRequeue);
            if !holders.is_empty() {
                out = out.emit(Event::LockExpired {
                    kind: Kind::Mutex,
                    namespace: mutex.metadata.namespace.clone(),
                    name: mutex.metadata.name.clone(),
                    holders,
                });
            }
            return out.phase_change(
                Kind::Mutex,
                &mutex.metadata,
                previous.as_ref(),
                &MutexPhase::Unlocked,
            );
        }
    }

    let (phase, action) = match (&status.holder, status.expires_at) {
        (Some(_), Some(expires)) => (
            MutexPhase::Locked,
            Action::RequeueAfter(intervals.requeue_until(expires, now)),
        ),
        (Some(_), None) => (MutexPhase::Locked, Action::NoRequeue),
        (None, _) => {
            status.locked_at = None;
            status.expires_at = None;
            (MutexPhase::Unlocked, Action::NoRequeue)
        }
    };
    status.phase = Some(phase);

    Reconciled::new(status, action).phase_change(
        Kind::Mutex,
        &mutex.metadata,
        previous.as_ref(),
        &phase,
    )
}

#[cfg(test)]
#[path = "mutex_tests.rs"]
mod tests;
