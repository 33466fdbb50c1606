// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RWMutex: one writer or many readers, with optional TTL
//!
//! Writers and readers never coexist: clients check the current status
//! before patching it and retry on version conflicts.

use super::{normalize_holder, Refusal};
use crate::clock::{after, is_expired};
use crate::effect::Event;
use crate::meta::Kind;
use crate::reconcile::{Action, Intervals, Reconciled};
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

pub type RwMutex = Resource<RwMutexSpec, RwMutexStatus>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RwMutexSpec {
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<Duration>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RwMutexPhase {
    Unlocked,
    ReadLocked,
    WriteLocked,
}

impl fmt::Display for RwMutexPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RwMutexPhase::Unlocked => "Unlocked",
            RwMutexPhase::ReadLocked => "ReadLocked",
            RwMutexPhase::WriteLocked => "WriteLocked",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RwMutexStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_holder: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub read_holders: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<RwMutexPhase>,
}

impl RwMutexStatus {
    fn normalize(&mut self) {
        normalize_holder(&mut self.write_holder);
        self.read_holders.retain(|h| !h.trim().is_empty());
    }

    /// Whether the current holds have passed their expiry
    fn expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| is_expired(at, now))
    }

    fn phase_of(&self) -> RwMutexPhase {
        if self.write_holder.is_some() {
            RwMutexPhase::WriteLocked
        } else if !self.read_holders.is_empty() {
            RwMutexPhase::ReadLocked
        } else {
            RwMutexPhase::Unlocked
        }
    }

    fn clear(&mut self) {
        *self = RwMutexStatus {
            phase: Some(RwMutexPhase::Unlocked),
            ..RwMutexStatus::default()
        };
    }

    /// Take the write lock; requires no other writer and no readers
    pub fn lock(
        &mut self,
        holder: &str,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<(), Refusal> {
        self.normalize();
        if self.expired(now) {
            self.clear();
        }
        if let Some(writer) = self.write_holder.as_deref().filter(|w| *w != holder) {
            return Err(Refusal::LockHeld {
                holder: writer.to_string(),
            });
        }
        if let Some(reader) = self.read_holders.iter().next() {
            return Err(Refusal::LockHeld {
                holder: reader.clone(),
            });
        }
        if self.write_holder.is_none() {
            self.write_holder = Some(holder.to_string());
            self.locked_at = Some(now);
        }
        self.expires_at = ttl.map(|ttl| after(now, ttl));
        self.phase = Some(RwMutexPhase::WriteLocked);
        Ok(())
    }

    /// Join the reader set; requires no writer. The shared expiry only ever
    /// moves later while readers remain.
    pub fn rlock(
        &mut self,
        holder: &str,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<(), Refusal> {
        self.normalize();
        if self.expired(now) {
            self.clear();
        }
        if let Some(writer) = &self.write_holder {
            return Err(Refusal::LockHeld {
                holder: writer.clone(),
            });
        }
        let joined = ttl.map(|ttl| after(now, ttl));
        if self.read_holders.is_empty() {
            self.locked_at = Some(now);
            self.expires_at = joined;
        } else {
            // None sorts below any deadline, so a reader without a ttl keeps the others'
            self.expires_at = self.expires_at.max(joined);
        }
        self.read_holders.insert(holder.to_string());
        self.phase = Some(RwMutexPhase::ReadLocked);
        Ok(())
    }

    /// Release the write lock held by `holder`
    pub fn unlock(&mut self, holder: &str) -> Result<(), Refusal> {
        if self.write_holder.as_deref() != Some(holder) {
            return Err(Refusal::NotHolder {
                holder: holder.to_string(),
            });
        }
        self.clear();
        Ok(())
    }

    /// Leave the reader set
    pub fn runlock(&mut self, holder: &str) -> Result<(), Refusal> {
        if !self.read_holders.remove(holder) {
            return Err(Refusal::NotHolder {
                holder: holder.to_string(),
            });
        }
        if self.read_holders.is_empty() {
            self.clear();
        }
        Ok(())
    }
}

pub fn reconcile(
    rw: &RwMutex,
    now: DateTime<Utc>,
    intervals: &Intervals,
) -> Reconciled<RwMutexStatus> {
    let previous = rw.status.phase;
    let mut status = rw.status.clone();
    status.normalize();

    if status.expired(now) {
        let holders: Vec<String> = status
            .write_holder
            .iter()
            .chain(status.read_holders.iter())
            .cloned()
            .collect();
        status.clear();
        let mut out = Reconciled::new(status, Action::NoRequeue);
        if !holders.is_empty() {
            out = out.emit(Event::LockExpired {
                kind: Kind::RwMutex,
                namespace: rw.metadata.namespace.clone(),
                name: rw.metadata.name.clone(),
                holders,
            });
        }
        return out.phase_change(
            Kind::RwMutex,
            &rw.metadata,
            previous.as_ref(),
            &RwMutexPhase::Unlocked,
        );
    }

    let phase = status.phase_of();
    let action = match (phase, status.expires_at) {
        (RwMutexPhase::Unlocked, _) => {
            status.locked_at = None;
            status.expires_at = None;
            Action::NoRequeue
        }
        (_, Some(expires)) => Action::RequeueAfter(intervals.requeue_until(expires, now)),
        (_, None) => Action::NoRequeue,
    };
    status.phase = Some(phase);

    Reconciled::new(status, action).phase_change(
        Kind::RwMutex,
        &rw.metadata,
        previous.as_ref(),
        &phase,
    )
}

#[cfg(test)]
#[path = "rwmutex_tests.rs"]
mod tests;
