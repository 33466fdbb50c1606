// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive lease arbitrated by request priority
//!
//! Contenders create LeaseRequest children. While the lease is available,
//! the reconciler grants it to the highest-priority pending request. Ties go
//! to the request seen first in the listing, which is creation order for the
//! reference store but is not a strict fairness guarantee.

use super::{normalize_holder, Refusal};
use crate::clock::{after, is_expired};
use crate::effect::{Effect, Event};
use crate::meta::{Kind, ObjectMeta, LEASE_LABEL};
use crate::reconcile::{Action, Intervals, Reconciled};
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::fmt;
use std::time::Duration;

pub type Lease = Resource<LeaseSpec, LeaseStatus>;
pub type LeaseRequest = Resource<LeaseRequestSpec, LeaseRequestStatus>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseSpec {
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
    /// How equal-priority requests are ordered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tie_break: Option<TieBreak>,
}

/// Ordering among pending requests of equal priority
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreak {
    /// First request in listing order
    #[default]
    FirstSeen,
    /// Earliest creation timestamp, then listing order
    Oldest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeasePhase {
    Available,
    Held,
    /// Accepted on the wire; the reconciler reports an expired hold as Available
    Expired,
}

impl fmt::Display for LeasePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeasePhase::Available => f.write_str("Available"),
            LeasePhase::Held => f.write_str("Held"),
            LeasePhase::Expired => f.write_str("Expired"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquired_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub renew_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<LeasePhase>,
}

impl LeaseStatus {
    /// Extend the hold of the current holder
    pub fn renew(&mut self, holder: &str, ttl: Duration, now: DateTime<Utc>) -> Result<(), Refusal> {
        let live = self.holder.as_deref() == Some(holder)
            && !self.expires_at.is_some_and(|at| is_expired(at, now));
        if !live {
            return Err(Refusal::NotHolder {
                holder: holder.to_string(),
            });
        }
        self.expires_at = Some(after(now, ttl));
        self.renew_count = self.renew_count.saturating_add(1);
        Ok(())
    }

    /// Give the lease up if `holder` holds it
    pub fn release(&mut self, holder: &str) -> Result<(), Refusal> {
        if self.holder.as_deref() != Some(holder) {
            return Err(Refusal::NotHolder {
                holder: holder.to_string(),
            });
        }
        self.vacate();
        Ok(())
    }

    fn vacate(&mut self) {
        *self = LeaseStatus {
            phase: Some(LeasePhase::Available),
            ..LeaseStatus::default()
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseRequestSpec {
    pub lease: String,
    pub holder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    /// Overrides the lease ttl for this grant
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<Duration>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaseRequestPhase {
    Pending,
    Granted,
    Denied,
}

impl fmt::Display for LeaseRequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaseRequestPhase::Pending => f.write_str("Pending"),
            LeaseRequestPhase::Granted => f.write_str("Granted"),
            LeaseRequestPhase::Denied => f.write_str("Denied"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseRequestStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<LeaseRequestPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LeaseRequestStatus {
    /// Mark a still-pending request Denied; a granted request stays granted
    pub fn deny(&mut self, message: impl Into<String>) -> Result<(), Refusal> {
        match self.phase {
            None | Some(LeaseRequestPhase::Pending) => {
                self.phase = Some(LeaseRequestPhase::Denied);
                self.message = Some(message.into());
                Ok(())
            }
            Some(phase) => Err(Refusal::NotPending {
                phase: phase.to_string(),
            }),
        }
    }
}

impl LeaseRequest {
    pub fn priority(&self) -> i32 {
        self.spec.priority.unwrap_or(0)
    }

    /// Requests without a phase are pending
    pub fn is_pending(&self) -> bool {
        matches!(
            self.status.phase,
            None | Some(LeaseRequestPhase::Pending)
        )
    }
}

/// Name of the LeaseRequest a holder creates for a lease
pub fn request_name(lease: &str, holder: &str) -> String {
    format!("{lease}-{holder}")
}

/// Build a pending LeaseRequest for `holder`
pub fn request(
    namespace: &str,
    lease: &str,
    holder: &str,
    priority: Option<i32>,
    ttl: Option<Duration>,
) -> LeaseRequest {
    let meta =
        ObjectMeta::new(namespace, request_name(lease, holder)).with_label(LEASE_LABEL, lease);
    LeaseRequest::new(
        meta,
        LeaseRequestSpec {
            lease: lease.to_string(),
            holder: holder.to_string(),
            priority,
            ttl,
        },
    )
    .with_status(LeaseRequestStatus {
        phase: Some(LeaseRequestPhase::Pending),
        message: None,
    })
}

/// Pick the pending request with the highest priority.
///
/// Among equals, [`TieBreak::FirstSeen`] keeps the earliest in `requests`;
/// [`TieBreak::Oldest`] prefers the earliest creation timestamp first.
pub fn select_request(requests: &[LeaseRequest], tie_break: TieBreak) -> Option<&LeaseRequest> {
    let rank = |r: &LeaseRequest| match tie_break {
        TieBreak::FirstSeen => (r.priority(), Reverse(None)),
        TieBreak::Oldest => (
            r.priority(),
            Reverse(Some(
                r.metadata
                    .creation_timestamp
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            )),
        ),
    };
    requests
        .iter()
        .filter(|r| r.is_pending())
        .fold(None, |best: Option<&LeaseRequest>, candidate| match best {
            Some(best) if rank(candidate).cmp(&rank(best)) != Ordering::Greater => Some(best),
            _ => Some(candidate),
        })
}

/// Expire a stale holder, then grant to the best pending request while available
pub fn reconcile(
    lease: &Lease,
    requests: &[LeaseRequest],
    now: DateTime<Utc>,
    intervals: &Intervals,
) -> Reconciled<LeaseStatus> {
    let meta = &lease.metadata;
    let previous = lease.status.phase;
    let mut status = lease.status.clone();
    normalize_holder(&mut status.holder);
    let mut events = Vec::new();

    let expired_holder = match (&status.holder, status.expires_at) {
        (Some(holder), Some(expires)) if is_expired(expires, now) => Some(holder.clone()),
        _ => None,
    };
    if let Some(holder) = expired_holder {
        events.push(Event::LeaseExpired {
            namespace: meta.namespace.clone(),
            name: meta.name.clone(),
            holder,
        });
        status.vacate();
    }

    let mut effects = Vec::new();
    let action = if status.holder.is_some() {
        status.phase = Some(LeasePhase::Held);
        match status.expires_at {
            Some(expires) => Action::RequeueAfter(intervals.requeue_until(expires, now)),
            None => Action::RequeueAfter(intervals.lease_fallback),
        }
    } else {
        status.vacate();
        let tie_break = lease.spec.tie_break.unwrap_or_default();
        match select_request(requests, tie_break) {
            Some(winner) => {
                let expires = after(now, winner.spec.ttl.unwrap_or(lease.spec.ttl));
                status = LeaseStatus {
                    holder: Some(winner.spec.holder.clone()),
                    acquired_at: Some(now),
                    expires_at: Some(expires),
                    renew_count: 0,
                    phase: Some(LeasePhase::Held),
                };
                events.push(Event::LeaseGranted {
                    namespace: meta.namespace.clone(),
                    name: meta.name.clone(),
                    holder: winner.spec.holder.clone(),
                    request: winner.metadata.name.clone(),
                    priority: winner.priority(),
                });
                effects.push(Effect::GrantRequest {
                    namespace: winner.metadata.namespace.clone(),
                    name: winner.metadata.name.clone(),
                });
                Action::RequeueAfter(intervals.requeue_until(expires, now))
            }
            None => Action::RequeueAfter(intervals.lease_fallback),
        }
    };

    let phase = status.phase.unwrap_or(LeasePhase::Available);
    let mut out = Reconciled::new(status, action);
    for event in events {
        out = out.emit(event);
    }
    for effect in effects {
        out = out.with_effect(effect);
    }
    out.phase_change(Kind::Lease, meta, previous.as_ref(), &phase)
}

#[cfg(test)]
#[path = "lease_tests.rs"]
mod tests;
