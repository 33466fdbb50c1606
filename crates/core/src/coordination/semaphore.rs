// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Counting semaphore and its Permit children
//!
//! A permit is granted by the existence of an unexpired Permit labelled for
//! the semaphore. The semaphore reconciler only counts them.

use super::Refusal;
use crate::clock::{after, is_expired};
use crate::effect::Event;
use crate::meta::{Kind, ObjectMeta, SEMAPHORE_LABEL};
use crate::reconcile::{Action, Intervals, Reconciled};
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub type Semaphore = Resource<SemaphoreSpec, SemaphoreStatus>;
pub type Permit = Resource<PermitSpec, PermitStatus>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemaphoreSpec {
    pub permits: u32,
    /// Default permit lifetime when a Permit does not set its own
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<Duration>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SemaphorePhase {
    Ready,
    Full,
}

impl fmt::Display for SemaphorePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemaphorePhase::Ready => f.write_str("Ready"),
            SemaphorePhase::Full => f.write_str("Full"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemaphoreStatus {
    #[serde(default)]
    pub in_use: u32,
    #[serde(default)]
    pub available: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<SemaphorePhase>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitSpec {
    pub semaphore: String,
    pub holder: String,
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<Duration>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermitPhase {
    Granted,
    Denied,
    Expired,
}

impl fmt::Display for PermitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermitPhase::Granted => f.write_str("Granted"),
            PermitPhase::Denied => f.write_str("Denied"),
            PermitPhase::Expired => f.write_str("Expired"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquired_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<PermitPhase>,
}

impl Permit {
    /// A permit counts against the semaphore unless its expiry has passed
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.status.expires_at.is_some_and(|at| is_expired(at, now))
    }
}

/// Name of the Permit a holder creates against a semaphore
pub fn permit_name(semaphore: &str, holder: &str) -> String {
    format!("{semaphore}-{holder}")
}

/// Number of live permits, saturating at `u32::MAX`
pub fn count_live(permits: &[Permit], now: DateTime<Utc>) -> u32 {
    let live = permits.iter().filter(|p| p.is_live(now)).count();
    u32::try_from(live).unwrap_or(u32::MAX)
}

/// Build a granted Permit for `holder`, or refuse when the semaphore is full.
///
/// The expiry comes from `ttl` when given, else from the semaphore's ttl.
/// The caller creates the returned object and must re-count afterwards,
/// since concurrent acquirers can pass this check together.
pub fn grant(
    semaphore: &Semaphore,
    permits: &[Permit],
    holder: &str,
    ttl: Option<Duration>,
    now: DateTime<Utc>,
) -> Result<Permit, Refusal> {
    let in_use = count_live(permits, now);
    if in_use >= semaphore.spec.permits {
        return Err(Refusal::Full {
            in_use,
            permits: semaphore.spec.permits,
        });
    }
    let name = &semaphore.metadata.name;
    let meta = ObjectMeta::new(&semaphore.metadata.namespace, permit_name(name, holder))
        .with_label(SEMAPHORE_LABEL, name);
    let spec = PermitSpec {
        semaphore: name.clone(),
        holder: holder.to_string(),
        ttl,
    };
    let status = PermitStatus {
        acquired_at: Some(now),
        expires_at: ttl.or(semaphore.spec.ttl).map(|ttl| after(now, ttl)),
        phase: Some(PermitPhase::Granted),
    };
    Ok(Permit::new(meta, spec).with_status(status))
}

/// Count live permits and report availability
pub fn reconcile(
    semaphore: &Semaphore,
    permits: &[Permit],
    now: DateTime<Utc>,
    intervals: &Intervals,
) -> Reconciled<SemaphoreStatus> {
    let previous = semaphore.status.phase;
    let in_use = count_live(permits, now);
    let available = semaphore.spec.permits.saturating_sub(in_use);
    let phase = if available > 0 {
        SemaphorePhase::Ready
    } else {
        SemaphorePhase::Full
    };
    let status = SemaphoreStatus {
        in_use,
        available,
        phase: Some(phase),
    };

    let mut out = Reconciled::new(status, Action::RequeueAfter(intervals.semaphore_resync));
    if in_use > semaphore.spec.permits {
        out = out.emit(Event::SemaphoreOversubscribed {
            namespace: semaphore.metadata.namespace.clone(),
            name: semaphore.metadata.name.clone(),
            in_use,
            permits: semaphore.spec.permits,
        });
    }
    out.phase_change(
        Kind::Semaphore,
        &semaphore.metadata,
        previous.as_ref(),
        &phase,
    )
}

/// Mark a Permit Expired once its expiry passes; never touches the semaphore
pub fn reconcile_permit(
    permit: &Permit,
    now: DateTime<Utc>,
    intervals: &Intervals,
) -> Reconciled<PermitStatus> {
    let previous = permit.status.phase;
    let mut status = permit.status.clone();

    let action = match status.expires_at {
        Some(at) if is_expired(at, now) => {
            status.phase = Some(PermitPhase::Expired);
            Action::NoRequeue
        }
        Some(at) => Action::RequeueAfter(intervals.requeue_until(at, now)),
        None => Action::NoRequeue,
    };
    if status.phase.is_none() {
        status.phase = Some(PermitPhase::Granted);
    }

    let phase = status.phase.unwrap_or(PermitPhase::Granted);
    let mut out = Reconciled::new(status, action);
    if phase == PermitPhase::Expired && previous != Some(PermitPhase::Expired) {
        out = out.emit(Event::PermitExpired {
            namespace: permit.metadata.namespace.clone(),
            name: permit.metadata.name.clone(),
            holder: permit.spec.holder.clone(),
        });
    }
    out.phase_change(Kind::Permit, &permit.metadata, previous.as_ref(), &phase)
}

#[cfg(test)]
#[path = "semaphore_tests.rs"]
mod tests;
