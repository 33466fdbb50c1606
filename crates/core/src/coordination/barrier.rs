// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rendezvous barrier with optional quorum and timeout
//!
//! Participants record their arrival by creating an Arrival child. The
//! barrier opens once enough have arrived, or fails if its timeout elapses
//! first. Both outcomes are final.

use crate::clock::after;
use crate::effect::Event;
use crate::meta::{Kind, ObjectMeta, BARRIER_LABEL};
use crate::reconcile::{Action, Intervals, Reconciled};
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub type Barrier = Resource<BarrierSpec, BarrierStatus>;
pub type Arrival = Resource<ArrivalSpec, ArrivalStatus>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarrierSpec {
    pub expected: u32,
    /// Arrivals needed to open; defaults to `expected`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quorum: Option<u32>,
    /// Measured from the barrier's creation
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl BarrierSpec {
    pub fn required(&self) -> u32 {
        self.quorum.unwrap_or(self.expected)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarrierPhase {
    Waiting,
    Open,
    Failed,
}

impl BarrierPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BarrierPhase::Open | BarrierPhase::Failed)
    }
}

impl fmt::Display for BarrierPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarrierPhase::Waiting => f.write_str("Waiting"),
            BarrierPhase::Open => f.write_str("Open"),
            BarrierPhase::Failed => f.write_str("Failed"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarrierStatus {
    #[serde(default)]
    pub arrived: u32,
    /// Holder names in arrival order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arrivals: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<BarrierPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opened_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalSpec {
    pub barrier: String,
    pub holder: String,
}

/// Arrivals carry no observed state
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalStatus {}

/// Name of the Arrival a holder creates for a barrier
pub fn arrival_name(barrier: &str, holder: &str) -> String {
    format!("{barrier}-{holder}")
}

/// Build the Arrival object recording `holder` at `barrier`
pub fn arrival(namespace: &str, barrier: &str, holder: &str) -> Arrival {
    let meta = ObjectMeta::new(namespace, arrival_name(barrier, holder))
        .with_label(BARRIER_LABEL, barrier);
    Arrival::new(
        meta,
        ArrivalSpec {
            barrier: barrier.to_string(),
            holder: holder.to_string(),
        },
    )
}

/// Count arrivals and decide whether the barrier opens, fails or keeps waiting.
///
/// `arrivals` must be in creation order.
pub fn reconcile(
    barrier: &Barrier,
    arrivals: &[Arrival],
    now: DateTime<Utc>,
    intervals: &Intervals,
) -> Reconciled<BarrierStatus> {
    let previous = barrier.status.phase;
    if previous.is_some_and(|p| p.is_terminal()) {
        return Reconciled::new(barrier.status.clone(), Action::NoRequeue);
    }

    let holders: Vec<String> = arrivals.iter().map(|a| a.spec.holder.clone()).collect();
    let arrived = u32::try_from(holders.len()).unwrap_or(u32::MAX);
    let required = barrier.spec.required();
    let timed_out = match (barrier.spec.timeout, barrier.metadata.creation_timestamp) {
        (Some(timeout), Some(created)) => now > after(created, timeout),
        _ => false,
    };

    let meta = &barrier.metadata;
    let mut status = BarrierStatus {
        arrived,
        arrivals: holders,
        ..barrier.status.clone()
    };

    let (phase, action, event) = if timed_out && arrived < required {
        status.message = Some(format!(
            "timed out with {arrived}/{required} arrivals"
        ));
        let event = Event::BarrierFailed {
            namespace: meta.namespace.clone(),
            name: meta.name.clone(),
            arrived,
            required,
        };
        (BarrierPhase::Failed, Action::NoRequeue, Some(event))
    } else if arrived >= required {
        status.opened_at.get_or_insert(now);
        status.message = Some(format!("{arrived}/{required} arrived"));
        let event = Event::BarrierOpened {
            namespace: meta.namespace.clone(),
            name: meta.name.clone(),
            arrived,
        };
        (BarrierPhase::Open, Action::NoRequeue, Some(event))
    } else {
        status.message = Some(format!("waiting for {}", required - arrived));
        (
            BarrierPhase::Waiting,
            Action::RequeueAfter(intervals.barrier_poll),
            None,
        )
    };
    status.phase = Some(phase);

    let mut out = Reconciled::new(status, action);
    if let Some(event) = event {
        out = out.emit(event);
    }
    out.phase_change(Kind::Barrier, meta, previous.as_ref(), &phase)
}

#[cfg(test)]
#[path = "barrier_tests.rs"]
mod tests;
