// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gate: opens when every referenced condition holds
//!
//! An open gate keeps tracking its conditions and can close again. A gate
//! that times out with unmet conditions fails permanently.

use super::condition::{evaluate, ConditionStatus, GateCondition, GateInputs};
use crate::clock::after;
use crate::effect::Event;
use crate::meta::Kind;
use crate::reconcile::{Action, Intervals, Reconciled};
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub type Gate = Resource<GateSpec, GateStatus>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateSpec {
    #[serde(default)]
    pub conditions: Vec<GateCondition>,
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatePhase {
    Waiting,
    Open,
    Failed,
}

impl fmt::Display for GatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatePhase::Waiting => f.write_str("Waiting"),
            GatePhase::Open => f.write_str("Open"),
            GatePhase::Failed => f.write_str("Failed"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<GatePhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opened_at: Option<DateTime<Utc>>,
}

impl Gate {
    /// When the gate's timeout runs out, if it has one
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        let timeout = self.spec.timeout?;
        let created = self.metadata.creation_timestamp?;
        Some(after(created, timeout))
    }

    /// Whether this gate has a condition on `kind`/`name`
    pub fn references(&self, kind: Kind, name: &str) -> bool {
        self.spec
            .conditions
            .iter()
            .any(|c| c.reference() == Some((kind, name)))
    }
}

pub fn reconcile(
    gate: &Gate,
    inputs: &GateInputs,
    now: DateTime<Utc>,
    intervals: &Intervals,
) -> Reconciled<GateStatus> {
    let previous = gate.status.phase;
    if previous == Some(GatePhase::Failed) {
        return Reconciled::new(gate.status.clone(), Action::NoRequeue);
    }

    let meta = &gate.metadata;
    let conditions: Vec<ConditionStatus> = gate
        .spec
        .conditions
        .iter()
        .map(|c| evaluate(c, inputs))
        .collect();
    let unmet = conditions.iter().filter(|c| !c.met).count();
    let deadline = gate.deadline();
    let mut status = GateStatus {
        conditions,
        ..gate.status.clone()
    };

    let (phase, action) = if unmet == 0 {
        status.opened_at.get_or_insert(now);
        (GatePhase::Open, Action::RequeueAfter(intervals.gate_max))
    } else if deadline.is_some_and(|d| now > d) {
        (GatePhase::Failed, Action::NoRequeue)
    } else {
        (
            GatePhase::Waiting,
            Action::RequeueAfter(intervals.gate_poll(deadline, now)),
        )
    };
    status.phase = Some(phase);

    let mut out = Reconciled::new(status, action);
    if previous != Some(phase) {
        match phase {
            GatePhase::Open => {
                out = out.emit(Event::GateOpened {
                    namespace: meta.namespace.clone(),
                    name: meta.name.clone(),
                });
            }
            GatePhase::Failed => {
                out = out.emit(Event::GateFailed {
                    namespace: meta.namespace.clone(),
                    name: meta.name.clone(),
                    unmet,
                });
            }
            GatePhase::Waiting => {}
        }
    }
    out.phase_change(Kind::Gate, meta, previous.as_ref(), &phase)
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
