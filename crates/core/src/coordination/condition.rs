// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gate conditions and their evaluation
//!
//! A condition references another resource in the gate's namespace. The
//! engine gathers the referenced objects into [`GateInputs`] and
//! [`evaluate`] decides each condition without touching the store, so a
//! missing reference is an unmet condition rather than an error.

use super::barrier::BarrierPhase;
use super::job::JobStatus;
use super::lease::LeasePhase;
use super::semaphore::SemaphoreStatus;
use crate::meta::Kind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A typed reference a gate waits on
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCondition", into = "RawCondition")]
pub enum GateCondition {
    /// Met once the Job reports a success
    Job { name: String },
    /// Met while the Semaphore has at least `value` permits available
    Semaphore { name: String, value: Option<u32> },
    /// Met while the Barrier is in `state`
    Barrier { name: String, state: BarrierPhase },
    /// Met while the Lease is in `state`
    Lease { name: String, state: LeasePhase },
    /// A condition type this build does not understand; never met
    Unknown { type_name: String, name: String },
}

impl GateCondition {
    /// The wire `type` of this condition
    pub fn type_name(&self) -> &str {
        match self {
            GateCondition::Job { .. } => "Job",
            GateCondition::Semaphore { .. } => "Semaphore",
            GateCondition::Barrier { .. } => "Barrier",
            GateCondition::Lease { .. } => "Lease",
            GateCondition::Unknown { type_name, .. } => type_name,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            GateCondition::Job { name }
            | GateCondition::Semaphore { name, .. }
            | GateCondition::Barrier { name, .. }
            | GateCondition::Lease { name, .. }
            | GateCondition::Unknown { name, .. } => name,
        }
    }

    /// The resource this condition observes, if its type is known
    pub fn reference(&self) -> Option<(Kind, &str)> {
        match self {
            GateCondition::Job { name } => Some((Kind::Job, name)),
            GateCondition::Semaphore { name, .. } => Some((Kind::Semaphore, name)),
            GateCondition::Barrier { name, .. } => Some((Kind::Barrier, name)),
            GateCondition::Lease { name, .. } => Some((Kind::Lease, name)),
            GateCondition::Unknown { .. } => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawCondition {
    #[serde(rename = "type")]
    type_name: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<String>,
}

fn parse_barrier_state(state: &str) -> Result<BarrierPhase, String> {
    match state.to_ascii_lowercase().as_str() {
        "waiting" => Ok(BarrierPhase::Waiting),
        "open" => Ok(BarrierPhase::Open),
        "failed" => Ok(BarrierPhase::Failed),
        _ => Err(format!("invalid barrier state: {state}")),
    }
}

fn parse_lease_state(state: &str) -> Result<LeasePhase, String> {
    match state.to_ascii_lowercase().as_str() {
        "available" => Ok(LeasePhase::Available),
        "held" => Ok(LeasePhase::Held),
        "expired" => Ok(LeasePhase::Expired),
        _ => Err(format!("invalid lease state: {state}")),
    }
}

impl TryFrom<RawCondition> for GateCondition {
    type Error = String;

    fn try_from(raw: RawCondition) -> Result<Self, Self::Error> {
        let RawCondition {
            type_name,
            name,
            value,
            state,
        } = raw;
        let condition = match type_name.as_str() {
            "Job" => GateCondition::Job { name },
            "Semaphore" => GateCondition::Semaphore { name, value },
            "Barrier" => GateCondition::Barrier {
                name,
                state: state
                    .as_deref()
                    .map(parse_barrier_state)
                    .transpose()?
                    .unwrap_or(BarrierPhase::Open),
            },
            "Lease" => GateCondition::Lease {
                name,
                state: state
                    .as_deref()
                    .map(parse_lease_state)
                    .transpose()?
                    .unwrap_or(LeasePhase::Available),
            },
            _ => GateCondition::Unknown { type_name, name },
        };
        Ok(condition)
    }
}

impl From<GateCondition> for RawCondition {
    fn from(condition: GateCondition) -> Self {
        let type_name = condition.type_name().to_string();
        match condition {
            GateCondition::Job { name } | GateCondition::Unknown { name, .. } => RawCondition {
                type_name,
                name,
                value: None,
                state: None,
            },
            GateCondition::Semaphore { name, value } => RawCondition {
                type_name,
                name,
                value,
                state: None,
            },
            GateCondition::Barrier { name, state } => RawCondition {
                type_name,
                name,
                value: None,
                state: Some(state.to_string()),
            },
            GateCondition::Lease { name, state } => RawCondition {
                type_name,
                name,
                value: None,
                state: Some(state.to_string()),
            },
        }
    }
}

/// Observed outcome of one condition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionStatus {
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
    pub met: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Referenced resources gathered for a gate, keyed by name.
///
/// Barrier and Lease entries hold the observed phase, which is `None` until
/// that resource's own reconciler has run.
#[derive(Clone, Debug, Default)]
pub struct GateInputs {
    pub jobs: HashMap<String, JobStatus>,
    pub semaphores: HashMap<String, SemaphoreStatus>,
    pub barriers: HashMap<String, Option<BarrierPhase>>,
    pub leases: HashMap<String, Option<LeasePhase>>,
}

fn not_found(kind: &str, name: &str) -> String {
    format!("{kind} {name} not found")
}

fn phase_label<P: ToString>(phase: Option<P>) -> String {
    phase.map_or_else(|| "unobserved".to_string(), |p| p.to_string())
}

/// Decide one condition against the gathered inputs
pub fn evaluate(condition: &GateCondition, inputs: &GateInputs) -> ConditionStatus {
    let (met, message) = match condition {
        GateCondition::Job { name } => match inputs.jobs.get(name) {
            None => (false, not_found("Job", name)),
            Some(job) if job.succeeded > 0 => (true, format!("Job {name} succeeded")),
            Some(job) if job.failed > 0 => (false, format!("Job {name} failed")),
            Some(_) => (false, format!("Job {name} has not succeeded")),
        },
        GateCondition::Semaphore { name, value } => {
            match (value, inputs.semaphores.get(name)) {
                (None, _) => (false, "semaphore condition requires a value".to_string()),
                (Some(_), None) => (false, not_found("Semaphore", name)),
                (Some(value), Some(sem)) if sem.available >= *value => (
                    true,
                    format!("{} available, need {value}", sem.available),
                ),
                (Some(value), Some(sem)) => (
                    false,
                    format!("{} available, need {value}", sem.available),
                ),
            }
        }
        GateCondition::Barrier { name, state } => match inputs.barriers.get(name) {
            None => (false, not_found("Barrier", name)),
            Some(phase) => (
                *phase == Some(*state),
                format!("Barrier {name} is {}, want {state}", phase_label(*phase)),
            ),
        },
        GateCondition::Lease { name, state } => match inputs.leases.get(name) {
            None => (false, not_found("Lease", name)),
            Some(phase) => (
                *phase == Some(*state),
                format!("Lease {name} is {}, want {state}", phase_label(*phase)),
            ),
        },
        GateCondition::Unknown { type_name, .. } => (
            false,
            format!("unsupported condition type: {type_name}"),
        ),
    };
    ConditionStatus {
        type_name: condition.type_name().to_string(),
        name: condition.name().to_string(),
        met,
        message: Some(message),
    }
}

#[cfg(test)]
#[path = "condition_tests.rs"]
mod tests;
