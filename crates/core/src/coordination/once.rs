// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Once: a latch that records a single execution
//!
//! Only clients set `executed`. The reconciler keeps the phase consistent
//! with it, tolerating a client write that lands before any reconcile.

use super::Refusal;
use crate::meta::Kind;
use crate::reconcile::{Action, Reconciled};
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub type Once = Resource<OnceSpec, OnceStatus>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnceSpec {
    /// Lifetime after creation before the janitor deletes it
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<Duration>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OncePhase {
    Pending,
    Executed,
}

impl fmt::Display for OncePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OncePhase::Pending => f.write_str("Pending"),
            OncePhase::Executed => f.write_str("Executed"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnceStatus {
    #[serde(default)]
    pub executed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<OncePhase>,
}

impl OnceStatus {
    /// Claim the execution for `executor`; refused if someone already has
    pub fn mark_executed(&mut self, executor: &str, now: DateTime<Utc>) -> Result<(), Refusal> {
        if self.executed {
            return Err(Refusal::AlreadyExecuted {
                executor: self.executor.clone().unwrap_or_default(),
            });
        }
        self.executed = true;
        self.executor = Some(executor.to_string());
        self.executed_at = Some(now);
        self.phase = Some(OncePhase::Executed);
        Ok(())
    }
}

pub fn reconcile(once: &Once) -> Reconciled<OnceStatus> {
    let previous = once.status.phase;
    let phase = if once.status.executed {
        OncePhase::Executed
    } else {
        OncePhase::Pending
    };
    let status = OnceStatus {
        phase: Some(phase),
        ..once.status.clone()
    };
    Reconciled::new(status, Action::NoRequeue).phase_change(
        Kind::Once,
        &once.metadata,
        previous.as_ref(),
        &phase,
    )
}

#[cfg(test)]
#[path = "once_tests.rs"]
mod tests;
