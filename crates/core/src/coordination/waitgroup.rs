// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WaitGroup: a counter clients raise and lower; done at zero or below

use crate::meta::Kind;
use crate::reconcile::{Action, Reconciled};
use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub type WaitGroup = Resource<WaitGroupSpec, WaitGroupStatus>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitGroupSpec {
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<Duration>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitGroupPhase {
    Waiting,
    Done,
}

impl fmt::Display for WaitGroupPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitGroupPhase::Waiting => f.write_str("Waiting"),
            WaitGroupPhase::Done => f.write_str("Done"),
        }
    }
}

impl WaitGroupPhase {
    pub fn of(counter: i32) -> Self {
        if counter <= 0 {
            WaitGroupPhase::Done
        } else {
            WaitGroupPhase::Waiting
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitGroupStatus {
    #[serde(default)]
    pub counter: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<WaitGroupPhase>,
}

impl WaitGroupStatus {
    /// Adjust the counter by `delta`, saturating at the i32 bounds
    pub fn add(&mut self, delta: i32) {
        self.counter = self.counter.saturating_add(delta);
        self.phase = Some(WaitGroupPhase::of(self.counter));
    }

    pub fn done(&mut self) {
        self.add(-1);
    }
}

pub fn reconcile(wg: &WaitGroup) -> Reconciled<WaitGroupStatus> {
    let previous = wg.status.phase;
    let phase = WaitGroupPhase::of(wg.status.counter);
    let status = WaitGroupStatus {
        counter: wg.status.counter,
        phase: Some(phase),
    };
    Reconciled::new(status, Action::NoRequeue).phase_change(
        Kind::WaitGroup,
        &wg.metadata,
        previous.as_ref(),
        &phase,
    )
}

#[cfg(test)]
#[path = "waitgroup_tests.rs"]
mod tests;
