// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Externally managed jobs that gates can wait on
//!
//! Jobs are never reconciled. Whatever runs the work records its outcome.

use crate::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Job = Resource<JobSpec, JobStatus>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    #[serde(default)]
    pub succeeded: u32,
    #[serde(default)]
    pub failed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,
}

impl JobStatus {
    /// Record one finished run
    pub fn complete(&mut self, success: bool, now: DateTime<Utc>) {
        if success {
            self.succeeded = self.succeeded.saturating_add(1);
        } else {
            self.failed = self.failed.saturating_add(1);
        }
        self.completion_time = Some(now);
    }

    pub fn outcome(&self) -> Option<&'static str> {
        if self.succeeded > 0 {
            Some("Succeeded")
        } else if self.failed > 0 {
            Some("Failed")
        } else {
            None
        }
    }
}
