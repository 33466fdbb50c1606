// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects and events produced by reconcilers

use crate::meta::Kind;
use serde::{Deserialize, Serialize};

/// Side effects a reconciler requests beyond its own status write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Emit an event for observers (logged by the engine)
    Emit(Event),
    /// Mark a LeaseRequest as granted (best-effort secondary write)
    GrantRequest { namespace: String, name: String },
}

/// Observable transitions emitted by reconcilers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A resource's phase changed
    PhaseChanged {
        kind: Kind,
        namespace: String,
        name: String,
        from: Option<String>,
        to: String,
    },
    /// A Mutex or RWMutex hold outlived its expiry and was cleared
    LockExpired {
        kind: Kind,
        namespace: String,
        name: String,
        holders: Vec<String>,
    },
    /// More live permits exist than the semaphore allows
    SemaphoreOversubscribed {
        namespace: String,
        name: String,
        in_use: u32,
        permits: u32,
    },
    /// A Permit passed its expiry
    PermitExpired {
        namespace: String,
        name: String,
        holder: String,
    },
    /// A Barrier reached its required arrivals
    BarrierOpened {
        namespace: String,
        name: String,
        arrived: u32,
    },
    /// A Barrier timed out before enough arrivals
    BarrierFailed {
        namespace: String,
        name: String,
        arrived: u32,
        required: u32,
    },
    /// A Lease holder passed its expiry
    LeaseExpired {
        namespace: String,
        name: String,
        holder: String,
    },
    /// A Lease was granted to a pending request
    LeaseGranted {
        namespace: String,
        name: String,
        holder: String,
        request: String,
        priority: i32,
    },
    /// Every Gate condition was met
    GateOpened { namespace: String, name: String },
    /// A Gate timed out with unmet conditions
    GateFailed {
        namespace: String,
        name: String,
        unmet: usize,
    },
}

impl Event {
    /// Short name for log spans (e.g. "lease:granted")
    pub fn name(&self) -> &'static str {
        match self {
            Event::PhaseChanged { .. } => "phase:changed",
            Event::LockExpired { .. } => "lock:expired",
            Event::SemaphoreOversubscribed { .. } => "semaphore:oversubscribed",
            Event::PermitExpired { .. } => "permit:expired",
            Event::BarrierOpened { .. } => "barrier:opened",
            Event::BarrierFailed { .. } => "barrier:failed",
            Event::LeaseExpired { .. } => "lease:expired",
            Event::LeaseGranted { .. } => "lease:granted",
            Event::GateOpened { .. } => "gate:opened",
            Event::GateFailed { .. } => "gate:failed",
        }
    }

    /// Whether the event signals a condition operators should look at
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Event::SemaphoreOversubscribed { .. }
                | Event::BarrierFailed { .. }
                | Event::GateFailed { .. }
        )
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
