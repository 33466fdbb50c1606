// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synchronization primitives as reconciled resources
//!
//! This module provides, per primitive:
//! - The spec and status types that make up the resource
//! - A pure `reconcile` function converging its status
//! - The status mutations clients apply through conditional writes

pub mod barrier;
pub mod condition;
pub mod gate;
pub mod job;
pub mod lease;
pub mod mutex;
pub mod once;
pub mod rwmutex;
pub mod semaphore;
pub mod waitgroup;

pub use barrier::{Arrival, ArrivalSpec, ArrivalStatus, Barrier, BarrierPhase, BarrierSpec, BarrierStatus};
pub use condition::{evaluate, ConditionStatus, GateCondition, GateInputs};
pub use gate::{Gate, GatePhase, GateSpec, GateStatus};
pub use job::{Job, JobSpec, JobStatus};
pub use lease::{
    Lease, LeasePhase, LeaseRequest, LeaseRequestPhase, LeaseRequestSpec, LeaseRequestStatus,
    LeaseSpec, LeaseStatus, TieBreak,
};
pub use mutex::{Mutex, MutexPhase, MutexSpec, MutexStatus};
pub use once::{Once, OncePhase, OnceSpec, OnceStatus};
pub use rwmutex::{RwMutex, RwMutexPhase, RwMutexSpec, RwMutexStatus};
pub use semaphore::{
    Permit, PermitPhase, PermitSpec, PermitStatus, Semaphore, SemaphorePhase, SemaphoreSpec,
    SemaphoreStatus,
};
pub use waitgroup::{WaitGroup, WaitGroupPhase, WaitGroupSpec, WaitGroupStatus};

/// A client mutation declined because of the resource's current state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Refusal {
    #[error("held by {holder}")]
    LockHeld { holder: String },
    #[error("{holder} does not hold it")]
    NotHolder { holder: String },
    #[error("already executed by {executor}")]
    AlreadyExecuted { executor: String },
    #[error("no permits available ({in_use}/{permits} in use)")]
    Full { in_use: u32, permits: u32 },
    #[error("request already {phase}")]
    NotPending { phase: String },
}

/// Treat a blank holder string as no holder
pub(crate) fn normalize_holder(holder: &mut Option<String>) {
    if holder.as_deref().is_some_and(|h| h.trim().is_empty()) {
        *holder = None;
    }
}
