// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kord-core: resource model and reconcilers for kord synchronization primitives
//!
//! This crate provides:
//! - The typed resource model (metadata, spec, status) for every primitive
//! - Pure reconcile functions that converge a resource's status
//! - The gate condition evaluator
//! - Requeue scheduling helpers and admission validation

pub mod clock;
pub mod coordination;
pub mod effect;
pub mod id;
pub mod meta;
pub mod reconcile;
pub mod resource;
pub mod traced;
pub mod validate;

pub use clock::{Clock, FakeClock, SystemClock};
pub use effect::{Effect, Event};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use meta::{Kind, LabelSelector, Labels, ObjectKey, ObjectMeta, ResourceVersion};
pub use reconcile::{Action, Intervals, Reconciled};
pub use resource::{Object, Resource, Spec};
pub use traced::TracedEvent;
pub use validate::ValidationError;
