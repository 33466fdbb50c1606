// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kord controller runtime
//!
//! Binds the pure reconcilers in `kord-core` to a [`kord_storage::Store`]:
//! watches for changes, maps them to keys, and runs a pool of workers over a
//! deduplicating queue with timers and error backoff.

mod controller;
pub mod dispatch;
mod error;
mod executor;
mod janitor;
mod queue;
pub mod reconciler;
mod registry;

pub use controller::{Controller, ControllerConfig, QueueStats};
pub use error::ReconcileError;
pub use executor::{log_event, Executor};
pub use janitor::{Janitor, JanitorConfig, SweepStats};
pub use queue::{WorkQueue, BACKOFF_BASE, BACKOFF_MAX};
pub use reconciler::{Context, Reconciler};
pub use registry::Registry;
