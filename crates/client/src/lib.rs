// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kord-client: caller-side operations on kord primitives
//!
//! Every status change is a retrying conditional write against the store.
//! Blocking operations poll with exponential backoff and jitter until a
//! caller-supplied timeout.

mod backoff;
mod barrier;
mod client;
mod error;
mod latches;
mod lease;
mod locks;
mod semaphore;

pub use backoff::{Backoff, BackoffConfig};
pub use barrier::BarrierHandle;
pub use client::{Client, ClientConfig};
pub use error::ClientError;
pub use latches::{GateHandle, JobHandle, OnceHandle, WaitGroupHandle};
pub use lease::LeaseHandle;
pub use locks::{MutexHandle, RwMutexHandle};
pub use semaphore::SemaphoreHandle;
