// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! kord-storage: the versioned object store
//!
//! Provides the [`Store`] contract the controller and clients program
//! against, an in-memory implementation with watch fan-out, and a
//! JSON-lines journal that makes the in-memory store survive restarts.

mod error;
#[cfg(any(test, feature = "test-support"))]
mod faulty;
mod journal;
mod memory;
mod state;
mod store;
mod traced;

pub use error::{ErrorCode, StoreError};
pub use journal::{Journal, JournalError, JournalOp};
pub use memory::MemoryStore;
pub use state::MaterializedState;
pub use store::{get_as, list_as, Store, WatchEvent, WATCH_CAPACITY};
pub use traced::TracedStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use faulty::{FaultyStore, StoreCall};
