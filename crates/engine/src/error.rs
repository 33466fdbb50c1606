// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the controller runtime

use kord_storage::StoreError;
use thiserror::Error;

/// Errors a store-bound reconciler can return
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("{key} is not the kind its key names")]
    WrongKind { key: String },
    #[error("no reconciler registered for {0}")]
    Unregistered(String),
}

impl ReconcileError {
    /// The object vanished; nothing to retry
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReconcileError::Store(e) if e.is_not_found())
    }

    /// A stale write; retry straight away against fresh state
    pub fn is_conflict(&self) -> bool {
        matches!(self, ReconcileError::Store(e) if e.is_conflict())
    }
}
