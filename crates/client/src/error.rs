// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use kord_core::coordination::Refusal;
use kord_core::ObjectKey;
use kord_storage::StoreError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{key}: {refusal}")]
    Refused { key: ObjectKey, refusal: Refusal },

    #[error("{key}: gave up after {attempts} conflicting writes")]
    Conflict { key: ObjectKey, attempts: u32 },

    #[error("timed out after {timeout:?} waiting for {key}")]
    Timeout { key: ObjectKey, timeout: Duration },

    #[error("{key} failed: {message}")]
    Failed { key: ObjectKey, message: String },
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Store(e) if e.is_not_found())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout { .. })
    }

    pub fn refusal(&self) -> Option<&Refusal> {
        match self {
            ClientError::Refused { refusal, .. } => Some(refusal),
            _ => None,
        }
    }
}
