// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store error taxonomy

use crate::journal::JournalError;
use kord_core::ValidationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by any [`crate::Store`] implementation.
///
/// Variants carry rendered messages so they survive the daemon socket.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid: {0}")]
    Invalid(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("{0}")]
    Internal(String),
}

/// Wire-stable classification of a [`StoreError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    NotFound,
    Conflict,
    AlreadyExists,
    Invalid,
    Unsupported,
    Internal,
}

impl StoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::NotFound(_) => ErrorCode::NotFound,
            StoreError::AlreadyExists(_) => ErrorCode::AlreadyExists,
            StoreError::Conflict(_) => ErrorCode::Conflict,
            StoreError::Invalid(_) => ErrorCode::Invalid,
            StoreError::Unsupported(_) => ErrorCode::Unsupported,
            StoreError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Rebuild an error received as a code and bare message
    pub fn from_code(code: ErrorCode, message: String) -> Self {
        match code {
            ErrorCode::NotFound => StoreError::NotFound(message),
            ErrorCode::AlreadyExists => StoreError::AlreadyExists(message),
            ErrorCode::Conflict => StoreError::Conflict(message),
            ErrorCode::Invalid => StoreError::Invalid(message),
            ErrorCode::Unsupported => StoreError::Unsupported(message),
            ErrorCode::Internal => StoreError::Internal(message),
        }
    }

    /// The message without the classification prefix
    pub fn message(&self) -> &str {
        match self {
            StoreError::NotFound(m)
            | StoreError::AlreadyExists(m)
            | StoreError::Conflict(m)
            | StoreError::Invalid(m)
            | StoreError::Unsupported(m)
            | StoreError::Internal(m) => m,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists(_))
    }
}

impl From<ValidationError> for StoreError {
    fn from(e: ValidationError) -> Self {
        StoreError::Invalid(e.to_string())
    }
}

impl From<JournalError> for StoreError {
    fn from(e: JournalError) -> Self {
        StoreError::Internal(format!("journal: {e}"))
    }
}
