// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.
//!
//! This module provides enhanced error types that include:
//! - What went wrong (message)
//! - Why it might have happened (context)
//! - How to fix it (suggestions)

use crate::client::DaemonError;
use kord_client::ClientError;
use kord_core::coordination::Refusal;
use kord_core::ObjectKey;
use kord_storage::StoreError;
use std::fmt;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct KordError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
}

impl KordError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Best rendering for an error returned from a command
    pub fn from_anyhow(error: &anyhow::Error) -> Self {
        if let Some(e) = error.downcast_ref::<ClientError>() {
            return Self::from_client(e);
        }
        if let Some(e) = error.downcast_ref::<DaemonError>() {
            return Self::from_daemon(e);
        }
        if let Some(e) = error.downcast_ref::<StoreError>() {
            return Self::from_store(e);
        }
        let mut err = Self::new(error.to_string());
        for cause in error.chain().skip(1) {
            err = err.with_context(cause.to_string());
        }
        err
    }

    pub fn from_client(error: &ClientError) -> Self {
        match error {
            ClientError::Store(e) => Self::from_store(e),
            ClientError::Refused { key, refusal } => Self::refused(key, refusal),
            ClientError::Conflict { key, attempts } => KordError::new(error.to_string())
                .with_context(format!(
                    "{} was modified concurrently on each of {} attempts",
                    key, attempts
                ))
                .with_suggestion("Retry the command"),
            ClientError::Timeout { key, .. } => KordError::new(error.to_string())
                .with_suggestion(format!("Inspect its status: kord get {} {}", kind_arg(key), key.name))
                .with_suggestion("Wait longer with --timeout"),
            ClientError::Failed { .. } => KordError::new(error.to_string())
                .with_context("The resource reached a terminal Failed phase"),
        }
    }

    fn refused(key: &ObjectKey, refusal: &Refusal) -> Self {
        let err = KordError::new(format!("{}: {}", key, refusal));
        match refusal {
            Refusal::LockHeld { holder } => err
                .with_context(format!("'{}' currently holds it", holder))
                .with_suggestion("Wait for the holder to release it")
                .with_suggestion("Block until it is free with --wait"),
            Refusal::NotHolder { holder } => err
                .with_context(format!("'{}' is not a current holder", holder))
                .with_suggestion(format!("Check holders: kord get {} {}", kind_arg(key), key.name)),
            Refusal::AlreadyExecuted { executor } => {
                err.with_context(format!("'{}' already ran it", executor))
            }
            Refusal::NotPending { .. } => err,
            Refusal::Full { .. } => err
                .with_suggestion("Wait for a permit with --wait")
                .with_suggestion("Check holders: kord list permits"),
        }
    }

    pub fn from_store(error: &StoreError) -> Self {
        let err = KordError::new(error.to_string());
        match error {
            StoreError::NotFound(_) => {
                err.with_suggestion("List existing resources: kord list <kind> --all-namespaces")
            }
            StoreError::AlreadyExists(_) => {
                err.with_suggestion("Delete it first: kord delete <kind> <name>")
            }
            StoreError::Invalid(_) => err.with_context("The daemon rejected the resource"),
            _ => err,
        }
    }

    pub fn from_daemon(error: &DaemonError) -> Self {
        let err = KordError::new(error.to_string());
        match error {
            DaemonError::DaemonNotRunning => {
                err.with_suggestion("Start the daemon: kord daemon start")
            }
            DaemonError::DaemonStartFailed(_) | DaemonError::DaemonStartTimeout => err
                .with_suggestion("Check the daemon log: kord daemon logs")
                .with_suggestion("Set KORD_DAEMON_BINARY if kordd is not on PATH"),
            DaemonError::Store(e) => Self::from_store(e),
            _ => err.with_suggestion("Check the daemon status: kord daemon status"),
        }
    }
}

/// Lowercase kind as accepted by `kord get`
fn kind_arg(key: &ObjectKey) -> String {
    key.kind.as_str().to_ascii_lowercase()
}

impl fmt::Display for KordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for KordError {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
