// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exponential backoff with jitter

use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffConfig {
    pub initial: Duration,
    pub max: Duration,
}

impl BackoffConfig {
    pub const fn new(initial: Duration, max: Duration) -> Self {
        Self { initial, max }
    }
}

/// Delays that double from `initial` up to `max`.
///
/// Each delay adds up to half its base again as jitter, so callers that
/// collide once spread out on the next attempt.
#[derive(Debug, Clone)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl Backoff {
    pub fn new(config: BackoffConfig) -> Self {
        let max_ms = millis(config.max).max(1);
        Self {
            base_ms: millis(config.initial).clamp(1, max_ms),
            max_ms,
        }
    }

    /// The base of the next delay, before jitter
    pub fn base(&self) -> Duration {
        Duration::from_millis(self.base_ms)
    }

    pub fn next_delay(&mut self) -> Duration {
        // A fresh rng per call keeps the future Send across the caller's await
        let jitter = rand::rng().random_range(0..self.base_ms / 2 + 1);
        let delay = self.base_ms.saturating_add(jitter);
        self.base_ms = self.base_ms.saturating_mul(2).min(self.max_ms);
        Duration::from_millis(delay)
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
