// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TTL garbage collection for Once and WaitGroup resources

use kord_core::clock::is_expired;
use kord_core::{Clock, Kind, LabelSelector};
use kord_storage::{Store, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Kinds whose ttl bounds the object's lifetime
const COLLECTED: [Kind; 2] = [Kind::Once, Kind::WaitGroup];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JanitorConfig {
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub scanned: usize,
    pub deleted: usize,
}

pub struct Janitor<C: Clock> {
    store: Arc<dyn Store>,
    clock: C,
    config: JanitorConfig,
}

impl<C: Clock> Janitor<C> {
    pub fn new(store: Arc<dyn Store>, clock: C, config: JanitorConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Delete every collectable object whose `creation + ttl` has passed
    pub async fn sweep(&self) -> Result<SweepStats, StoreError> {
        let now = self.clock.now();
        let mut stats = SweepStats::default();
        for kind in COLLECTED {
            let objects = self
                .store
                .list(kind, None, &LabelSelector::everything())
                .await?;
            stats.scanned += objects.len();
            for object in objects {
                if !object.collect_after().is_some_and(|at| is_expired(at, now)) {
                    continue;
                }
                match self.store.delete(&object.key()).await {
                    Ok(()) => {
                        tracing::info!(key = %object.key(), "ttl elapsed, deleted");
                        stats.deleted += 1;
                    }
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(stats)
    }

    /// Sweep on the configured interval until `shutdown` flips to true
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut tick = tokio::time::interval(self.config.interval);
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = tick.tick() => match self.sweep().await {
                    Ok(stats) if stats.deleted > 0 => {
                        tracing::info!(scanned = stats.scanned, deleted = stats.deleted, "janitor sweep");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "janitor sweep failed"),
                },
            }
        }
    }
}

#[cfg(test)]
#[path = "janitor_tests.rs"]
mod tests;
