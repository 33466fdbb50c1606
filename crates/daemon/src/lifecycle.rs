// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, recovery.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use fs2::FileExt;
use kord_core::{SystemClock, UuidIdGen};
use kord_daemon::{Config, ConfigError, Settings};
use kord_storage::{MemoryStore, StoreError, TracedStore};
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

/// The daemon's store: journaled, in memory, traced
pub type DaemonStore = TracedStore<MemoryStore<SystemClock, UuidIdGen>>;

/// Daemon state during operation
pub struct DaemonState {
    pub config: Config,
    pub settings: Settings,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub listener: UnixListener,
    pub store: Arc<DaemonStore>,
    pub start_time: Instant,
}

impl DaemonState {
    /// Remove the files that advertise a running daemon
    pub fn shutdown(&mut self) {
        info!("Shutting down daemon...");
        for path in [
            &self.config.socket_path,
            &self.config.lock_path,
            &self.config.version_path,
        ] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!(path = %path.display(), "Failed to remove file: {}", e);
                }
            }
        }
        // Lock file is released when self.lock_file is dropped
        info!("Daemon shutdown complete");
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(std::path::PathBuf, std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    match startup_inner(config).await {
        Ok(state) => Ok(state),
        // A held lock belongs to a running daemon whose files must stay
        Err(e @ LifecycleError::LockFailed(_)) => Err(e),
        Err(e) => {
            cleanup_on_failure(config);
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<DaemonState, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Lock first so two daemons never share a journal
    let mut lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&config.version_path, env!("CARGO_PKG_VERSION"))?;

    // Settings before binding: a bad config.toml must not accept connections
    let settings = config.load_settings()?;

    let memory = MemoryStore::open(&config.journal_path, SystemClock, UuidIdGen)?;
    let counts = memory.counts();
    info!(
        objects = counts.values().sum::<usize>(),
        kinds = counts.len(),
        "Loaded state"
    );

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!(state_dir = %config.state_dir.display(), "Daemon started");

    Ok(DaemonState {
        config: config.clone(),
        settings,
        lock_file,
        listener,
        store: Arc::new(TracedStore::new(memory)),
        start_time: Instant::now(),
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.version_path.exists() {
        let _ = std::fs::remove_file(&config.version_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
