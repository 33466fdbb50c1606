// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon paths and the optional `config.toml`

use kord_core::Intervals;
use kord_engine::{ControllerConfig, JanitorConfig};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine state directory (set KORD_STATE_DIR or HOME)")]
    NoStateDir,

    #[error("Failed to resolve {0}: {1}")]
    Resolve(PathBuf, #[source] std::io::Error),

    #[error("Failed to read {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Invalid config {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),
}

/// Filesystem layout of one daemon instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    pub version_path: PathBuf,
    pub log_path: PathBuf,
    /// JSON-lines store journal
    pub journal_path: PathBuf,
    pub settings_path: PathBuf,
}

impl Config {
    /// Resolve from an explicit directory, `KORD_STATE_DIR`, or the XDG default
    pub fn resolve(state_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let dir = match state_dir {
            Some(dir) => dir.to_path_buf(),
            None => default_state_dir()?,
        };
        Self::for_state_dir(&dir)
    }

    pub fn for_state_dir(state_dir: &Path) -> Result<Self, ConfigError> {
        let state_dir = std::path::absolute(state_dir)
            .map_err(|e| ConfigError::Resolve(state_dir.to_path_buf(), e))?;
        let hash = state_hash(&state_dir);
        Ok(Self {
            socket_path: socket_dir().join(format!("{hash}.sock")),
            lock_path: state_dir.join("daemon.pid"),
            version_path: state_dir.join("daemon.version"),
            log_path: state_dir.join("daemon.log"),
            journal_path: state_dir.join("journal.jsonl"),
            settings_path: state_dir.join("config.toml"),
            state_dir,
        })
    }

    /// Read `config.toml`; a missing file yields the defaults
    pub fn load_settings(&self) -> Result<Settings, ConfigError> {
        match std::fs::read_to_string(&self.settings_path) {
            Ok(text) => Settings::parse(&text)
                .map_err(|e| ConfigError::Parse(self.settings_path.clone(), e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
            Err(e) => Err(ConfigError::Read(self.settings_path.clone(), e)),
        }
    }
}

/// Tunables read from `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub controller: ControllerConfig,
    pub intervals: Intervals,
    pub janitor: JanitorConfig,
}

impl Settings {
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

fn default_state_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("KORD_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("kord"));
    }
    let home = std::env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/kord"))
}

/// Socket directory, kept short for SUN_LEN limits.
/// Overridden with KORD_SOCKET_DIR for testing.
fn socket_dir() -> PathBuf {
    std::env::var("KORD_SOCKET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp/kord"))
}

/// First 16 hex chars of the sha256 of the state directory
fn state_hash(path: &Path) -> String {
    let digest = Sha256::digest(path.to_string_lossy().as_bytes());
    digest[..8].iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
