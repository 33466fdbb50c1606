// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands
//!
//! [`DaemonClient`] speaks the socket protocol and implements [`Store`] so
//! the SDK in `kord-client` runs unchanged on top of it.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use kord_core::{Kind, LabelSelector, Object, ObjectKey};
use kord_daemon::protocol::{self, ProtocolError};
use kord_daemon::{Config, Request, Response, PROTOCOL_VERSION, STARTUP_MARKER_PREFIX};
use kord_storage::{Store, StoreError, WatchEvent};
use thiserror::Error;
use tokio::net::UnixStream;
use tokio::sync::broadcast;

// Timeout configuration (env vars in milliseconds)
fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for a single request/response exchange
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("KORD_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for daemon to start
pub fn timeout_connect() -> Duration {
    parse_duration_ms("KORD_TIMEOUT_CONNECT_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for process to exit
pub fn timeout_exit() -> Duration {
    parse_duration_ms("KORD_TIMEOUT_EXIT_MS").unwrap_or(Duration::from_secs(2))
}

/// Polling interval for retries
pub fn poll_interval() -> Duration {
    parse_duration_ms("KORD_POLL_INTERVAL_MS").unwrap_or(Duration::from_millis(50))
}

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("Daemon not running")]
    DaemonNotRunning,

    #[error("Failed to start daemon: {0}")]
    DaemonStartFailed(String),

    #[error("Connection timeout waiting for daemon to start")]
    DaemonStartTimeout,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Unexpected response from daemon")]
    UnexpectedResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DaemonError> for StoreError {
    fn from(error: DaemonError) -> Self {
        match error {
            DaemonError::Store(e) => e,
            other => StoreError::Internal(other.to_string()),
        }
    }
}

/// Daemon health as reported by the Status request
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DaemonStatus {
    pub uptime_secs: u64,
    pub version: String,
    pub objects: BTreeMap<String, usize>,
}

/// Daemon client
#[derive(Debug, Clone)]
pub struct DaemonClient {
    config: Config,
}

impl DaemonClient {
    /// Connect to daemon, auto-starting if not running
    pub async fn connect_or_start(config: Config) -> Result<Self, DaemonError> {
        // Restart a daemon left behind by a different build
        if let Ok(daemon_version) = std::fs::read_to_string(&config.version_path) {
            if daemon_version.trim() != PROTOCOL_VERSION {
                tracing::warn!(
                    daemon = daemon_version.trim(),
                    cli = PROTOCOL_VERSION,
                    "daemon version mismatch, restarting"
                );
                let _ = daemon_stop(&config).await;
            }
        }

        match Self::connect(config.clone()) {
            Ok(client) => Ok(client),
            Err(DaemonError::DaemonNotRunning) => {
                let child = start_daemon_background(&config)?;
                Self::connect_with_retry(config, timeout_connect(), child).await
            }
            Err(e) => Err(wrap_with_startup_error(e, &config)),
        }
    }

    /// Connect to existing daemon (no auto-start)
    pub fn connect(config: Config) -> Result<Self, DaemonError> {
        if !config.socket_path.exists() {
            return Err(DaemonError::DaemonNotRunning);
        }
        Ok(Self { config })
    }

    async fn connect_with_retry(
        config: Config,
        timeout: Duration,
        mut child: std::process::Child,
    ) -> Result<Self, DaemonError> {
        let start = Instant::now();
        while start.elapsed() < timeout {
            // An early exit means startup failed
            if let Ok(Some(status)) = child.try_wait() {
                // Poll for the startup error, the log may lag the exit
                let poll_start = Instant::now();
                while poll_start.elapsed() < timeout_exit() {
                    if let Some(err) = read_startup_error(&config) {
                        return Err(DaemonError::DaemonStartFailed(err));
                    }
                    tokio::time::sleep(poll_interval()).await;
                }
                return Err(DaemonError::DaemonStartFailed(format!(
                    "exited with {}",
                    status
                )));
            }

            match Self::connect(config.clone()) {
                Ok(client) => {
                    // The socket file appears before accept is running
                    if client.ping().await.is_ok() {
                        return Ok(client);
                    }
                    tokio::time::sleep(poll_interval()).await;
                }
                Err(DaemonError::DaemonNotRunning) => {
                    tokio::time::sleep(poll_interval()).await;
                }
                Err(e) => return Err(wrap_with_startup_error(e, &config)),
            }
        }

        Err(wrap_with_startup_error(
            DaemonError::DaemonStartTimeout,
            &config,
        ))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Send a request and receive a response with specific timeouts
    async fn send_with_timeout(
        &self,
        request: &Request,
        read_timeout: Duration,
        write_timeout: Duration,
    ) -> Result<Response, DaemonError> {
        let stream = UnixStream::connect(&self.config.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();

        protocol::send(&mut writer, request, write_timeout).await?;
        let response: Response = protocol::receive(&mut reader, read_timeout).await?;
        Ok(response)
    }

    /// Send a request and receive a response
    pub async fn send(&self, request: &Request) -> Result<Response, DaemonError> {
        self.send_with_timeout(request, timeout_ipc(), timeout_ipc())
            .await
    }

    pub async fn ping(&self) -> Result<(), DaemonError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Get daemon version via Hello handshake
    pub async fn hello(&self) -> Result<String, DaemonError> {
        let request = Request::Hello {
            version: PROTOCOL_VERSION.to_string(),
        };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            other => Err(unexpected(other)),
        }
    }

    pub async fn status(&self) -> Result<DaemonStatus, DaemonError> {
        match self.send(&Request::Status).await? {
            Response::Status {
                uptime_secs,
                version,
                objects,
            } => Ok(DaemonStatus {
                uptime_secs,
                version,
                objects,
            }),
            other => Err(unexpected(other)),
        }
    }

    /// Request daemon shutdown
    pub async fn shutdown(&self) -> Result<(), DaemonError> {
        match self.send(&Request::Shutdown).await? {
            Response::Ok | Response::ShuttingDown => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    async fn object(&self, request: Request) -> Result<Object, DaemonError> {
        match self.send(&request).await? {
            Response::Object { object } => Ok(object),
            other => Err(unexpected(other)),
        }
    }
}

/// Map an unwanted response to an error, keeping store errors typed
fn unexpected(response: Response) -> DaemonError {
    match response {
        Response::Error { code, message } => StoreError::from_code(code, message).into(),
        _ => DaemonError::UnexpectedResponse,
    }
}

#[async_trait]
impl Store for DaemonClient {
    async fn get(&self, key: &ObjectKey) -> Result<Object, StoreError> {
        Ok(self.object(Request::Get { key: key.clone() }).await?)
    }

    async fn list(
        &self,
        kind: Kind,
        namespace: Option<&str>,
        selector: &LabelSelector,
    ) -> Result<Vec<Object>, StoreError> {
        let request = Request::List {
            kind,
            namespace: namespace.map(str::to_string),
            selector: selector.clone(),
        };
        match self.send(&request).await? {
            Response::Objects { objects } => Ok(objects),
            other => Err(unexpected(other).into()),
        }
    }

    async fn create(&self, object: Object) -> Result<Object, StoreError> {
        Ok(self.object(Request::Create { object }).await?)
    }

    async fn update_status(&self, object: Object) -> Result<Object, StoreError> {
        Ok(self.object(Request::UpdateStatus { object }).await?)
    }

    async fn delete(&self, key: &ObjectKey) -> Result<(), StoreError> {
        match self.send(&Request::Delete { key: key.clone() }).await? {
            Response::Ok => Ok(()),
            other => Err(unexpected(other).into()),
        }
    }

    fn watch(&self) -> Result<broadcast::Receiver<WatchEvent>, StoreError> {
        Err(StoreError::Unsupported(
            "watch is not available over the daemon socket".to_string(),
        ))
    }
}

/// Start the daemon in the background, returning the child process handle
fn start_daemon_background(config: &Config) -> Result<std::process::Child, DaemonError> {
    let kordd_path = find_kordd_binary();
    tracing::debug!(binary = %kordd_path.display(), "starting daemon");

    Command::new(&kordd_path)
        .arg(&config.state_dir)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|e| DaemonError::DaemonStartFailed(format!("{}: {}", kordd_path.display(), e)))
}

/// Stop the daemon (graceful first, then forceful)
/// Returns true if daemon was stopped, false if it wasn't running
pub async fn daemon_stop(config: &Config) -> Result<bool, DaemonError> {
    let client = match DaemonClient::connect(config.clone()) {
        Ok(c) => c,
        Err(DaemonError::DaemonNotRunning) => {
            cleanup_stale_pid(config);
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    let shutdown_result = client.shutdown().await;

    if let Some(pid) = read_daemon_pid(config) {
        if shutdown_result.is_ok() {
            wait_for_exit(pid, timeout_exit()).await;
        }

        // Force kill if still running
        if process_exists(pid) {
            force_kill_daemon(pid);
            wait_for_exit(pid, timeout_exit()).await;
        }
    }

    cleanup_stale_pid(config);
    // A killed daemon leaves its socket behind
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }

    Ok(true)
}

/// Wait for a process to exit
async fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if !process_exists(pid) {
            return true;
        }
        tokio::time::sleep(poll_interval()).await;
    }
    false
}

/// Find the kordd binary
fn find_kordd_binary() -> PathBuf {
    // Explicit override (used by tests to ensure correct binary)
    if let Ok(path) = std::env::var("KORD_DAEMON_BINARY") {
        return PathBuf::from(path);
    }

    // Installed side by side with kord
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("kordd");
            if sibling.exists() {
                return sibling;
            }
        }
    }

    // Fall back to PATH lookup
    PathBuf::from("kordd")
}

/// Clean up orphaned PID file during shutdown.
fn cleanup_stale_pid(config: &Config) {
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

/// Get the PID from the daemon PID file, if it exists
pub fn read_daemon_pid(config: &Config) -> Option<u32> {
    std::fs::read_to_string(&config.lock_path)
        .ok()
        .and_then(|content| content.trim().parse::<u32>().ok())
}

/// Check if a process with the given PID exists
pub fn process_exists(pid: u32) -> bool {
    // Use kill -0 to check if process exists without sending a signal
    Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Force kill a daemon process
pub fn force_kill_daemon(pid: u32) -> bool {
    Command::new("kill")
        .args(["-9", &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Read daemon log from the last startup marker, looking for errors.
pub fn read_startup_error(config: &Config) -> Option<String> {
    let content = std::fs::read_to_string(&config.log_path).ok()?;
    startup_error_in(&content)
}

const FAILED_TO_START: &str = "Failed to start daemon: ";

/// Error lines logged since the last startup marker in `log`
fn startup_error_in(log: &str) -> Option<String> {
    let start_pos = log.rfind(STARTUP_MARKER_PREFIX)?;
    let startup_log = &log[start_pos..];

    let errors: Vec<&str> = startup_log
        .lines()
        .filter(|line| line.contains(" ERROR ") || line.contains(FAILED_TO_START))
        .collect();

    if errors.is_empty() {
        return None;
    }

    // Format: "timestamp LEVEL target: message"
    let mut messages: Vec<String> = Vec::new();
    for line in &errors {
        let message = match line.split_once(FAILED_TO_START) {
            Some((_, msg)) => msg,
            None => line.split_once(": ").map_or(*line, |(_, msg)| msg),
        };
        if !messages.iter().any(|m| m == message) {
            messages.push(message.to_string());
        }
    }
    Some(messages.join("\n"))
}

/// Wrap an error with startup log info if available.
fn wrap_with_startup_error(err: DaemonError, config: &Config) -> DaemonError {
    // Don't double-wrap
    if matches!(err, DaemonError::DaemonStartFailed(_)) {
        return err;
    }

    if let Some(startup_error) = read_startup_error(config) {
        DaemonError::DaemonStartFailed(startup_error)
    } else {
        err
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
