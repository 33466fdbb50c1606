// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon management commands

use crate::client::{daemon_stop, DaemonClient, DaemonError, DaemonStatus};
use crate::output::{format_uptime, OutputFormat};
use anyhow::Result;
use clap::Subcommand;
use kord_daemon::Config;
use std::fmt;

#[derive(Subcommand, Debug)]
pub enum DaemonCommand {
    /// Start the daemon in the background
    Start,
    /// Stop the daemon
    Stop,
    /// Show whether the daemon is running
    Status,
    /// Print the tail of the daemon log
    Logs {
        /// Number of lines to show
        #[arg(long, default_value = "50")]
        lines: usize,
    },
}

impl fmt::Display for DaemonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: running")?;
        writeln!(f, "Version: {}", self.version)?;
        writeln!(f, "Uptime: {}", format_uptime(self.uptime_secs))?;
        write!(f, "Objects: {}", self.objects.values().sum::<usize>())?;
        for (kind, count) in &self.objects {
            write!(f, "\n  {:<14} {}", kind, count)?;
        }
        Ok(())
    }
}

pub async fn handle(command: DaemonCommand, config: Config, format: OutputFormat) -> Result<()> {
    match command {
        DaemonCommand::Start => {
            let already = DaemonClient::connect(config.clone()).is_ok();
            let client = DaemonClient::connect_or_start(config).await?;
            let version = client.hello().await?;
            if already {
                println!("Daemon already running ({})", version);
            } else {
                println!("Daemon started ({})", version);
            }
        }
        DaemonCommand::Stop => {
            if daemon_stop(&config).await? {
                println!("Daemon stopped");
            } else {
                println!("Daemon not running");
            }
        }
        DaemonCommand::Status => match DaemonClient::connect(config) {
            Ok(client) => match client.status().await {
                Ok(status) => crate::output::print(&status, format),
                // A socket nobody answers on is left over from a crash
                Err(DaemonError::Io(_)) => println!("Daemon not running"),
                Err(e) => return Err(e.into()),
            },
            Err(DaemonError::DaemonNotRunning) => println!("Daemon not running"),
            Err(e) => return Err(e.into()),
        },
        DaemonCommand::Logs { lines } => {
            let content = match std::fs::read_to_string(&config.log_path) {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    println!("No daemon log at {}", config.log_path.display());
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };
            for line in tail(&content, lines) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

/// The last `n` lines of `content`
fn tail(content: &str, n: usize) -> Vec<&str> {
    let lines: Vec<&str> = content.lines().collect();
    lines[lines.len().saturating_sub(n)..].to_vec()
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
