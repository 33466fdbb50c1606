// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Semaphore commands

use super::{report, Kord, WaitArgs};
use crate::output::OutputFormat;
use clap::Subcommand;
use std::time::Duration;

#[derive(Subcommand, Debug)]
pub enum SemaphoreCommand {
    /// Create a counting semaphore
    Create {
        name: String,
        /// Number of concurrent holders
        #[arg(long)]
        permits: u32,
        /// Default permit lifetime
        #[arg(long, value_parser = humantime::parse_duration)]
        ttl: Option<Duration>,
    },
    /// Take a permit
    Acquire {
        name: String,
        #[arg(long)]
        holder: String,
        #[arg(long, value_parser = humantime::parse_duration)]
        ttl: Option<Duration>,
        /// Block until a permit frees up
        #[arg(long)]
        wait: bool,
        #[command(flatten)]
        bound: WaitArgs,
    },
    /// Return a permit
    Release {
        name: String,
        #[arg(long)]
        holder: String,
    },
}

pub async fn handle(
    command: SemaphoreCommand,
    kord: &Kord,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        SemaphoreCommand::Create { name, permits, ttl } => {
            let semaphore = kord.semaphore(&name).create(permits, ttl).await?;
            report(
                format!("Created semaphore {} with {} permits", name, permits),
                semaphore,
                format,
            );
        }
        SemaphoreCommand::Acquire {
            name,
            holder,
            ttl,
            wait,
            bound,
        } => {
            let handle = kord.semaphore(&name);
            let permit = if wait {
                handle.acquire(&holder, ttl, bound.timeout).await?
            } else {
                handle.try_acquire(&holder, ttl).await?
            };
            report(
                format!("Acquired permit {} for {}", permit.metadata.name, holder),
                permit,
                format,
            );
        }
        SemaphoreCommand::Release { name, holder } => {
            kord.semaphore(&name).release(&holder).await?;
            match format {
                OutputFormat::Table => println!("Released permit of {} for {}", name, holder),
                OutputFormat::Json => crate::output::print(
                    &serde_json::json!({ "semaphore": name, "holder": holder, "released": true }),
                    format,
                ),
            }
        }
    }
    Ok(())
}
