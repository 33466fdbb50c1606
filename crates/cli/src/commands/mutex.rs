// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mutex commands

use super::{report, Kord, WaitArgs};
use crate::output::OutputFormat;
use clap::Subcommand;
use std::time::Duration;

#[derive(Subcommand, Debug)]
pub enum MutexCommand {
    /// Create a mutex
    Create {
        name: String,
        /// Default hold duration before the lock is cleared
        #[arg(long, value_parser = humantime::parse_duration)]
        ttl: Option<Duration>,
    },
    /// Take the lock for a holder
    Lock {
        name: String,
        #[arg(long)]
        holder: String,
        /// Hold duration; defaults to the mutex ttl
        #[arg(long, value_parser = humantime::parse_duration)]
        ttl: Option<Duration>,
        /// Block until the lock is free instead of failing
        #[arg(long)]
        wait: bool,
        #[command(flatten)]
        bound: WaitArgs,
    },
    /// Release the lock
    Unlock {
        name: String,
        #[arg(long)]
        holder: String,
    },
}

pub async fn handle(command: MutexCommand, kord: &Kord, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        MutexCommand::Create { name, ttl } => {
            let mutex = kord.mutex(&name).create(ttl).await?;
            report(format!("Created mutex {}", name), mutex, format);
        }
        MutexCommand::Lock {
            name,
            holder,
            ttl,
            wait,
            bound,
        } => {
            let handle = kord.mutex(&name);
            let mutex = if wait {
                handle.lock(&holder, ttl, bound.timeout).await?
            } else {
                handle.try_lock(&holder, ttl).await?
            };
            report(format!("Locked {} for {}", name, holder), mutex, format);
        }
        MutexCommand::Unlock { name, holder } => {
            let mutex = kord.mutex(&name).unlock(&holder).await?;
            report(format!("Unlocked {}", name), mutex, format);
        }
    }
    Ok(())
}
