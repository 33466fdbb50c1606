// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read/write mutex commands

use super::{report, Kord, WaitArgs};
use crate::output::OutputFormat;
use clap::Subcommand;
use std::time::Duration;

#[derive(Subcommand, Debug)]
pub enum RwMutexCommand {
    /// Create a read/write mutex
    Create {
        name: String,
        #[arg(long, value_parser = humantime::parse_duration)]
        ttl: Option<Duration>,
    },
    /// Take the exclusive write lock
    Lock(HoldArgs),
    /// Take a shared read lock
    Rlock(HoldArgs),
    /// Release the write lock
    Unlock {
        name: String,
        #[arg(long)]
        holder: String,
    },
    /// Release a read lock
    Runlock {
        name: String,
        #[arg(long)]
        holder: String,
    },
}

#[derive(clap::Args, Debug)]
pub struct HoldArgs {
    name: String,
    #[arg(long)]
    holder: String,
    #[arg(long, value_parser = humantime::parse_duration)]
    ttl: Option<Duration>,
    /// Block until the lock can be taken
    #[arg(long)]
    wait: bool,
    #[command(flatten)]
    bound: WaitArgs,
}

pub async fn handle(
    command: RwMutexCommand,
    kord: &Kord,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        RwMutexCommand::Create { name, ttl } => {
            let rw = kord.rwmutex(&name).create(ttl).await?;
            report(format!("Created rwmutex {}", name), rw, format);
        }
        RwMutexCommand::Lock(args) => {
            let handle = kord.rwmutex(&args.name);
            let rw = if args.wait {
                handle.lock(&args.holder, args.ttl, args.bound.timeout).await?
            } else {
                handle.try_lock(&args.holder, args.ttl).await?
            };
            report(
                format!("Write-locked {} for {}", args.name, args.holder),
                rw,
                format,
            );
        }
        RwMutexCommand::Rlock(args) => {
            let handle = kord.rwmutex(&args.name);
            let rw = if args.wait {
                handle.rlock(&args.holder, args.ttl, args.bound.timeout).await?
            } else {
                handle.try_rlock(&args.holder, args.ttl).await?
            };
            report(
                format!("Read-locked {} for {}", args.name, args.holder),
                rw,
                format,
            );
        }
        RwMutexCommand::Unlock { name, holder } => {
            let rw = kord.rwmutex(&name).unlock(&holder).await?;
            report(format!("Write-unlocked {}", name), rw, format);
        }
        RwMutexCommand::Runlock { name, holder } => {
            let rw = kord.rwmutex(&name).runlock(&holder).await?;
            report(format!("Read-unlocked {} for {}", name, holder), rw, format);
        }
    }
    Ok(())
}
