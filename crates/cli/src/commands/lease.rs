// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lease commands

use super::{report, Kord, WaitArgs};
use crate::output::OutputFormat;
use clap::{Subcommand, ValueEnum};
use kord_core::coordination::TieBreak;
use std::time::Duration;

#[derive(Subcommand, Debug)]
pub enum LeaseCommand {
    /// Create a lease
    Create {
        name: String,
        /// How long a grant lasts without renewal
        #[arg(long, value_parser = humantime::parse_duration)]
        ttl: Duration,
        /// Ordering among requests of equal priority
        #[arg(long, value_enum)]
        tie_break: Option<TieBreakArg>,
    },
    /// Request the lease and wait for the grant
    Acquire {
        name: String,
        #[arg(long)]
        holder: String,
        /// Higher priority requests are granted first
        #[arg(long, allow_hyphen_values = true)]
        priority: Option<i32>,
        /// Hold duration; defaults to the lease ttl
        #[arg(long, value_parser = humantime::parse_duration)]
        ttl: Option<Duration>,
        #[command(flatten)]
        bound: WaitArgs,
    },
    /// Extend the current hold
    Renew {
        name: String,
        #[arg(long)]
        holder: String,
        #[arg(long, value_parser = humantime::parse_duration)]
        ttl: Option<Duration>,
    },
    /// Give the lease up
    Release {
        name: String,
        #[arg(long)]
        holder: String,
    },
    /// Wait until nobody holds the lease
    Wait {
        name: String,
        #[command(flatten)]
        bound: WaitArgs,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TieBreakArg {
    FirstSeen,
    Oldest,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::FirstSeen => TieBreak::FirstSeen,
            TieBreakArg::Oldest => TieBreak::Oldest,
        }
    }
}

pub async fn handle(command: LeaseCommand, kord: &Kord, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        LeaseCommand::Create {
            name,
            ttl,
            tie_break,
        } => {
            let lease = kord
                .lease(&name)
                .create(ttl, tie_break.map(TieBreak::from))
                .await?;
            report(format!("Created lease {}", name), lease, format);
        }
        LeaseCommand::Acquire {
            name,
            holder,
            priority,
            ttl,
            bound,
        } => {
            let lease = kord
                .lease(&name)
                .acquire(&holder, priority, ttl, bound.timeout)
                .await?;
            let until = lease
                .status
                .expires_at
                .map_or_else(String::new, |at| format!(" until {}", at.to_rfc3339()));
            report(format!("Lease {} held by {}{}", name, holder, until), lease, format);
        }
        LeaseCommand::Renew { name, holder, ttl } => {
            let lease = kord.lease(&name).renew(&holder, ttl).await?;
            report(
                format!("Renewed {} ({} renewals)", name, lease.status.renew_count),
                lease,
                format,
            );
        }
        LeaseCommand::Release { name, holder } => {
            let lease = kord.lease(&name).release(&holder).await?;
            report(format!("Released {}", name), lease, format);
        }
        LeaseCommand::Wait { name, bound } => {
            let lease = kord.lease(&name).wait_available(bound.timeout).await?;
            report(format!("Lease {} available", name), lease, format);
        }
    }
    Ok(())
}
