// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Barrier commands

use super::{report, Kord, WaitArgs};
use crate::output::OutputFormat;
use clap::Subcommand;
use kord_core::coordination::BarrierSpec;
use std::time::Duration;

#[derive(Subcommand, Debug)]
pub enum BarrierCommand {
    /// Create a barrier
    Create {
        name: String,
        /// Participants expected to arrive
        #[arg(long)]
        expected: u32,
        /// Open once this many have arrived instead of all
        #[arg(long)]
        quorum: Option<u32>,
        /// Fail if not open this long after creation
        #[arg(long, value_parser = humantime::parse_duration)]
        timeout: Option<Duration>,
    },
    /// Record a participant's arrival
    Arrive {
        name: String,
        #[arg(long)]
        holder: String,
        /// Also wait for the barrier to open
        #[arg(long)]
        wait: bool,
        #[command(flatten)]
        bound: WaitArgs,
    },
    /// Wait for the barrier to open
    Wait {
        name: String,
        #[command(flatten)]
        bound: WaitArgs,
    },
}

pub async fn handle(
    command: BarrierCommand,
    kord: &Kord,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        BarrierCommand::Create {
            name,
            expected,
            quorum,
            timeout,
        } => {
            let spec = BarrierSpec {
                expected,
                quorum,
                timeout,
            };
            let barrier = kord.barrier(&name).create(spec).await?;
            report(format!("Created barrier {}", name), barrier, format);
        }
        BarrierCommand::Arrive {
            name,
            holder,
            wait,
            bound,
        } => {
            let handle = kord.barrier(&name);
            let arrival = handle.arrive(&holder).await?;
            if wait {
                let barrier = handle.wait(bound.timeout).await?;
                report(format!("Barrier {} open", name), barrier, format);
            } else {
                report(format!("{} arrived at {}", holder, name), arrival, format);
            }
        }
        BarrierCommand::Wait { name, bound } => {
            let barrier = kord.barrier(&name).wait(bound.timeout).await?;
            report(
                format!("Barrier {} open ({} arrived)", name, barrier.status.arrived),
                barrier,
                format,
            );
        }
    }
    Ok(())
}
