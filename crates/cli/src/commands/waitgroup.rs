// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WaitGroup commands

use super::{report, Kord, WaitArgs};
use crate::output::OutputFormat;
use clap::Subcommand;
use std::time::Duration;

#[derive(Subcommand, Debug)]
pub enum WaitGroupCommand {
    /// Create a wait group
    Create {
        name: String,
        /// Delete the group this long after creation
        #[arg(long, value_parser = humantime::parse_duration)]
        ttl: Option<Duration>,
    },
    /// Adjust the counter by a (possibly negative) delta
    Add {
        name: String,
        #[arg(allow_hyphen_values = true)]
        delta: i32,
    },
    /// Decrement the counter by one
    Done { name: String },
    /// Wait for the counter to reach zero
    Wait {
        name: String,
        #[command(flatten)]
        bound: WaitArgs,
    },
}

pub async fn handle(
    command: WaitGroupCommand,
    kord: &Kord,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        WaitGroupCommand::Create { name, ttl } => {
            let wg = kord.waitgroup(&name).create(ttl).await?;
            report(format!("Created waitgroup {}", name), wg, format);
        }
        WaitGroupCommand::Add { name, delta } => {
            let wg = kord.waitgroup(&name).add(delta).await?;
            report(format!("{} counter: {}", name, wg.status.counter), wg, format);
        }
        WaitGroupCommand::Done { name } => {
            let wg = kord.waitgroup(&name).done().await?;
            report(format!("{} counter: {}", name, wg.status.counter), wg, format);
        }
        WaitGroupCommand::Wait { name, bound } => {
            let wg = kord.waitgroup(&name).wait(bound.timeout).await?;
            report(format!("Waitgroup {} done", name), wg, format);
        }
    }
    Ok(())
}
