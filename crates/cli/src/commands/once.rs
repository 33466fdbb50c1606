// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Once commands

use super::{report, Kord};
use crate::output::OutputFormat;
use clap::Subcommand;
use kord_client::ClientError;
use kord_core::coordination::{OnceSpec, Refusal};
use std::time::Duration;

#[derive(Subcommand, Debug)]
pub enum OnceCommand {
    /// Create a once latch
    Create {
        name: String,
        /// Delete the latch this long after creation
        #[arg(long, value_parser = humantime::parse_duration)]
        ttl: Option<Duration>,
    },
    /// Claim the single execution; fails if another executor already has it
    Mark {
        name: String,
        #[arg(long)]
        executor: String,
    },
}

pub async fn handle(command: OnceCommand, kord: &Kord, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        OnceCommand::Create { name, ttl } => {
            let once = kord.once(&name).create(ttl).await?;
            report(format!("Created once {}", name), once, format);
        }
        OnceCommand::Mark { name, executor } => {
            let claimed = kord.once(&name).mark_executed(&executor).await?;
            let once = kord.get::<OnceSpec>(&name).await?;
            if !claimed {
                return Err(ClientError::Refused {
                    key: once.key(),
                    refusal: Refusal::AlreadyExecuted {
                        executor: once.status.executor.unwrap_or_default(),
                    },
                }
                .into());
            }
            report(format!("{} executed by {}", name, executor), once, format);
        }
    }
    Ok(())
}
