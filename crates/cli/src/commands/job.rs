// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job commands, the completion records gates can wait on

use super::{report, Kord};
use crate::output::OutputFormat;
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum JobCommand {
    /// Create a job record
    Create { name: String },
    /// Record a finished run
    Complete {
        name: String,
        /// Record a failure instead of a success
        #[arg(long)]
        failed: bool,
    },
}

pub async fn handle(command: JobCommand, kord: &Kord, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        JobCommand::Create { name } => {
            let job = kord.job(&name).create().await?;
            report(format!("Created job {}", name), job, format);
        }
        JobCommand::Complete { name, failed } => {
            let job = kord.job(&name).complete(!failed).await?;
            let outcome = job.status.outcome().unwrap_or("Pending");
            report(format!("Job {} {}", name, outcome), job, format);
        }
    }
    Ok(())
}
