// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gate commands
//!
//! Conditions are written `type:name[=value]`:
//! `job:build`, `semaphore:pool=2`, `barrier:stage=Open`, `lease:leader=Held`.
//! A barrier without a state waits for Open, a lease for Available.

use super::{report, Kord, WaitArgs};
use crate::output::OutputFormat;
use clap::Subcommand;
use kord_core::coordination::{BarrierPhase, GateCondition, LeasePhase};
use std::fmt::Display;
use std::time::Duration;

#[derive(Subcommand, Debug)]
pub enum GateCommand {
    /// Create a gate over one or more conditions
    Create {
        name: String,
        /// Condition as type:name[=value], repeatable
        #[arg(long = "condition", short = 'c', value_parser = parse_condition)]
        conditions: Vec<GateCondition>,
        /// Fail if not open this long after creation
        #[arg(long, value_parser = humantime::parse_duration)]
        timeout: Option<Duration>,
    },
    /// Wait for the gate to open
    Wait {
        name: String,
        #[command(flatten)]
        bound: WaitArgs,
    },
}

pub async fn handle(command: GateCommand, kord: &Kord, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        GateCommand::Create {
            name,
            conditions,
            timeout,
        } => {
            let count = conditions.len();
            let gate = kord.gate(&name).create(conditions, timeout).await?;
            report(
                format!("Created gate {} with {} conditions", name, count),
                gate,
                format,
            );
        }
        GateCommand::Wait { name, bound } => {
            let gate = kord.gate(&name).wait(bound.timeout).await?;
            report(format!("Gate {} open", name), gate, format);
        }
    }
    Ok(())
}

/// Parse `type:name[=value]` into a gate condition
pub fn parse_condition(input: &str) -> Result<GateCondition, String> {
    let (type_name, rest) = input
        .split_once(':')
        .ok_or_else(|| format!("expected type:name, got '{}'", input))?;
    let (name, value) = match rest.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (rest, None),
    };
    if name.is_empty() {
        return Err(format!("missing name in '{}'", input));
    }
    let name = name.to_string();

    match type_name.to_ascii_lowercase().as_str() {
        "job" => match value {
            None => Ok(GateCondition::Job { name }),
            Some(_) => Err("job conditions take no value".to_string()),
        },
        "semaphore" => {
            let value = value
                .map(|v| v.parse::<u32>().map_err(|e| format!("bad permit count '{}': {}", v, e)))
                .transpose()?;
            Ok(GateCondition::Semaphore { name, value })
        }
        "barrier" => {
            let state = phase(
                value,
                BarrierPhase::Open,
                &[BarrierPhase::Waiting, BarrierPhase::Open, BarrierPhase::Failed],
            )?;
            Ok(GateCondition::Barrier { name, state })
        }
        "lease" => {
            // Expired is never reported, so a gate waiting on it would stay closed
            let state = phase(value, LeasePhase::Available, &[LeasePhase::Available, LeasePhase::Held])?;
            Ok(GateCondition::Lease { name, state })
        }
        other => Err(format!(
            "unknown condition type '{}' (expected job, semaphore, barrier or lease)",
            other
        )),
    }
}

/// Match an optional `=State` value against the phases a gate can wait on
fn phase<P: Copy + Display>(value: Option<&str>, default: P, phases: &[P]) -> Result<P, String> {
    let names = || {
        phases
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let Some(value) = value else {
        return Ok(default);
    };
    phases
        .iter()
        .copied()
        .find(|p| p.to_string().eq_ignore_ascii_case(value))
        .ok_or_else(|| format!("unknown state '{}', expected one of: {}", value, names()))
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
