// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod barrier;
pub mod daemon;
pub mod gate;
pub mod job;
pub mod lease;
pub mod mutex;
pub mod once;
pub mod resources;
pub mod rwmutex;
pub mod semaphore;
pub mod waitgroup;

use crate::output::OutputFormat;
use kord_core::Object;
use std::fmt;
use std::time::Duration;

/// SDK client bound to the daemon socket
pub type Kord = kord_client::Client;

/// Bound on a blocking command
#[derive(clap::Args, Debug, Clone)]
pub struct WaitArgs {
    /// Give up after this long (e.g. 500ms, 30s, 2m)
    #[arg(long, default_value = "30s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,
}

/// Print `message` in table mode, or the resulting object as JSON
pub fn report(message: impl fmt::Display, object: impl Into<Object>, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", message),
        OutputFormat::Json => crate::output::print_object(&object.into(), format),
    }
}
