// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! kord - distributed synchronization primitives from the command line

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;
mod completions;
mod error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{
    barrier, daemon, gate, job, lease, mutex, once, resources, rwmutex, semaphore, waitgroup,
    Kord,
};
use kord_daemon::Config;

use crate::client::DaemonClient;
use crate::error::KordError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "kord",
    version,
    about = "kord - distributed locks, semaphores, barriers and leases"
)]
struct Cli {
    /// Namespace the command operates in
    #[arg(long, short = 'n', global = true, env = "KORD_NAMESPACE", default_value = "default")]
    namespace: String,

    /// Daemon state directory
    #[arg(long, global = true, env = "KORD_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "table")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Daemon management
    #[command(subcommand)]
    Daemon(daemon::DaemonCommand),
    /// Exclusive locks
    #[command(subcommand)]
    Mutex(mutex::MutexCommand),
    /// Reader/writer locks
    #[command(subcommand)]
    Rwmutex(rwmutex::RwMutexCommand),
    /// Counting semaphores
    #[command(subcommand)]
    Semaphore(semaphore::SemaphoreCommand),
    /// Rendezvous barriers
    #[command(subcommand)]
    Barrier(barrier::BarrierCommand),
    /// Prioritised, renewable leases
    #[command(subcommand)]
    Lease(lease::LeaseCommand),
    /// Gates over other resources
    #[command(subcommand)]
    Gate(gate::GateCommand),
    /// Run-once latches
    #[command(subcommand)]
    Once(once::OnceCommand),
    /// Counting wait groups
    #[command(subcommand)]
    Waitgroup(waitgroup::WaitGroupCommand),
    /// Job completion records
    #[command(subcommand)]
    Job(job::JobCommand),
    /// Show one resource
    Get(resources::GetArgs),
    /// List resources of a kind
    List(resources::ListArgs),
    /// Delete a resource
    Delete(resources::DeleteArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprint!("{}", KordError::from_anyhow(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format = cli.output;
    let config = Config::resolve(cli.state_dir.as_deref())?;

    // Commands that don't need a daemon connection
    let command = match cli.command {
        Commands::Completions(args) => {
            completions::write_completions::<Cli>(args.shell, &mut std::io::stdout());
            return Ok(());
        }
        Commands::Daemon(command) => return daemon::handle(command, config, format).await,
        other => other,
    };

    let daemon = DaemonClient::connect_or_start(config).await?;
    let kord = Kord::new(Arc::new(daemon), cli.namespace);

    match command {
        Commands::Mutex(c) => mutex::handle(c, &kord, format).await,
        Commands::Rwmutex(c) => rwmutex::handle(c, &kord, format).await,
        Commands::Semaphore(c) => semaphore::handle(c, &kord, format).await,
        Commands::Barrier(c) => barrier::handle(c, &kord, format).await,
        Commands::Lease(c) => lease::handle(c, &kord, format).await,
        Commands::Gate(c) => gate::handle(c, &kord, format).await,
        Commands::Once(c) => once::handle(c, &kord, format).await,
        Commands::Waitgroup(c) => waitgroup::handle(c, &kord, format).await,
        Commands::Job(c) => job::handle(c, &kord, format).await,
        Commands::Get(args) => resources::get(args, &kord, format).await,
        Commands::List(args) => resources::list(args, &kord, format).await,
        Commands::Delete(args) => resources::delete(args, &kord, format).await,
        Commands::Daemon(_) | Commands::Completions(_) => Ok(()),
    }
}

/// Warnings and errors to stderr; RUST_LOG overrides
fn setup_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
