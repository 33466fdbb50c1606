// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! kord daemon (kordd)
//!
//! Owns the object store and runs the controller that reconciles it.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod lifecycle;
mod server;

use std::path::PathBuf;
use std::sync::Arc;

use kord_core::SystemClock;
use kord_daemon::{Config, STARTUP_MARKER_PREFIX};
use kord_engine::{Controller, Janitor, Registry};
use kord_storage::Store;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tracing::{error, info};

use crate::lifecycle::LifecycleError;
use crate::server::ServerContext;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional state directory argument
    let state_dir = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::resolve(state_dir.as_deref())?;

    // Write startup marker to log (before tracing setup, so CLI can find it)
    write_startup_marker(&config)?;
    let log_guard = setup_logging(&config)?;

    info!("Starting kordd in {}", config.state_dir.display());

    let mut daemon = match lifecycle::startup(&config).await {
        Ok(d) => d,
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(&config, &e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let store: Arc<dyn Store> = daemon.store.clone();
    let settings = daemon.settings.clone();

    let controller = Controller::new(
        Arc::clone(&store),
        Arc::new(Registry::standard()),
        SystemClock,
        settings.intervals,
        settings.controller,
    );
    let controller = tokio::spawn(controller.run(shutdown_tx.subscribe()));
    let janitor = Janitor::new(Arc::clone(&store), SystemClock, settings.janitor);
    let janitor = tokio::spawn(janitor.run(shutdown_tx.subscribe()));

    let ctx = Arc::new(ServerContext {
        store: daemon.store.clone(),
        start_time: daemon.start_time,
        shutdown: shutdown_tx.clone(),
    });

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!("Daemon ready, listening on {}", config.socket_path.display());

    // Signal ready for parent process (e.g., systemd, CLI waiting for startup)
    println!("READY");

    loop {
        tokio::select! {
            result = daemon.listener.accept() => {
                match result {
                    Ok((stream, _)) => {
                        let ctx = Arc::clone(&ctx);
                        tokio::spawn(async move {
                            if let Err(e) = server::handle_connection(ctx, stream).await {
                                error!("Error handling connection: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                    }
                }
            }

            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }

            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                break;
            }

            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    info!("Shutdown requested via IPC, shutting down...");
                    break;
                }
            }
        }
    }

    let _ = shutdown_tx.send(true);
    match controller.await {
        Ok(Err(e)) => error!("Controller stopped with error: {}", e),
        Err(e) => error!("Controller task failed: {}", e),
        Ok(Ok(())) => {}
    }
    if let Err(e) = janitor.await {
        error!("Janitor task failed: {}", e);
    }
    daemon.shutdown();

    info!("Daemon stopped");
    Ok(())
}

/// Write startup marker to log file (appends to existing log)
fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    use std::io::Write;

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write startup error synchronously to log file.
/// This ensures the error is visible to the CLI even if the process exits quickly.
fn write_startup_error(config: &Config, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let (Some(dir), Some(file)) = (config.log_path.parent(), config.log_path.file_name()) else {
        return Err(LifecycleError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("bad log path {}", config.log_path.display()),
        )));
    };
    std::fs::create_dir_all(dir)?;

    let file_appender = tracing_appender::rolling::never(dir, file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}
