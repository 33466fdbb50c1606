// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kord-daemon: configuration and wire protocol shared with the CLI

pub mod config;
pub mod protocol;

pub use config::{Config, ConfigError, Settings};
pub use protocol::{ProtocolError, Request, Response, PROTOCOL_VERSION};

/// Startup marker prefix the daemon writes to its log before anything else.
/// The CLI uses it to find where the current startup attempt begins.
/// Full format: "--- kordd: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- kordd: starting (pid: ";
