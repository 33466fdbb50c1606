// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket server and connection handling.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use kord_daemon::protocol::{self, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION};
use kord_storage::Store;
use tokio::net::UnixStream;
use tokio::sync::watch;
use tracing::{debug, error};

use crate::lifecycle::DaemonStore;

/// What a connection handler needs from the daemon
pub struct ServerContext {
    pub store: Arc<DaemonStore>,
    pub start_time: Instant,
    pub shutdown: watch::Sender<bool>,
}

/// Handle a single client connection
pub async fn handle_connection(ctx: Arc<ServerContext>, stream: UnixStream) -> Result<(), ServerError> {
    let (mut reader, mut writer) = stream.into_split();

    let request = match protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(req) => req,
        Err(protocol::ProtocolError::Timeout) => {
            error!("Request read timeout");
            return Err(ServerError::Timeout);
        }
        Err(protocol::ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected before sending request");
            return Ok(());
        }
        Err(e) => {
            error!("Failed to read request: {}", e);
            return Err(ServerError::Protocol(e));
        }
    };

    debug!("Received request: {:?}", request);
    let shutdown = matches!(request, Request::Shutdown);
    let response = handle_request(&ctx, request).await;
    debug!("Sending response: {:?}", response);

    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT)
        .await
        .map_err(ServerError::Protocol)?;

    // Only after the reply is out, so the client sees ShuttingDown
    if shutdown {
        let _ = ctx.shutdown.send(true);
    }
    Ok(())
}

/// Handle a single request and return a response
pub async fn handle_request(ctx: &ServerContext, request: Request) -> Response {
    let store = ctx.store.as_ref();
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version: _ } => Response::Hello {
            version: PROTOCOL_VERSION.to_string(),
        },

        Request::Shutdown => Response::ShuttingDown,

        Request::Status => {
            let objects: BTreeMap<String, usize> = ctx
                .store
                .inner()
                .counts()
                .into_iter()
                .map(|(kind, count)| (kind.to_string(), count))
                .collect();
            Response::Status {
                uptime_secs: ctx.start_time.elapsed().as_secs(),
                version: PROTOCOL_VERSION.to_string(),
                objects,
            }
        }

        Request::Get { key } => match store.get(&key).await {
            Ok(object) => Response::Object { object },
            Err(e) => e.into(),
        },

        Request::List {
            kind,
            namespace,
            selector,
        } => match store.list(kind, namespace.as_deref(), &selector).await {
            Ok(objects) => Response::Objects { objects },
            Err(e) => e.into(),
        },

        Request::Create { object } => match store.create(object).await {
            Ok(object) => Response::Object { object },
            Err(e) => e.into(),
        },

        Request::UpdateStatus { object } => match store.update_status(object).await {
            Ok(object) => Response::Object { object },
            Err(e) => e.into(),
        },

        Request::Delete { key } => match store.delete(&key).await {
            Ok(()) => Response::Ok,
            Err(e) => e.into(),
        },
    }
}

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),

    #[error("Request timeout")]
    Timeout,
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
