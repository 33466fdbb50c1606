// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol between the CLI and the daemon
//!
//! One request and one response per connection. Each message is a JSON
//! document behind a 4-byte big-endian length prefix.

use kord_core::{Kind, LabelSelector, Object, ObjectKey};
use kord_storage::{ErrorCode, StoreError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Version reported in Hello responses
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Per-message read/write timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest frame either side accepts
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    Ping,
    Hello {
        version: String,
    },
    Status,
    Shutdown,
    Get {
        key: ObjectKey,
    },
    List {
        kind: Kind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        namespace: Option<String>,
        #[serde(default, skip_serializing_if = "LabelSelector::is_empty")]
        selector: LabelSelector,
    },
    Create {
        object: Object,
    },
    UpdateStatus {
        object: Object,
    },
    Delete {
        key: ObjectKey,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Pong,
    Hello {
        version: String,
    },
    Status {
        uptime_secs: u64,
        version: String,
        /// Stored objects per kind name
        objects: BTreeMap<String, usize>,
    },
    Object {
        object: Object,
    },
    Objects {
        objects: Vec<Object>,
    },
    Ok,
    ShuttingDown,
    Error {
        code: ErrorCode,
        message: String,
    },
}

impl From<StoreError> for Response {
    fn from(error: StoreError) -> Self {
        Response::Error {
            code: error.code(),
            message: error.message().to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Timed out")]
    Timeout,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Message of {size} bytes exceeds the {max} byte limit")]
    MessageTooLarge { size: usize, max: usize },
}

/// Serialize to raw JSON (no length prefix)
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(message)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Write `data` behind its length prefix
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    data: &[u8],
) -> Result<(), ProtocolError> {
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: data.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    let len = u32::try_from(data.len()).map_err(|_| ProtocolError::MessageTooLarge {
        size: data.len(),
        max: MAX_MESSAGE_SIZE,
    })?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed message
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut prefix = [0u8; 4];
    match reader.read_exact(&mut prefix).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed)
        }
        Err(e) => return Err(e.into()),
    }
    let len = usize::try_from(u32::from_be_bytes(prefix)).unwrap_or(usize::MAX);
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }
    let mut buffer = vec![0u8; len];
    reader.read_exact(&mut buffer).await?;
    Ok(buffer)
}

/// Encode and write `message`, failing with `Timeout` after `timeout`
pub async fn send<W, T>(writer: &mut W, message: &T, timeout: Duration) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let data = encode(message)?;
    tokio::time::timeout(timeout, write_message(writer, &data))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

/// Read and decode one message, failing with `Timeout` after `timeout`
pub async fn receive<R, T>(reader: &mut R, timeout: Duration) -> Result<T, ProtocolError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let data = tokio::time::timeout(timeout, read_message(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(&data)
}

pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Duration,
) -> Result<Request, ProtocolError> {
    receive(reader, timeout).await
}

pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    send(writer, response, timeout).await
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
