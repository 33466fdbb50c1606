// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol unit tests

use super::*;
use kord_core::coordination::{Barrier, BarrierSpec};
use kord_core::ObjectMeta;

fn barrier() -> Object {
    Barrier::new(
        ObjectMeta::new("default", "start"),
        BarrierSpec {
            expected: 2,
            quorum: None,
            timeout: Some(Duration::from_secs(60)),
        },
    )
    .into_object()
}

#[test]
fn encode_decode_roundtrip_request() {
    let request = Request::Create { object: barrier() };

    let encoded = encode(&request).expect("encode failed");
    let decoded: Request = decode(&encoded).expect("decode failed");

    assert_eq!(request, decoded);
}

#[test]
fn encode_decode_roundtrip_response() {
    let response = Response::Status {
        uptime_secs: 3600,
        version: PROTOCOL_VERSION.to_string(),
        objects: BTreeMap::from([("Barrier".to_string(), 2), ("Mutex".to_string(), 1)]),
    };

    let encoded = encode(&response).expect("encode failed");
    let decoded: Response = decode(&encoded).expect("decode failed");

    assert_eq!(response, decoded);
}

#[test]
fn request_wire_shape_is_tagged() {
    let request = Request::Get {
        key: ObjectKey::new(Kind::RwMutex, "default", "config"),
    };
    let value: serde_json::Value = serde_json::from_slice(&encode(&request).unwrap()).unwrap();
    assert_eq!(value["type"], "Get");
    assert_eq!(value["key"]["name"], "config");
}

#[test]
fn list_selector_defaults_to_everything() {
    let decoded: Request = decode(br#"{"type":"List","kind":"Mutex"}"#).unwrap();
    assert_eq!(
        decoded,
        Request::List {
            kind: Kind::Mutex,
            namespace: None,
            selector: LabelSelector::everything(),
        }
    );
}

#[test]
fn store_errors_keep_their_code() {
    let response = Response::from(StoreError::Conflict("db is at version 4".to_string()));
    let decoded: Response = decode(&encode(&response).unwrap()).unwrap();
    match decoded {
        Response::Error { code, message } => {
            assert_eq!(code, ErrorCode::Conflict);
            assert_eq!(
                StoreError::from_code(code, message),
                StoreError::Conflict("db is at version 4".to_string())
            );
        }
        other => panic!("Expected Error response, got {other:?}"),
    }
}

#[test]
fn encode_returns_json_without_length_prefix() {
    let response = Response::Ok;
    let encoded = encode(&response).expect("encode failed");

    let json_str = std::str::from_utf8(&encoded).expect("should be valid UTF-8");
    assert!(
        json_str.starts_with('{'),
        "should be JSON object: {}",
        json_str
    );
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let original = b"hello world";

    let mut buffer = Vec::new();
    write_message(&mut buffer, original)
        .await
        .expect("write failed");

    // write_message adds 4-byte length prefix
    assert_eq!(buffer.len(), 4 + original.len());

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back = read_message(&mut cursor).await.expect("read failed");

    assert_eq!(read_back, original);
}

#[tokio::test]
async fn write_message_adds_length_prefix() {
    let data = b"test data";

    let mut buffer = Vec::new();
    write_message(&mut buffer, data)
        .await
        .expect("write failed");

    let len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;
    assert_eq!(len, data.len());
    assert_eq!(&buffer[4..], data);
}

#[tokio::test]
async fn empty_stream_is_connection_closed() {
    let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
    assert!(matches!(
        read_message(&mut cursor).await,
        Err(ProtocolError::ConnectionClosed)
    ));
}

#[tokio::test]
async fn oversized_prefix_is_rejected() {
    let mut cursor = std::io::Cursor::new(u32::MAX.to_be_bytes().to_vec());
    assert!(matches!(
        read_message(&mut cursor).await,
        Err(ProtocolError::MessageTooLarge { .. })
    ));
}

#[tokio::test]
async fn request_survives_send_and_receive() {
    let (mut client, mut server) = tokio::io::duplex(1024);
    let request = Request::Hello {
        version: "0.1.0".to_string(),
    };
    send(&mut client, &request, DEFAULT_TIMEOUT).await.unwrap();
    let received = read_request(&mut server, DEFAULT_TIMEOUT).await.unwrap();
    assert_eq!(received, request);
}
