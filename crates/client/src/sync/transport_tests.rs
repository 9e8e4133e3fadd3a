// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the WebSocket transport against an in-process server.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use tokio::net::TcpListener;

use super::*;

#[tokio::test]
async fn send_and_recv_fail_before_connect() {
    let mut transport = WebSocketTransport::new();
    assert!(!transport.is_connected());

    let err = transport
        .send(ClientMessage::join_thread("t1"))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Closed));
    assert!(matches!(
        transport.recv().await,
        Err(TransportError::Closed)
    ));
}

#[tokio::test]
async fn connect_to_unreachable_endpoint_fails() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut transport = WebSocketTransport::new();
    let err = transport
        .connect(&format!("ws://{}/ws/issues/", addr))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Connect(_)));
    assert!(!transport.is_connected());
}

#[tokio::test]
async fn exchanges_text_frames_and_reports_close() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        let received = match ws.next().await {
            Some(Ok(Frame::Text(text))) => text.to_string(),
            other => panic!("expected text frame, got {:?}", other),
        };
        ws.send(Frame::Ping(Vec::new().into())).await.unwrap();
        ws.send(Frame::Text(r#"{"type":"error","code":"x"}"#.into()))
            .await
            .unwrap();
        ws.close(None).await.unwrap();
        received
    });

    let mut transport = WebSocketTransport::new();
    transport
        .connect(&format!("ws://{}/ws/issues/", addr))
        .await
        .unwrap();
    assert!(transport.is_connected());

    transport
        .send(ClientMessage::join_thread("t1"))
        .await
        .unwrap();

    let frame = transport.recv().await.unwrap();
    assert_eq!(frame.as_deref(), Some(r#"{"type":"error","code":"x"}"#));
    assert_eq!(transport.recv().await.unwrap(), None);
    assert!(!transport.is_connected());

    let received = server.await.unwrap();
    assert_eq!(
        ClientMessage::from_json(&received).unwrap(),
        ClientMessage::join_thread("t1")
    );
}
