// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the sync facade driven through a mock connector.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use threadsync_core::{ClientMessage, Issue, IssueStatus, Message, Notification, ServerEvent};

use super::test_helpers::{settle, MockConnector, MockPeer};
use super::{ConnectionConfig, ConnectionStatus, SyncService, WEBSOCKET_ERROR};
use crate::auth::Credentials;

fn service(connector: &MockConnector) -> SyncService<MockConnector> {
    SyncService::with_connector(
        ConnectionConfig::default(),
        connector.clone(),
        Credentials::new("secret"),
    )
}

async fn connected() -> (MockConnector, MockPeer, SyncService<MockConnector>) {
    let connector = MockConnector::new();
    let peer = connector.peer();
    let service = service(&connector);
    service.connect();
    settle().await;
    assert_eq!(service.status(), ConnectionStatus::Connected);
    (connector, peer, service)
}

fn gaps_ms(connector: &MockConnector) -> Vec<u64> {
    connector
        .attempts()
        .windows(2)
        .map(|w| (w[1] - w[0]).as_millis() as u64)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn connect_opens_with_token_and_marks_connected() {
    let (connector, _peer, service) = connected().await;

    assert_eq!(
        connector.urls(),
        vec!["ws://localhost:8001/ws/issues/?token=secret".to_string()]
    );
    let state = service.state();
    assert!(state.connected);
    assert!(state.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn unexpected_closes_back_off_exponentially_then_stop() {
    let (connector, peer, service) = connected().await;

    peer.close();
    tokio::time::sleep(Duration::from_secs(120)).await;

    // Initial open plus five reconnects, none of which finds a peer.
    assert_eq!(connector.attempts().len(), 6);
    let expected = [1000u64, 2000, 4000, 8000, 16000];
    for (gap, want) in gaps_ms(&connector).into_iter().zip(expected) {
        assert!(gap.abs_diff(want) <= 5, "gap {} ms, expected {} ms", gap, want);
    }
    assert_eq!(service.status(), ConnectionStatus::Disconnected);
    assert_eq!(service.reconnect_attempts(), 5);
    assert_eq!(service.error().as_deref(), Some(WEBSOCKET_ERROR));
}

#[tokio::test(start_paused = true)]
async fn manual_shutdown_cancels_pending_reconnect() {
    let (connector, peer, service) = connected().await;

    peer.close();
    settle().await;
    assert_eq!(service.reconnect_attempts(), 1);

    service.shutdown();
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(connector.attempts().len(), 1);
    assert!(!service.state().connected);
}

#[tokio::test(start_paused = true)]
async fn manual_shutdown_while_open_does_not_reconnect() {
    let (connector, _peer, service) = connected().await;
    let _spare = connector.peer();

    service.shutdown();
    settle().await;
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(connector.attempts().len(), 1);
    assert_eq!(service.status(), ConnectionStatus::Disconnected);
    assert!(!service.state().connected);
}

#[tokio::test(start_paused = true)]
async fn explicit_reconnect_recovers_after_exhaustion() {
    let (connector, peer, service) = connected().await;
    peer.close();
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(service.status(), ConnectionStatus::Disconnected);

    let _fresh = connector.peer();
    service.reconnect();
    settle().await;

    assert_eq!(service.status(), ConnectionStatus::Connected);
    assert_eq!(service.reconnect_attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn commands_while_disconnected_are_dropped() {
    let connector = MockConnector::new();
    let service = service(&connector);
    let before = service.state();

    assert!(!service.send_message("i1", "hello"));
    assert!(!service.join_thread("t1"));
    assert!(!service.change_status("i1", IssueStatus::Resolved));
    assert!(!service.mark_read(vec!["m1".into()]));

    assert_eq!(service.state(), before);
    assert!(connector.attempts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn commands_are_sent_as_frames_without_touching_state() {
    let (_connector, mut peer, service) = connected().await;
    let before = service.state();

    assert!(service.join_thread("t1"));
    assert!(service.send_message("i1", "hello"));
    assert!(service.change_status("i1", IssueStatus::InProgress));
    settle().await;

    assert_eq!(
        peer.sent(),
        vec![
            ClientMessage::join_thread("t1"),
            ClientMessage::send_message("i1", "hello"),
            ClientMessage::change_status("i1", IssueStatus::InProgress),
        ]
    );
    assert_eq!(service.state(), before);
}

#[tokio::test(start_paused = true)]
async fn server_events_are_folded_in_arrival_order() {
    let (_connector, peer, service) = connected().await;

    peer.push(ServerEvent::thread_history("t1", vec![Message::new("m1", "first")]));
    peer.push(ServerEvent::new_message("t1", "i1", Message::new("m2", "second")));
    peer.push(ServerEvent::new_message("t1", "i1", Message::new("m2", "second")));
    peer.push(ServerEvent::issue_created("t1", Issue::new("i2", 2, "Paint scratch")));
    peer.push(ServerEvent::issue_status_changed("t1", "i2", IssueStatus::InProgress));
    peer.push(ServerEvent::notification(Notification::new("n1", "new_message")));
    settle().await;

    let thread = service.thread("t1").unwrap();
    let ids: Vec<_> = thread.messages.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["m1", "m2"]);
    assert_eq!(thread.messages[1].issue_id.as_deref(), Some("i1"));
    assert_eq!(thread.issue("i2").unwrap().status, IssueStatus::InProgress);
    assert_eq!(service.unread_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn undecodable_frames_are_skipped() {
    let (_connector, peer, service) = connected().await;

    peer.push_raw("not json");
    peer.push_raw(r#"{"type":"presence","user":"u1"}"#);
    peer.push(ServerEvent::notification(Notification::new("n1", "issue_assigned")));
    settle().await;

    assert!(service.is_connected());
    assert_eq!(service.notifications().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn protocol_error_is_recorded_and_connection_kept() {
    let (_connector, peer, service) = connected().await;

    peer.push(ServerEvent::error("forbidden", Some("not a thread member".into())));
    settle().await;

    assert!(service.is_connected());
    assert_eq!(service.error().as_deref(), Some("not a thread member"));
}

#[tokio::test(start_paused = true)]
async fn subscribers_wake_on_change() {
    let (_connector, peer, service) = connected().await;
    let mut rx = service.subscribe();
    rx.borrow_and_update();

    peer.push(ServerEvent::notification(Notification::new("n1", "new_message")));
    rx.changed().await.unwrap();

    assert_eq!(rx.borrow().notifications.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn close_flushes_pending_commands() {
    let (_connector, mut peer, service) = connected().await;

    assert!(service.send_message("i1", "bye"));
    service.close().await;

    assert_eq!(peer.sent(), vec![ClientMessage::send_message("i1", "bye")]);
    assert!(!service.state().connected);
}

#[tokio::test(start_paused = true)]
async fn connect_right_after_shutdown_opens_a_new_session() {
    let (connector, _old, service) = connected().await;
    let _next = connector.peer();

    service.shutdown();
    service.connect();
    settle().await;
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(connector.attempts().len(), 2);
    assert_eq!(service.status(), ConnectionStatus::Connected);
    assert!(service.state().connected);
    assert!(service.send_message("i1", "still here"));
}

#[tokio::test(start_paused = true)]
async fn reconnect_during_backoff_replaces_pending_retry() {
    let (connector, peer, service) = connected().await;

    peer.close();
    settle().await;
    assert_eq!(service.reconnect_attempts(), 1);

    tokio::time::sleep(Duration::from_millis(500)).await;
    service.reconnect();
    tokio::time::sleep(Duration::from_secs(120)).await;

    // Initial open, the explicit reconnect, then one backoff chain.
    let attempts = connector.attempts();
    assert_eq!(attempts.len(), 7);
    let expected = [1000u64, 2000, 4000, 8000, 16000];
    for (gap, want) in gaps_ms(&connector).into_iter().skip(1).zip(expected) {
        assert!(gap.abs_diff(want) <= 5, "gap {} ms, expected {} ms", gap, want);
    }
    assert_eq!(service.status(), ConnectionStatus::Disconnected);
    assert_eq!(service.reconnect_attempts(), 5);
}
