// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

fn msg(id: &str) -> Message {
    Message::new(id, format!("text of {}", id))
}

fn note(id: &str) -> Notification {
    Notification::new(id, "new_message")
}

fn joined(thread_id: &str) -> SyncState {
    reduce(
        SyncState::default(),
        ServerEvent::thread_history(thread_id, vec![]).into(),
    )
}

fn message_ids(state: &SyncState, thread_id: &str) -> Vec<String> {
    state.threads[thread_id]
        .messages
        .iter()
        .map(|m| m.id.clone())
        .collect()
}

#[test]
fn thread_history_replaces_messages() {
    let mut state = joined("t-1");
    state.apply(ServerEvent::new_message("t-1", "i-1", msg("m-0")).into());

    let changed = state.apply(ServerEvent::thread_history("t-1", vec![msg("m-1"), msg("m-2")]).into());

    assert!(changed);
    assert_eq!(message_ids(&state, "t-1"), vec!["m-1", "m-2"]);
}

#[test]
fn thread_history_keeps_issues() {
    let mut state = joined("t-1");
    state.apply(ServerEvent::issue_created("t-1", Issue::new("i-1", 1, "Dent")).into());
    state.apply(ServerEvent::thread_history("t-1", vec![msg("m-1")]).into());
    assert_eq!(state.threads["t-1"].issues.len(), 1);
}

#[test]
fn new_message_appends_and_stamps_issue() {
    let mut state = joined("t-1");
    state.apply(ServerEvent::new_message("t-1", "i-7", msg("m-1")).into());

    let thread = state.thread("t-1").unwrap();
    assert_eq!(thread.messages.len(), 1);
    assert_eq!(thread.messages[0].issue_id.as_deref(), Some("i-7"));
    assert_eq!(thread.messages_for("i-7").count(), 1);
    assert_eq!(thread.messages_for("i-8").count(), 0);
}

#[test]
fn new_message_replay_is_idempotent() {
    let mut state = joined("t-1");
    for id in ["m-1", "m-2", "m-3"] {
        state.apply(ServerEvent::new_message("t-1", "i-1", msg(id)).into());
    }
    let before = state.clone();

    for id in ["m-2", "m-1", "m-3", "m-2"] {
        let changed = state.apply(ServerEvent::new_message("t-1", "i-1", msg(id)).into());
        assert!(!changed, "replay of {} must not change state", id);
    }

    assert_eq!(state, before);
    assert_eq!(message_ids(&state, "t-1"), vec!["m-1", "m-2", "m-3"]);
}

#[test]
fn new_message_for_unseen_thread_creates_it() {
    let state = reduce(
        SyncState::default(),
        ServerEvent::new_message("t-9", "i-1", msg("m-1")).into(),
    );
    assert_eq!(message_ids(&state, "t-9"), vec!["m-1"]);
}

#[test]
fn issue_created_initializes_unseen_thread() {
    let state = reduce(
        SyncState::default(),
        ServerEvent::issue_created("t-2", Issue::new("i-1", 1, "Dent")).into(),
    );
    let thread = state.thread("t-2").unwrap();
    assert_eq!(thread.issues.len(), 1);
    assert!(thread.messages.is_empty());
}

#[test]
fn issue_created_replay_is_idempotent() {
    let event: Action = ServerEvent::issue_created("t-1", Issue::new("i-1", 1, "Dent")).into();
    let once = reduce(SyncState::default(), event.clone());
    let twice = reduce(once.clone(), event);
    assert_eq!(once, twice);
}

#[test]
fn status_change_updates_live_issue_in_place() {
    let mut state = joined("t-1");
    state.apply(ServerEvent::issue_created("t-1", Issue::new("i-1", 1, "Dent")).into());
    state.apply(ServerEvent::issue_created("t-1", Issue::new("i-2", 2, "Scratch")).into());

    state.apply(ServerEvent::issue_status_changed("t-1", "i-2", IssueStatus::InProgress).into());

    let thread = state.thread("t-1").unwrap();
    assert_eq!(thread.issues[0].status, IssueStatus::Open);
    assert_eq!(thread.issues[1].status, IssueStatus::InProgress);
    assert!(thread.status_updates.is_empty());
}

#[test]
fn status_change_for_snapshot_only_issue_is_recorded() {
    let mut state = joined("t-1");
    state.apply(ServerEvent::issue_status_changed("t-1", "i-1", IssueStatus::Resolved).into());

    let thread = state.thread("t-1").unwrap();
    assert!(thread.issues.is_empty());
    assert_eq!(thread.live_status("i-1"), Some(IssueStatus::Resolved));
}

#[test]
fn status_change_for_unknown_thread_is_dropped() {
    let state = SyncState::default();
    let mut next = state.clone();

    let changed =
        next.apply(ServerEvent::issue_status_changed("never-joined", "i-1", IssueStatus::Resolved).into());

    assert!(!changed);
    assert!(next.threads.is_empty());
    assert_eq!(next, state);
}

#[test]
fn status_change_replay_is_idempotent() {
    let event: Action = ServerEvent::issue_status_changed("t-1", "i-1", IssueStatus::Rejected).into();
    let once = reduce(joined("t-1"), event.clone());
    let twice = reduce(once.clone(), event);
    assert_eq!(once, twice);
}

#[test]
fn notifications_are_newest_first() {
    let mut state = SyncState::default();
    for id in ["N1", "N2", "N3"] {
        state.apply(ServerEvent::notification(note(id)).into());
    }
    let ids: Vec<_> = state.notifications.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["N3", "N2", "N1"]);
    assert_eq!(state.unread_count(), 3);
}

#[test]
fn duplicate_notification_is_ignored() {
    let mut state = SyncState::default();
    state.apply(ServerEvent::notification(note("N1")).into());
    state.apply(ServerEvent::notification(note("N2")).into());
    assert!(!state.apply(ServerEvent::notification(note("N1")).into()));
    assert_eq!(state.notifications.len(), 2);
    assert_eq!(state.notifications[0].id, "N2");
}

#[parameterized(
    details = { ServerEvent::error("forbidden", Some("not a member".into())), "not a member" },
    code_only = { ServerEvent::error("forbidden", None), "forbidden" },
)]
fn error_event_is_recorded(event: ServerEvent, expected: &str) {
    let mut state = joined("t-1");
    state.apply(Action::Connected);
    state.apply(event.into());
    assert_eq!(state.error.as_deref(), Some(expected));
    assert!(state.connected, "an error event must not tear down the connection");
    assert!(state.threads.contains_key("t-1"));
}

#[test]
fn connected_clears_error() {
    let mut state = SyncState::default();
    state.apply(Action::TransportError("websocket error".into()));
    assert_eq!(state.error.as_deref(), Some("websocket error"));

    assert!(state.apply(Action::Connected));
    assert!(state.connected);
    assert!(state.error.is_none());

    assert!(!state.apply(Action::Connected));
    assert!(state.apply(Action::Disconnected));
    assert!(!state.apply(Action::Disconnected));
    assert!(!state.connected);
}

#[test]
fn thread_opened_creates_empty_entry_once() {
    let mut state = SyncState::default();
    assert!(state.apply(Action::ThreadOpened("t-1".into())));
    state.apply(ServerEvent::new_message("t-1", "i-1", msg("m-1")).into());
    assert!(!state.apply(Action::ThreadOpened("t-1".into())));
    assert_eq!(message_ids(&state, "t-1"), vec!["m-1"]);
}

#[test]
fn notifications_loaded_keeps_live_only_entries_in_front() {
    let mut state = SyncState::default();
    state.apply(ServerEvent::notification(note("N2")).into());
    state.apply(ServerEvent::notification(note("N9")).into());

    state.apply(Action::NotificationsLoaded(vec![note("N2"), note("N1")]));

    let ids: Vec<_> = state.notifications.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["N9", "N2", "N1"]);
}

#[test]
fn notifications_mark_read_dismiss_and_clear() {
    let mut state = SyncState::default();
    for id in ["N1", "N2", "N3"] {
        state.apply(ServerEvent::notification(note(id)).into());
    }

    assert!(state.apply(Action::NotificationsMarkedRead));
    assert_eq!(state.unread_count(), 0);
    assert!(!state.apply(Action::NotificationsMarkedRead));

    assert!(state.apply(Action::NotificationDismissed("N2".into())));
    assert!(!state.apply(Action::NotificationDismissed("N2".into())));
    assert_eq!(state.notifications.len(), 2);

    assert!(state.apply(Action::ClearNotifications));
    assert!(state.notifications.is_empty());
}

#[test]
fn folding_a_replayed_stream_matches_a_single_pass() {
    let events = vec![
        ServerEvent::thread_history("t1", vec![msg("m1").for_issue("i1")]),
        ServerEvent::new_message("t1", "i1", msg("m2")),
        ServerEvent::new_message("t1", "i2", msg("m3")),
        ServerEvent::new_message("t1", "i1", msg("m2")),
    ];

    let state = events
        .into_iter()
        .map(Action::from)
        .fold(SyncState::default(), reduce);

    let thread = &state.threads["t1"];
    let ids: Vec<&str> = thread.messages_for("i1").map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["m1", "m2"]);
    assert_eq!(message_ids(&state, "t1"), ["m1", "m2", "m3"]);
}
