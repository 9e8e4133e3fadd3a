// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Live sync state and the reducer that folds events into it.
//!
//! Every change to [`SyncState`] goes through [`SyncState::apply`]. The
//! only writers of thread data are confirmed server results: socket events
//! and, for the REST fallbacks, the server's response converted to the
//! equivalent event. Nothing is inserted optimistically.
//!
//! All actions are idempotent except `thread_history`, which is an
//! authoritative replace of the message list.

use std::collections::HashMap;

use crate::issue::{Issue, IssueStatus};
use crate::notification::Notification;
use crate::protocol::ServerEvent;
use crate::thread::Message;

/// Live data of one thread.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadState {
    /// Chat messages in arrival order, unique by id.
    pub messages: Vec<Message>,
    /// Issues announced over the socket, unique by id.
    pub issues: Vec<Issue>,
    /// Confirmed statuses of issues that are not in `issues`
    /// (known only from a REST snapshot).
    pub status_updates: HashMap<String, IssueStatus>,
}

impl ThreadState {
    /// Look up a live issue by id.
    pub fn issue(&self, issue_id: &str) -> Option<&Issue> {
        self.issues.iter().find(|i| i.id == issue_id)
    }

    /// Latest confirmed status of an issue, if any was observed live.
    pub fn live_status(&self, issue_id: &str) -> Option<IssueStatus> {
        self.issue(issue_id)
            .map(|i| i.status)
            .or_else(|| self.status_updates.get(issue_id).copied())
    }

    /// Messages belonging to one issue, in arrival order.
    pub fn messages_for<'a>(&'a self, issue_id: &'a str) -> impl Iterator<Item = &'a Message> {
        self.messages
            .iter()
            .filter(move |m| m.issue_id.as_deref() == Some(issue_id))
    }

    fn has_message(&self, message_id: &str) -> bool {
        self.messages.iter().any(|m| m.id == message_id)
    }
}

/// Everything the sync core knows, as observed by consumers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncState {
    /// True while the socket is open.
    pub connected: bool,
    /// Last transport or protocol error.
    pub error: Option<String>,
    /// Per-thread live data, created lazily.
    pub threads: HashMap<String, ThreadState>,
    /// Newest first, unique by id.
    pub notifications: Vec<Notification>,
}

/// Inputs of the reducer: server events plus local lifecycle actions.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The socket opened.
    Connected,
    /// The socket closed, for whatever reason.
    Disconnected,
    /// The transport failed.
    TransportError(String),
    /// A decoded server event.
    Server(ServerEvent),
    /// A REST snapshot of this thread was fetched.
    ThreadOpened(String),
    /// The REST notification list was fetched.
    NotificationsLoaded(Vec<Notification>),
    /// All notifications were marked read on the server.
    NotificationsMarkedRead,
    /// One notification was dismissed locally.
    NotificationDismissed(String),
    /// All notifications were dismissed locally.
    ClearNotifications,
}

impl From<ServerEvent> for Action {
    fn from(event: ServerEvent) -> Self {
        Action::Server(event)
    }
}

impl SyncState {
    /// Live data of a thread, if the thread has been seen.
    pub fn thread(&self, thread_id: &str) -> Option<&ThreadState> {
        self.threads.get(thread_id)
    }

    /// Number of notifications not yet delivered/read.
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.is_delivered).count()
    }

    /// Apply an action in place. Returns true if the state changed.
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Connected => {
                let changed = !self.connected || self.error.is_some();
                self.connected = true;
                self.error = None;
                changed
            }
            Action::Disconnected => std::mem::replace(&mut self.connected, false),
            Action::TransportError(message) => self.set_error(message),
            Action::Server(event) => self.apply_event(event),
            Action::ThreadOpened(thread_id) => {
                if self.threads.contains_key(&thread_id) {
                    false
                } else {
                    self.threads.insert(thread_id, ThreadState::default());
                    true
                }
            }
            Action::NotificationsLoaded(snapshot) => self.load_notifications(snapshot),
            Action::NotificationsMarkedRead => {
                let mut changed = false;
                for n in self.notifications.iter_mut().filter(|n| !n.is_delivered) {
                    n.is_delivered = true;
                    changed = true;
                }
                changed
            }
            Action::NotificationDismissed(id) => {
                let before = self.notifications.len();
                self.notifications.retain(|n| n.id != id);
                self.notifications.len() != before
            }
            Action::ClearNotifications => {
                let changed = !self.notifications.is_empty();
                self.notifications.clear();
                changed
            }
        }
    }

    fn apply_event(&mut self, event: ServerEvent) -> bool {
        match event {
            ServerEvent::ThreadHistory {
                thread_id,
                messages,
            } => {
                let thread = self.threads.entry(thread_id).or_default();
                if thread.messages == messages {
                    return false;
                }
                thread.messages = messages;
                true
            }
            ServerEvent::NewMessage {
                thread_id,
                issue_id,
                mut message,
            } => {
                let thread = self.threads.entry(thread_id).or_default();
                if thread.has_message(&message.id) {
                    return false;
                }
                message.issue_id = Some(issue_id);
                thread.messages.push(message);
                true
            }
            ServerEvent::IssueCreated { thread_id, issue } => {
                let thread = self.threads.entry(thread_id).or_default();
                if thread.issue(&issue.id).is_some() {
                    return false;
                }
                thread.status_updates.remove(&issue.id);
                thread.issues.push(issue);
                true
            }
            ServerEvent::IssueStatusChanged {
                thread_id,
                issue_id,
                new_status,
            } => {
                // Events for threads never joined are dropped, not buffered.
                let Some(thread) = self.threads.get_mut(&thread_id) else {
                    return false;
                };
                if let Some(issue) = thread.issues.iter_mut().find(|i| i.id == issue_id) {
                    let changed = issue.status != new_status;
                    issue.status = new_status;
                    changed
                } else {
                    thread.status_updates.insert(issue_id, new_status) != Some(new_status)
                }
            }
            ServerEvent::Notification(notification) => {
                if self.notifications.iter().any(|n| n.id == notification.id) {
                    return false;
                }
                self.notifications.insert(0, notification);
                true
            }
            ServerEvent::Error { code, details } => self.set_error(details.unwrap_or(code)),
        }
    }

    fn set_error(&mut self, message: String) -> bool {
        if self.error.as_deref() == Some(message.as_str()) {
            return false;
        }
        self.error = Some(message);
        true
    }

    fn load_notifications(&mut self, snapshot: Vec<Notification>) -> bool {
        // Live notifications that arrived after the snapshot was taken stay in front.
        let mut merged: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|live| !snapshot.iter().any(|n| n.id == live.id))
            .cloned()
            .collect();
        for notification in snapshot {
            if !merged.iter().any(|n| n.id == notification.id) {
                merged.push(notification);
            }
        }
        if merged == self.notifications {
            return false;
        }
        self.notifications = merged;
        true
    }
}

/// Pure form of [`SyncState::apply`]: `(state, action) → state`.
pub fn reduce(mut state: SyncState, action: Action) -> SyncState {
    state.apply(action);
    state
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
