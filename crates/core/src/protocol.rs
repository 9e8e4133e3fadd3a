// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol frames exchanged with the issues server.
//!
//! The protocol is asymmetric:
//! - Client frames are commands tagged by `action`
//! - Server frames are events tagged by `type`

use serde::{Deserialize, Serialize};

use crate::issue::{Issue, IssueStatus};
use crate::notification::Notification;
use crate::thread::Message;

/// Commands sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe to live events of a thread.
    ///
    /// The server answers with `thread_history`.
    JoinThread { thread_id: String },

    /// Stop receiving events of a thread.
    LeaveThread { thread_id: String },

    /// Post a chat message on an issue.
    ///
    /// The message is displayed only once it comes back as `new_message`.
    SendMessage { issue_id: String, text: String },

    /// Ask the server to move an issue to another status.
    ChangeStatus {
        issue_id: String,
        status: IssueStatus,
    },

    /// Batch read receipt.
    MarkRead { message_ids: Vec<String> },
}

/// Events pushed from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full message history of a thread, sent after `join_thread`.
    ThreadHistory {
        thread_id: String,
        #[serde(default)]
        messages: Vec<Message>,
    },

    /// A message was posted on an issue of a joined thread.
    NewMessage {
        thread_id: String,
        issue_id: String,
        message: Message,
    },

    /// An issue was created in a joined thread.
    IssueCreated { thread_id: String, issue: Issue },

    /// An issue status change was confirmed by the server.
    IssueStatusChanged {
        thread_id: String,
        issue_id: String,
        new_status: IssueStatus,
    },

    /// A notification for the signed-in user. Fields are flattened into the frame.
    Notification(Notification),

    /// The server rejected a command.
    Error {
        code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

impl ClientMessage {
    /// Creates a JoinThread message.
    pub fn join_thread(thread_id: impl Into<String>) -> Self {
        ClientMessage::JoinThread {
            thread_id: thread_id.into(),
        }
    }

    /// Creates a LeaveThread message.
    pub fn leave_thread(thread_id: impl Into<String>) -> Self {
        ClientMessage::LeaveThread {
            thread_id: thread_id.into(),
        }
    }

    /// Creates a SendMessage message.
    pub fn send_message(issue_id: impl Into<String>, text: impl Into<String>) -> Self {
        ClientMessage::SendMessage {
            issue_id: issue_id.into(),
            text: text.into(),
        }
    }

    /// Creates a ChangeStatus message.
    pub fn change_status(issue_id: impl Into<String>, status: IssueStatus) -> Self {
        ClientMessage::ChangeStatus {
            issue_id: issue_id.into(),
            status,
        }
    }

    /// Creates a MarkRead message.
    pub fn mark_read(message_ids: Vec<String>) -> Self {
        ClientMessage::MarkRead { message_ids }
    }

    /// Name of the action, for logging.
    pub fn action(&self) -> &'static str {
        match self {
            ClientMessage::JoinThread { .. } => "join_thread",
            ClientMessage::LeaveThread { .. } => "leave_thread",
            ClientMessage::SendMessage { .. } => "send_message",
            ClientMessage::ChangeStatus { .. } => "change_status",
            ClientMessage::MarkRead { .. } => "mark_read",
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerEvent {
    /// Creates a ThreadHistory event.
    pub fn thread_history(thread_id: impl Into<String>, messages: Vec<Message>) -> Self {
        ServerEvent::ThreadHistory {
            thread_id: thread_id.into(),
            messages,
        }
    }

    /// Creates a NewMessage event.
    pub fn new_message(
        thread_id: impl Into<String>,
        issue_id: impl Into<String>,
        message: Message,
    ) -> Self {
        ServerEvent::NewMessage {
            thread_id: thread_id.into(),
            issue_id: issue_id.into(),
            message,
        }
    }

    /// Creates an IssueCreated event.
    pub fn issue_created(thread_id: impl Into<String>, issue: Issue) -> Self {
        ServerEvent::IssueCreated {
            thread_id: thread_id.into(),
            issue,
        }
    }

    /// Creates an IssueStatusChanged event.
    pub fn issue_status_changed(
        thread_id: impl Into<String>,
        issue_id: impl Into<String>,
        new_status: IssueStatus,
    ) -> Self {
        ServerEvent::IssueStatusChanged {
            thread_id: thread_id.into(),
            issue_id: issue_id.into(),
            new_status,
        }
    }

    /// Creates a Notification event.
    pub fn notification(notification: Notification) -> Self {
        ServerEvent::Notification(notification)
    }

    /// Creates an Error event.
    pub fn error(code: impl Into<String>, details: Option<String>) -> Self {
        ServerEvent::Error {
            code: code.into(),
            details,
        }
    }

    /// Wire name of the event, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::ThreadHistory { .. } => "thread_history",
            ServerEvent::NewMessage { .. } => "new_message",
            ServerEvent::IssueCreated { .. } => "issue_created",
            ServerEvent::IssueStatusChanged { .. } => "issue_status_changed",
            ServerEvent::Notification(_) => "notification",
            ServerEvent::Error { .. } => "error",
        }
    }

    /// Serializes the event to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the event from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
