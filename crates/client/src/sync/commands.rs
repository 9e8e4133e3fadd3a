// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound user commands.
//!
//! Commands are fire-and-forget: they never touch local state, and the only
//! effect of a command the server accepts is the event it broadcasts back.
//! While the socket is not open a command is dropped; nothing is queued.

use std::sync::{Arc, Mutex, PoisonError};

use threadsync_core::{ClientMessage, IssueStatus};
use tokio::sync::mpsc;

/// Slot holding the outbound channel of the live connection, if any.
pub(crate) type OutboundSlot = Arc<Mutex<Option<mpsc::UnboundedSender<ClientMessage>>>>;

/// Serializes user intents onto the live socket.
#[derive(Debug, Clone)]
pub struct CommandSender {
    outbound: OutboundSlot,
}

impl CommandSender {
    pub(crate) fn new(outbound: OutboundSlot) -> Self {
        CommandSender { outbound }
    }

    /// Subscribe to a thread's live events.
    pub fn join_thread(&self, thread_id: &str) -> bool {
        self.send(ClientMessage::join_thread(thread_id))
    }

    /// Unsubscribe from a thread.
    pub fn leave_thread(&self, thread_id: &str) -> bool {
        self.send(ClientMessage::leave_thread(thread_id))
    }

    /// Post a chat message on an issue.
    pub fn send_message(&self, issue_id: &str, text: &str) -> bool {
        self.send(ClientMessage::send_message(issue_id, text))
    }

    /// Request an issue status change.
    pub fn change_status(&self, issue_id: &str, status: IssueStatus) -> bool {
        self.send(ClientMessage::change_status(issue_id, status))
    }

    /// Mark messages as read.
    pub fn mark_read(&self, message_ids: Vec<String>) -> bool {
        self.send(ClientMessage::mark_read(message_ids))
    }

    /// Hand a frame to the connection task. Returns false if it was dropped.
    fn send(&self, msg: ClientMessage) -> bool {
        let slot = self.outbound.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = slot.as_ref() else {
            tracing::debug!(action = msg.action(), "not connected, dropping command");
            return false;
        };
        match tx.send(msg) {
            Ok(()) => true,
            Err(mpsc::error::SendError(msg)) => {
                tracing::debug!(action = msg.action(), "connection closing, dropping command");
                false
            }
        }
    }
}
