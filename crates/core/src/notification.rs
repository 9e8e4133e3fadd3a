// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Notification records delivered over the socket and the REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A lightweight event record surfaced to the signed-in user.
///
/// Notifications arrive over the socket independently of thread
/// subscriptions and are also listed by the REST API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    /// Kind tag, e.g. `new_message` or `issue_assigned`.
    pub notification_type: String,
    /// Read/delivery flag.
    #[serde(default)]
    pub is_delivered: bool,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

impl Notification {
    /// Creates an unread notification without payload.
    pub fn new(id: impl Into<String>, notification_type: impl Into<String>) -> Self {
        Notification {
            id: id.into(),
            notification_type: notification_type.into(),
            is_delivered: false,
            payload: serde_json::Value::Null,
            created_at: None,
            thread_id: None,
        }
    }
}
