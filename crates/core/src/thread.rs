// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Threads and their chat messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::issue::Issue;

/// Who can see a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    /// Visible to every authenticated user.
    Public,
    /// Visible only to the listed departments.
    #[default]
    Restricted,
}

/// REST snapshot of a discussion thread.
///
/// The list endpoint returns threads without issues; the detail endpoint
/// fills `issues` with the issue set as of the fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "visibility_any_case")]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_closed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, alias = "product_ids")]
    pub product_external_ids: Vec<String>,
    #[serde(default)]
    pub department_ids: Vec<String>,
    /// Saved configurator filter used to restore the graph view.
    #[serde(default)]
    pub graph_context: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

fn visibility_any_case<'de, D>(deserializer: D) -> Result<Visibility, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.to_ascii_uppercase().as_str() {
        "PUBLIC" => Ok(Visibility::Public),
        "RESTRICTED" => Ok(Visibility::Restricted),
        other => Err(serde::de::Error::unknown_variant(
            other,
            &["PUBLIC", "RESTRICTED"],
        )),
    }
}

/// One chat message attached to an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(alias = "message_id")]
    pub id: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Generated by the server (status changes, assignments), not typed by a user.
    #[serde(default)]
    pub is_system: bool,
    /// Owning issue; stamped from the enclosing event when absent in the payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<String>,
}

impl Message {
    /// Creates a user message with the given identity and text.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Message {
            id: id.into(),
            author_id: None,
            author_name: None,
            text: text.into(),
            created_at: None,
            is_system: false,
            issue_id: None,
        }
    }

    /// Returns a copy attached to the given issue.
    pub fn for_issue(mut self, issue_id: impl Into<String>) -> Self {
        self.issue_id = Some(issue_id.into());
        self
    }
}
