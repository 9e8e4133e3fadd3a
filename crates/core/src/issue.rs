// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Issue types: the trackable remarks raised inside a thread.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Workflow status of an issue.
///
/// The lifecycle is `open → in_progress → resolved → verified | rejected`,
/// and a rejected issue can be picked up again (`rejected → in_progress`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    /// Raised, nobody is working on it yet. Initial state.
    Open,
    /// The assigned department is working on it.
    InProgress,
    /// The assignee considers it fixed.
    Resolved,
    /// The reporter confirmed the fix. Terminal.
    Verified,
    /// The reporter did not accept the fix.
    Rejected,
}

impl IssueStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [IssueStatus; 5] = [
        IssueStatus::Open,
        IssueStatus::InProgress,
        IssueStatus::Resolved,
        IssueStatus::Verified,
        IssueStatus::Rejected,
    ];

    /// Returns the string representation used on the wire and in display.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Open => "open",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::Resolved => "resolved",
            IssueStatus::Verified => "verified",
            IssueStatus::Rejected => "rejected",
        }
    }

    /// Statuses reachable from this one in a single step.
    pub fn next_statuses(&self) -> &'static [IssueStatus] {
        match self {
            IssueStatus::Open => &[IssueStatus::InProgress],
            IssueStatus::InProgress => &[IssueStatus::Resolved],
            IssueStatus::Resolved => &[IssueStatus::Verified, IssueStatus::Rejected],
            IssueStatus::Rejected => &[IssueStatus::InProgress],
            IssueStatus::Verified => &[],
        }
    }

    /// Check if a transition from this status to target is valid.
    pub fn can_transition_to(&self, target: IssueStatus) -> bool {
        self.next_statuses().contains(&target)
    }

    /// Validate a transition, returning a descriptive error when it is not allowed.
    pub fn transition_to(&self, target: IssueStatus) -> Result<IssueStatus> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(Error::InvalidTransition {
                from: self.to_string(),
                to: target.to_string(),
                valid_targets: self.valid_targets(),
            })
        }
    }

    /// Get valid transition targets as a formatted string.
    pub fn valid_targets(&self) -> String {
        let targets = self.next_statuses();
        if targets.is_empty() {
            return "nothing (terminal)".to_string();
        }
        targets
            .iter()
            .map(IssueStatus::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Returns true if no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        self.next_statuses().is_empty()
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "open" => Ok(IssueStatus::Open),
            "in_progress" => Ok(IssueStatus::InProgress),
            "resolved" => Ok(IssueStatus::Resolved),
            "verified" => Ok(IssueStatus::Verified),
            "rejected" => Ok(IssueStatus::Rejected),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// A single trackable remark within a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Server-assigned identifier.
    pub id: String,
    /// Sequential number within the thread, shown as `#N`.
    #[serde(default)]
    pub number: u32,
    pub title: String,
    pub status: IssueStatus,
    /// Department responsible for the issue.
    #[serde(default, alias = "assigned_to_department")]
    pub assigned_to_department_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_department_name: Option<String>,
    /// Optional individual assignee inside the department.
    #[serde(default, alias = "assigned_to_user", skip_serializing_if = "Option::is_none")]
    pub assigned_to_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Issue {
    /// Creates a new open issue with the given identity.
    pub fn new(id: impl Into<String>, number: u32, title: impl Into<String>) -> Self {
        Issue {
            id: id.into(),
            number,
            title: title.into(),
            status: IssueStatus::Open,
            assigned_to_department_id: None,
            assigned_to_department_name: None,
            assigned_to_user_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Returns a copy with the given status.
    pub fn with_status(mut self, status: IssueStatus) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
#[path = "issue_tests.rs"]
mod tests;
