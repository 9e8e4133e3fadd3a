// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Issues API endpoints.

use serde::{Deserialize, Serialize};
use threadsync_core::{Issue, IssueStatus, Message, Notification, Thread, Visibility};

use super::client::{ApiClient, ApiError, ApiResult, Listing};

/// Payload for creating a thread.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewThread {
    pub title: String,
    /// External ids of the products under discussion.
    pub product_external_ids: Vec<String>,
    /// Saved configurator filter used to restore the graph view.
    pub graph_context: serde_json::Value,
    pub visibility: Visibility,
    /// Departments that can see a restricted thread.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub department_ids: Vec<String>,
}

/// Payload for creating an issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub assigned_to_department_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_user_id: Option<String>,
}

/// Allowed status transitions, bare or wrapped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AllowedStatuses {
    Wrapped { allowed_statuses: Vec<IssueStatus> },
    Bare(Vec<IssueStatus>),
}

#[derive(Serialize)]
struct StatusBody {
    status: IssueStatus,
}

#[derive(Serialize)]
struct TextBody<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct MessageIdsBody<'a> {
    message_ids: &'a [String],
}

fn issue_path(thread_id: &str, issue_id: &str) -> String {
    format!("threads/{}/issues/{}", thread_id, issue_id)
}

impl ApiClient {
    // ========== Threads ==========

    /// List threads visible to the user, optionally for one product.
    pub async fn list_threads(&self, product_external_id: Option<&str>) -> ApiResult<Vec<Thread>> {
        let query: Vec<(&str, &str)> = product_external_id
            .map(|id| vec![("product_external_id", id)])
            .unwrap_or_default();
        let listing: Listing<Thread> = self.get("threads/", &query).await?;
        Ok(listing.into_items())
    }

    /// Thread detail including its issues.
    pub async fn get_thread(&self, thread_id: &str) -> ApiResult<Thread> {
        self.get(&format!("threads/{}/", thread_id), &[]).await
    }

    pub async fn create_thread(&self, payload: &NewThread) -> ApiResult<Thread> {
        self.post("threads/", payload)
            .await?
            .ok_or(ApiError::MissingBody)
    }

    /// Close a thread. Returns the updated thread if the server sends one.
    pub async fn close_thread(&self, thread_id: &str) -> ApiResult<Option<Thread>> {
        self.post_empty(&format!("threads/{}/close/", thread_id))
            .await
    }

    /// Reopen a thread. Returns the updated thread if the server sends one.
    pub async fn reopen_thread(&self, thread_id: &str) -> ApiResult<Option<Thread>> {
        self.post_empty(&format!("threads/{}/reopen/", thread_id))
            .await
    }

    // ========== Issues ==========

    pub async fn list_issues(&self, thread_id: &str) -> ApiResult<Vec<Issue>> {
        let listing: Listing<Issue> = self
            .get(&format!("threads/{}/issues/", thread_id), &[])
            .await?;
        Ok(listing.into_items())
    }

    pub async fn create_issue(&self, thread_id: &str, payload: &NewIssue) -> ApiResult<Issue> {
        self.post(&format!("threads/{}/issues/", thread_id), payload)
            .await?
            .ok_or(ApiError::MissingBody)
    }

    /// Statuses the server allows this user to move the issue to.
    pub async fn allowed_statuses(
        &self,
        thread_id: &str,
        issue_id: &str,
    ) -> ApiResult<Vec<IssueStatus>> {
        let allowed: AllowedStatuses = self
            .get(
                &format!("{}/allowed_statuses/", issue_path(thread_id, issue_id)),
                &[],
            )
            .await?;
        Ok(match allowed {
            AllowedStatuses::Wrapped { allowed_statuses } => allowed_statuses,
            AllowedStatuses::Bare(statuses) => statuses,
        })
    }

    /// Change an issue's status. Returns the updated issue if the server sends one.
    pub async fn change_status(
        &self,
        thread_id: &str,
        issue_id: &str,
        status: IssueStatus,
    ) -> ApiResult<Option<Issue>> {
        self.post(
            &format!("{}/change_status/", issue_path(thread_id, issue_id)),
            &StatusBody { status },
        )
        .await
    }

    // ========== Messages ==========

    /// Message history of an issue.
    pub async fn list_messages(&self, thread_id: &str, issue_id: &str) -> ApiResult<Vec<Message>> {
        let listing: Listing<Message> = self
            .get(&format!("{}/messages/", issue_path(thread_id, issue_id)), &[])
            .await?;
        Ok(listing.into_items())
    }

    /// Post a message. Returns the stored message if the server sends one.
    pub async fn send_message(
        &self,
        thread_id: &str,
        issue_id: &str,
        text: &str,
    ) -> ApiResult<Option<Message>> {
        self.post(
            &format!("{}/messages/", issue_path(thread_id, issue_id)),
            &TextBody { text },
        )
        .await
    }

    pub async fn mark_messages_read(
        &self,
        thread_id: &str,
        issue_id: &str,
        message_ids: &[String],
    ) -> ApiResult<()> {
        self.post::<serde_json::Value, _>(
            &format!("{}/messages/mark_read/", issue_path(thread_id, issue_id)),
            &MessageIdsBody { message_ids },
        )
        .await?;
        Ok(())
    }

    // ========== Notifications ==========

    pub async fn list_notifications(&self) -> ApiResult<Vec<Notification>> {
        let listing: Listing<Notification> = self.get("notifications/", &[]).await?;
        Ok(listing.into_items())
    }

    pub async fn mark_all_notifications_read(&self) -> ApiResult<()> {
        self.post_empty::<serde_json::Value>("notifications/mark_all_read/")
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "issues_tests.rs"]
mod tests;
