// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! REST snapshots reconciled with live state.
//!
//! An [`IssuesSession`] keeps the thread list and at most one open thread
//! view. Opening a view fetches the thread detail and joins the thread on
//! the socket; the issues shown for it are the snapshot overlaid with what
//! the socket has confirmed since (see [`reconcile_issues`]).
//!
//! Each view owns a cancellation token. Leaving the view, or opening
//! another one, cancels it, and a response that lands afterwards is
//! discarded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use threadsync_core::{
    reconcile_issues, Action, Issue, IssueStatus, Message, Notification, ServerEvent, Thread,
};
use tokio_util::sync::CancellationToken;

use crate::api::{ApiClient, NewIssue, NewThread};
use crate::error::{Error, Result};
use crate::sync::{Connector, SyncService, WebSocketConnector};

/// Lifecycle of the thread view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscription {
    /// No thread is open.
    Unsubscribed,
    /// The thread detail is being fetched.
    Loading { thread_id: String },
    /// The snapshot is loaded and the thread is joined.
    Active { thread_id: String },
}

struct ThreadView {
    thread_id: String,
    cancel: CancellationToken,
    snapshot: Option<Thread>,
}

impl ThreadView {
    fn is_current(&self, thread_id: &str) -> bool {
        self.thread_id == thread_id && !self.cancel.is_cancelled()
    }
}

/// Thread list, open thread view and notifications for one signed-in user.
pub struct IssuesSession<C: Connector = WebSocketConnector> {
    api: ApiClient,
    sync: Arc<SyncService<C>>,
    threads: Mutex<Vec<Thread>>,
    view: Mutex<Option<ThreadView>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<C: Connector> IssuesSession<C> {
    pub fn new(api: ApiClient, sync: Arc<SyncService<C>>) -> Self {
        IssuesSession {
            api,
            sync,
            threads: Mutex::new(Vec::new()),
            view: Mutex::new(None),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn sync(&self) -> &Arc<SyncService<C>> {
        &self.sync
    }

    // ========== Threads ==========

    /// Fetch and store the thread list.
    pub async fn fetch_threads(&self, product_external_id: Option<&str>) -> Result<Vec<Thread>> {
        let threads = self.api.list_threads(product_external_id).await?;
        tracing::debug!(count = threads.len(), "thread list fetched");
        *lock(&self.threads) = threads.clone();
        Ok(threads)
    }

    /// Last fetched thread list.
    pub fn threads(&self) -> Vec<Thread> {
        lock(&self.threads).clone()
    }

    /// Create a thread and put it at the top of the list.
    pub async fn create_thread(&self, payload: &NewThread) -> Result<Thread> {
        let thread = self.api.create_thread(payload).await?;
        tracing::info!(thread_id = %thread.id, "thread created");
        lock(&self.threads).insert(0, thread.clone());
        Ok(thread)
    }

    pub async fn close_thread(&self, thread_id: &str) -> Result<()> {
        let updated = self.api.close_thread(thread_id).await?;
        self.store_thread_update(thread_id, updated, true);
        Ok(())
    }

    pub async fn reopen_thread(&self, thread_id: &str) -> Result<()> {
        let updated = self.api.reopen_thread(thread_id).await?;
        self.store_thread_update(thread_id, updated, false);
        Ok(())
    }

    fn store_thread_update(&self, thread_id: &str, updated: Option<Thread>, is_closed: bool) {
        let apply = |thread: &mut Thread| match &updated {
            Some(fresh) => {
                let issues = std::mem::take(&mut thread.issues);
                *thread = fresh.clone();
                if thread.issues.is_empty() {
                    thread.issues = issues;
                }
            }
            None => thread.is_closed = is_closed,
        };

        if let Some(thread) = lock(&self.threads).iter_mut().find(|t| t.id == thread_id) {
            apply(thread);
        }
        if let Some(view) = lock(&self.view).as_mut() {
            if view.thread_id == thread_id {
                if let Some(snapshot) = view.snapshot.as_mut() {
                    apply(snapshot);
                }
            }
        }
    }

    // ========== Thread view ==========

    /// Open a thread view: fetch the detail, then join the thread.
    ///
    /// Any other open view is left first. Returns [`Error::Cancelled`] if the
    /// view was left before the response arrived.
    pub async fn fetch_thread(&self, thread_id: &str) -> Result<Thread> {
        let cancel = self.begin_view(thread_id);

        let fetched = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(thread_id, "thread view left while loading");
                return Err(Error::Cancelled);
            }
            result = self.api.get_thread(thread_id) => result,
        };

        let thread = match fetched {
            Ok(thread) => thread,
            Err(e) => {
                let mut view = lock(&self.view);
                if view.as_ref().is_some_and(|v| v.is_current(thread_id)) {
                    *view = None;
                }
                return Err(e.into());
            }
        };

        {
            let mut view = lock(&self.view);
            match view.as_mut() {
                Some(v) if v.is_current(thread_id) => v.snapshot = Some(thread.clone()),
                _ => {
                    tracing::debug!(thread_id, "discarding stale thread snapshot");
                    return Err(Error::Cancelled);
                }
            }
        }

        self.sync
            .store()
            .dispatch(Action::ThreadOpened(thread_id.to_string()));
        self.sync.join_thread(thread_id);
        tracing::info!(thread_id, issues = thread.issues.len(), "thread view active");
        Ok(thread)
    }

    fn begin_view(&self, thread_id: &str) -> CancellationToken {
        let cancel = CancellationToken::new();
        let previous = lock(&self.view).replace(ThreadView {
            thread_id: thread_id.to_string(),
            cancel: cancel.clone(),
            snapshot: None,
        });
        if let Some(previous) = previous {
            previous.cancel.cancel();
            if previous.snapshot.is_some() {
                self.sync.leave_thread(&previous.thread_id);
            }
        }
        cancel
    }

    /// Leave the thread view: unsubscribe, cancel its in-flight fetch and
    /// forget the snapshot.
    pub fn leave_thread_view(&self, thread_id: &str) {
        self.sync.leave_thread(thread_id);
        let mut view = lock(&self.view);
        if view.as_ref().is_some_and(|v| v.thread_id == thread_id) {
            if let Some(v) = view.take() {
                v.cancel.cancel();
            }
        }
    }

    /// Send `join_thread` again for the active view, e.g. after a reconnect.
    pub fn resubscribe(&self) -> bool {
        let thread_id = match lock(&self.view).as_ref() {
            Some(v) if v.snapshot.is_some() && !v.cancel.is_cancelled() => v.thread_id.clone(),
            _ => return false,
        };
        self.sync.join_thread(&thread_id)
    }

    pub fn subscription(&self) -> Subscription {
        match lock(&self.view).as_ref() {
            None => Subscription::Unsubscribed,
            Some(v) if v.snapshot.is_none() => Subscription::Loading {
                thread_id: v.thread_id.clone(),
            },
            Some(v) => Subscription::Active {
                thread_id: v.thread_id.clone(),
            },
        }
    }

    /// Snapshot of the active thread, as fetched.
    pub fn current_thread(&self) -> Option<Thread> {
        lock(&self.view).as_ref().and_then(|v| v.snapshot.clone())
    }

    /// Issues of the active thread: snapshot overlaid with live state.
    pub fn current_issues(&self) -> Option<Vec<Issue>> {
        let thread = self.current_thread()?;
        Some(self.reconciled_issues(&thread))
    }

    /// Issues of a thread snapshot reconciled with live state.
    pub fn reconciled_issues(&self, snapshot: &Thread) -> Vec<Issue> {
        self.sync
            .store()
            .read(|state| reconcile_issues(&snapshot.issues, state.thread(&snapshot.id)))
    }

    // ========== Issues ==========

    /// Create an issue. Live state changes when the `issue_created` event
    /// arrives.
    pub async fn create_issue(&self, thread_id: &str, payload: &NewIssue) -> Result<Issue> {
        let issue = self.api.create_issue(thread_id, payload).await?;
        tracing::info!(thread_id, issue_id = %issue.id, "issue created");
        Ok(issue)
    }

    pub async fn allowed_statuses(&self, thread_id: &str, issue_id: &str) -> Result<Vec<IssueStatus>> {
        Ok(self.api.allowed_statuses(thread_id, issue_id).await?)
    }

    /// Request a status change over the socket.
    pub fn change_status(&self, issue_id: &str, status: IssueStatus) -> bool {
        self.sync.change_status(issue_id, status)
    }

    /// Change a status over REST. The returned issue is a server confirmation
    /// and is folded into live state.
    pub async fn change_status_via_rest(
        &self,
        thread_id: &str,
        issue_id: &str,
        status: IssueStatus,
    ) -> Result<Option<Issue>> {
        let issue = self.api.change_status(thread_id, issue_id, status).await?;
        if let Some(issue) = &issue {
            self.sync.store().dispatch(ServerEvent::issue_status_changed(
                thread_id,
                issue.id.as_str(),
                issue.status,
            ));
        }
        Ok(issue)
    }

    // ========== Messages ==========

    /// Post a message over the socket.
    pub fn send_message(&self, issue_id: &str, text: &str) -> bool {
        self.sync.send_message(issue_id, text)
    }

    /// Post a message over REST. The stored message is folded into live
    /// state; the socket broadcast of the same message is deduplicated.
    pub async fn send_message_via_rest(
        &self,
        thread_id: &str,
        issue_id: &str,
        text: &str,
    ) -> Result<Option<Message>> {
        let message = self.api.send_message(thread_id, issue_id, text).await?;
        if let Some(message) = &message {
            self.sync.store().dispatch(ServerEvent::new_message(
                thread_id,
                issue_id,
                message.clone(),
            ));
        }
        Ok(message)
    }

    /// Message history of an issue over REST.
    pub async fn issue_messages(&self, thread_id: &str, issue_id: &str) -> Result<Vec<Message>> {
        Ok(self.api.list_messages(thread_id, issue_id).await?)
    }

    /// Mark messages read over the socket.
    pub fn mark_read(&self, message_ids: Vec<String>) -> bool {
        self.sync.mark_read(message_ids)
    }

    pub async fn mark_read_via_rest(
        &self,
        thread_id: &str,
        issue_id: &str,
        message_ids: &[String],
    ) -> Result<()> {
        Ok(self
            .api
            .mark_messages_read(thread_id, issue_id, message_ids)
            .await?)
    }

    // ========== Notifications ==========

    /// Load notifications over REST. A failure is logged and leaves the
    /// current list as it was.
    pub async fn fetch_notifications(&self) -> Vec<Notification> {
        match self.api.list_notifications().await {
            Ok(snapshot) => {
                self.sync
                    .store()
                    .dispatch(Action::NotificationsLoaded(snapshot));
            }
            Err(e) => tracing::warn!(error = %e, "failed to fetch notifications"),
        }
        self.sync.notifications()
    }

    /// Mark everything read on the server, then locally.
    pub async fn mark_all_notifications_read(&self) -> Result<()> {
        self.api.mark_all_notifications_read().await?;
        self.sync.store().dispatch(Action::NotificationsMarkedRead);
        Ok(())
    }

    /// Remove one notification locally.
    pub fn dismiss_notification(&self, notification_id: &str) {
        self.sync
            .store()
            .dispatch(Action::NotificationDismissed(notification_id.to_string()));
    }

    /// Clear the list locally and tell the server everything was read.
    /// The server call's outcome is ignored.
    pub async fn dismiss_notifications(&self) {
        self.sync.store().dispatch(Action::ClearNotifications);
        if let Err(e) = self.api.mark_all_notifications_read().await {
            tracing::debug!(error = %e, "mark all read failed after dismiss");
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.sync.notifications()
    }

    pub fn unread_count(&self) -> usize {
        self.sync.unread_count()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
