// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Subcommand implementations.

use std::sync::Arc;
use std::time::Duration;

use threadsync_core::{IssueStatus, Notification, SyncState, Thread};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::auth::Credentials;
use crate::cli::Command;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::session::IssuesSession;
use crate::sync::{ConnectionConfig, SyncService};

/// How long one-shot socket commands wait for the connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything a subcommand needs, wired from config and credentials.
struct Context {
    config: Config,
    session: IssuesSession,
}

impl Context {
    fn new(config: Config, credentials: Credentials) -> Result<Self> {
        let api = ApiClient::new(
            &config.api_base_url,
            credentials.clone(),
            config.request_timeout(),
        )?;
        let sync = Arc::new(SyncService::new(
            ConnectionConfig {
                url: config.ws_url.clone(),
                backoff: config.backoff(),
            },
            credentials,
        ));
        Ok(Context {
            session: IssuesSession::new(api, sync),
            config,
        })
    }

    fn sync(&self) -> &SyncService {
        self.session.sync()
    }

    /// Open the socket and wait until it is up.
    async fn connect(&self) -> Result<()> {
        self.sync().connect();
        let mut rx = self.sync().subscribe();
        let connected = matches!(
            tokio::time::timeout(CONNECT_TIMEOUT, rx.wait_for(|s| s.connected)).await,
            Ok(Ok(_))
        );
        if !connected {
            return Err(Error::NotConnected(self.config.ws_url.clone()));
        }
        Ok(())
    }
}

/// Run one subcommand to completion.
pub async fn run(config: Config, token: Option<String>, command: Command) -> Result<()> {
    let token = token
        .filter(|t| !t.trim().is_empty())
        .ok_or(Error::NotAuthenticated)?;
    let ctx = Context::new(config, Credentials::new(token))?;

    match command {
        Command::Watch { thread } => watch(&ctx, thread).await,
        Command::Threads { product } => threads(&ctx, product).await,
        Command::Thread { id } => thread(&ctx, &id).await,
        Command::Notifications { mark_read } => notifications(&ctx, mark_read).await,
        Command::Send {
            issue,
            text,
            thread,
        } => send(&ctx, &issue, &text, thread).await,
        Command::Status {
            issue,
            status: target,
            thread,
        } => status(&ctx, &issue, target, thread).await,
    }
}

async fn watch(ctx: &Context, thread_id: Option<String>) -> Result<()> {
    if let Some(id) = &thread_id {
        let thread = ctx.session.fetch_thread(id).await?;
        info!(thread_id = %thread.id, title = %thread.title, "watching thread");
    }
    ctx.session.fetch_notifications().await;

    let mut rx = ctx.sync().subscribe();
    let mut previous = rx.borrow_and_update().clone();
    ctx.sync().connect();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                if state.connected && !previous.connected {
                    info!(url = %ctx.config.ws_url, "connected");
                    ctx.session.resubscribe();
                } else if !state.connected && previous.connected {
                    warn!(
                        attempts = ctx.sync().reconnect_attempts(),
                        "disconnected"
                    );
                }
                log_changes(&previous, &state);
                previous = state;
            }
        }
    }

    ctx.sync().close().await;
    Ok(())
}

/// Log what a state transition added.
fn log_changes(before: &SyncState, after: &SyncState) {
    if after.error.is_some() && after.error != before.error {
        warn!(error = after.error.as_deref().unwrap_or_default(), "sync error");
    }

    for n in after
        .notifications
        .iter()
        .filter(|n| !before.notifications.iter().any(|b| b.id == n.id))
    {
        info!(id = %n.id, kind = %n.notification_type, "notification");
    }

    for (thread_id, thread) in &after.threads {
        let old = before.thread(thread_id);
        for m in thread
            .messages
            .iter()
            .filter(|m| !old.is_some_and(|o| o.messages.iter().any(|x| x.id == m.id)))
        {
            info!(
                thread_id = %thread_id,
                issue_id = m.issue_id.as_deref().unwrap_or("-"),
                author = m.author_name.as_deref().unwrap_or("-"),
                "{}",
                m.text
            );
        }
        for issue in thread
            .issues
            .iter()
            .filter(|i| !old.is_some_and(|o| o.issue(&i.id).is_some()))
        {
            info!(thread_id = %thread_id, issue_id = %issue.id, title = %issue.title, "issue created");
        }
        for (issue_id, status) in &thread.status_updates {
            if old.and_then(|o| o.status_updates.get(issue_id)) != Some(status) {
                info!(thread_id = %thread_id, issue_id = %issue_id, %status, "status changed");
            }
        }
    }
}

async fn threads(ctx: &Context, product: Option<String>) -> Result<()> {
    let threads = ctx.session.fetch_threads(product.as_deref()).await?;
    if threads.is_empty() {
        println!("No threads");
    }
    for t in &threads {
        println!("{}", format_thread_line(t));
    }
    Ok(())
}

async fn thread(ctx: &Context, id: &str) -> Result<()> {
    let thread = ctx.session.fetch_thread(id).await?;
    println!("{}", format_thread_line(&thread));
    let issues = ctx.session.reconciled_issues(&thread);
    for issue in &issues {
        println!("  #{} [{}] {}", issue.number, issue.status, issue.title);
    }
    Ok(())
}

async fn notifications(ctx: &Context, mark_read: bool) -> Result<()> {
    let list = ctx.session.fetch_notifications().await;
    if list.is_empty() {
        println!("No notifications");
    }
    for n in &list {
        println!("{}", format_notification_line(n));
    }
    if mark_read && !list.is_empty() {
        ctx.session.mark_all_notifications_read().await?;
        println!("Marked {} notification(s) read", list.len());
    }
    Ok(())
}

async fn send(ctx: &Context, issue_id: &str, text: &str, thread_id: Option<String>) -> Result<()> {
    if let Some(thread_id) = thread_id {
        let message = ctx
            .session
            .send_message_via_rest(&thread_id, issue_id, text)
            .await?;
        match message {
            Some(m) => println!("Sent message {}", m.id),
            None => println!("Sent message"),
        }
        return Ok(());
    }

    ctx.connect().await?;
    let sent = ctx.session.send_message(issue_id, text);
    ctx.sync().close().await;
    if !sent {
        return Err(Error::NotConnected(ctx.config.ws_url.clone()));
    }
    println!("Sent message");
    Ok(())
}

async fn status(
    ctx: &Context,
    issue_id: &str,
    status: IssueStatus,
    thread_id: Option<String>,
) -> Result<()> {
    if let Some(thread_id) = thread_id {
        let allowed = ctx.session.allowed_statuses(&thread_id, issue_id).await?;
        if !allowed.contains(&status) {
            return Err(Error::StatusNotAllowed {
                status: status.to_string(),
                allowed: format_statuses(&allowed),
            });
        }
        ctx.session
            .change_status_via_rest(&thread_id, issue_id, status)
            .await?;
        println!("Changed {} to {}", issue_id, status);
        return Ok(());
    }

    ctx.connect().await?;
    let sent = ctx.session.change_status(issue_id, status);
    ctx.sync().close().await;
    if !sent {
        return Err(Error::NotConnected(ctx.config.ws_url.clone()));
    }
    println!("Requested {} -> {}", issue_id, status);
    Ok(())
}

pub(crate) fn format_thread_line(thread: &Thread) -> String {
    let closed = if thread.is_closed { " (closed)" } else { "" };
    format!(
        "{}  {}{}  [{} issue(s)]",
        thread.id,
        thread.title,
        closed,
        thread.issues.len()
    )
}

pub(crate) fn format_notification_line(n: &Notification) -> String {
    let marker = if n.is_delivered { " " } else { "*" };
    match &n.thread_id {
        Some(thread_id) => format!("{} {}  {}  thread {}", marker, n.id, n.notification_type, thread_id),
        None => format!("{} {}  {}", marker, n.id, n.notification_type),
    }
}

pub(crate) fn format_statuses(statuses: &[IssueStatus]) -> String {
    if statuses.is_empty() {
        return "none".to_string();
    }
    statuses
        .iter()
        .map(IssueStatus::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
