// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Socket connection management.
//!
//! The [`ConnectionManager`] owns at most one live connection. Each session
//! runs in a background task that races cancellation, outbound commands and
//! inbound frames. When a session ends without a local shutdown, a reconnect
//! is scheduled with exponential backoff until the attempt ceiling is hit.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use threadsync_core::{Action, Backoff, ClientMessage, ServerEvent};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::commands::{CommandSender, OutboundSlot};
use super::store::StateStore;
use super::transport::{Connector, Transport};
use crate::auth::Credentials;

/// Connection state values for atomic state field.
pub const STATE_DISCONNECTED: u8 = 0;
pub const STATE_CONNECTING: u8 = 1;
pub const STATE_CONNECTED: u8 = 2;

/// Error recorded in the sync state when the transport fails.
pub const WEBSOCKET_ERROR: &str = "websocket error";

/// Connection state visible to the session task and to callers.
///
/// Uses atomic fields for lock-free reads.
pub struct SharedConnectionState {
    state: AtomicU8,
    /// Reconnects scheduled since the last successful open.
    attempt: AtomicU32,
}

impl SharedConnectionState {
    /// Create a new shared state initialized to disconnected.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(STATE_DISCONNECTED),
            attempt: AtomicU32::new(0),
        }
    }

    /// Get the current state.
    pub fn get(&self) -> u8 {
        self.state.load(Ordering::Acquire)
    }

    /// Set the state.
    pub fn set(&self, state: u8) {
        self.state.store(state, Ordering::Release);
    }

    /// Move from disconnected to connecting. Returns false if a connection
    /// is already open or opening.
    pub fn try_begin_connect(&self) -> bool {
        self.state
            .compare_exchange(
                STATE_DISCONNECTED,
                STATE_CONNECTING,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Get the current attempt count.
    pub fn attempt(&self) -> u32 {
        self.attempt.load(Ordering::Acquire)
    }

    /// Set the attempt count.
    pub fn set_attempt(&self, attempt: u32) {
        self.attempt.store(attempt, Ordering::Release);
    }

    /// Check if currently connected.
    pub fn is_connected(&self) -> bool {
        self.get() == STATE_CONNECTED
    }

    /// Check if currently connecting.
    pub fn is_connecting(&self) -> bool {
        self.get() == STATE_CONNECTING
    }

    /// Current lifecycle state.
    pub fn status(&self) -> ConnectionStatus {
        match self.get() {
            STATE_CONNECTING => ConnectionStatus::Connecting,
            STATE_CONNECTED => ConnectionStatus::Connected,
            _ => ConnectionStatus::Disconnected,
        }
    }

    /// Get a human-readable status string.
    pub fn status_string(&self) -> String {
        match self.status() {
            ConnectionStatus::Connecting if self.attempt() > 0 => {
                format!("connecting (attempt {})", self.attempt())
            }
            status => status.to_string(),
        }
    }
}

impl Default for SharedConnectionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle of the socket connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
        };
        write!(f, "{}", s)
    }
}

/// Configuration for the connection manager.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Socket endpoint, without the token.
    pub url: String,
    /// Reconnect policy.
    pub backoff: Backoff,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8001/ws/issues/".to_string(),
            backoff: Backoff::default(),
        }
    }
}

/// Append the access token to the endpoint as a query parameter.
pub(crate) fn endpoint_url(base: &str, token: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut().append_pair("token", token);
    Ok(url.into())
}

/// Owns the socket connection and its reconnect schedule.
pub struct ConnectionManager<C: Connector> {
    config: ConnectionConfig,
    connector: C,
    credentials: Credentials,
    shared_state: Arc<SharedConnectionState>,
    store: StateStore,
    outbound: OutboundSlot,
    /// Set by [`shutdown`](Self::shutdown); suppresses reconnects.
    manual_close: AtomicBool,
    /// Cancels the live session and any pending reconnect timer.
    cancel_token: Mutex<CancellationToken>,
    /// Id of the session allowed to publish lifecycle changes. Bumped by
    /// every open and by shutdown; a session whose id is stale only tears
    /// down its own socket.
    session: Mutex<u64>,
    /// Pending reconnect timer, cancelled when another open starts.
    retry: Mutex<Option<CancellationToken>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<C: Connector> ConnectionManager<C> {
    /// Create a manager. Nothing is opened until [`connect`](Self::connect).
    pub fn new(
        config: ConnectionConfig,
        connector: C,
        credentials: Credentials,
        store: StateStore,
    ) -> Self {
        Self {
            config,
            connector,
            credentials,
            shared_state: Arc::new(SharedConnectionState::new()),
            store,
            outbound: Arc::new(Mutex::new(None)),
            manual_close: AtomicBool::new(false),
            cancel_token: Mutex::new(CancellationToken::new()),
            session: Mutex::new(0),
            retry: Mutex::new(None),
        }
    }

    /// Lifecycle state shared with the session task.
    pub fn shared_state(&self) -> &Arc<SharedConnectionState> {
        &self.shared_state
    }

    /// Command sender bound to this manager's connection.
    pub fn commands(&self) -> CommandSender {
        CommandSender::new(Arc::clone(&self.outbound))
    }

    /// Open the connection if none is open or opening.
    ///
    /// Returns immediately; the session runs in a background task. Without
    /// an access token this does nothing. A connection that is still
    /// closing after [`shutdown`](Self::shutdown) does not block a new one.
    pub fn connect(self: &Arc<Self>) {
        self.manual_close.store(false, Ordering::Release);
        let cancel = self.session_token();
        self.open(cancel);
    }

    /// Reset the attempt counter and connect, even after reconnects were
    /// exhausted. A pending reconnect timer is dropped.
    pub fn reconnect(self: &Arc<Self>) {
        self.shared_state.set_attempt(0);
        self.connect();
    }

    /// Close the connection and cancel any pending reconnect.
    ///
    /// The live session keeps running until it has flushed queued commands
    /// and closed its socket, but it no longer counts as open.
    pub fn shutdown(&self) {
        self.manual_close.store(true, Ordering::Release);
        lock(&self.cancel_token).cancel();
        {
            let mut session = lock(&self.session);
            *session += 1;
            self.shared_state.set(STATE_DISCONNECTED);
            lock(&self.outbound).take();
        }
        tracing::debug!("connection shut down");
    }

    /// Token for a new session, replacing one cancelled by a prior shutdown.
    fn session_token(&self) -> CancellationToken {
        let mut token = lock(&self.cancel_token);
        if token.is_cancelled() {
            *token = CancellationToken::new();
        }
        token.clone()
    }

    fn cancel_retry(&self) {
        if let Some(timer) = lock(&self.retry).take() {
            timer.cancel();
        }
    }

    fn open(self: &Arc<Self>, cancel: CancellationToken) {
        if cancel.is_cancelled() {
            return;
        }
        let Some(token) = self.credentials.access_token() else {
            tracing::debug!("no access token, not connecting");
            return;
        };
        if !self.shared_state.try_begin_connect() {
            tracing::trace!("connection already open or opening");
            return;
        }
        self.cancel_retry();
        let id = {
            let mut session = lock(&self.session);
            *session += 1;
            *session
        };
        let url = match endpoint_url(&self.config.url, &token) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(url = %self.config.url, error = %e, "invalid socket url");
                self.shared_state.set(STATE_DISCONNECTED);
                self.store.dispatch(Action::TransportError(e.to_string()));
                return;
            }
        };

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            manager.run_session(id, url, cancel).await;
        });
    }

    async fn run_session(self: Arc<Self>, id: u64, url: String, cancel: CancellationToken) {
        let mut transport = self.connector.transport();

        let connect_result = tokio::select! {
            _ = cancel.cancelled() => {
                self.finish_session(id, &cancel, None);
                return;
            }
            result = transport.connect(&url) => result,
        };

        if let Err(e) = connect_result {
            tracing::warn!(error = %e, attempt = self.shared_state.attempt(), "socket connect failed");
            self.finish_session(id, &cancel, Some(WEBSOCKET_ERROR));
            return;
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<ClientMessage>();
        let current = {
            let session = lock(&self.session);
            if *session == id {
                *lock(&self.outbound) = Some(tx);
                self.shared_state.set_attempt(0);
                self.shared_state.set(STATE_CONNECTED);
                self.store.dispatch(Action::Connected);
            }
            *session == id
        };
        if !current {
            tracing::debug!("session superseded while opening");
            let _ = transport.disconnect().await;
            return;
        }
        tracing::info!("socket connected");

        let mut error = None;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    // Commands issued before the shutdown still go out.
                    while let Ok(msg) = rx.try_recv() {
                        if transport.send(msg).await.is_err() {
                            break;
                        }
                    }
                    let _ = transport.disconnect().await;
                    break;
                }

                Some(msg) = rx.recv() => {
                    tracing::trace!(action = msg.action(), "sending command");
                    if let Err(e) = transport.send(msg).await {
                        tracing::warn!(error = %e, "socket send failed");
                        error = Some(WEBSOCKET_ERROR);
                        break;
                    }
                }

                frame = transport.recv() => match frame {
                    Ok(Some(text)) => self.handle_frame(&text),
                    Ok(None) => {
                        tracing::info!("socket closed by server");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "socket receive failed");
                        error = Some(WEBSOCKET_ERROR);
                        break;
                    }
                },
            }
        }

        self.finish_session(id, &cancel, error);
    }

    fn handle_frame(&self, text: &str) {
        match ServerEvent::from_json(text) {
            Ok(event) => {
                tracing::debug!(kind = event.kind(), "event received");
                self.store.dispatch(event);
            }
            Err(e) => tracing::debug!(error = %e, "ignoring undecodable frame"),
        }
    }

    /// Publish the end of session `id` and schedule a reconnect if it was
    /// neither shut down nor superseded.
    fn finish_session(self: &Arc<Self>, id: u64, cancel: &CancellationToken, error: Option<&str>) {
        let current = {
            let session = lock(&self.session);
            if *session == id {
                lock(&self.outbound).take();
                if let Some(error) = error {
                    self.store.dispatch(Action::TransportError(error.to_string()));
                }
                self.shared_state.set(STATE_DISCONNECTED);
                self.store.dispatch(Action::Disconnected);
                true
            } else {
                // A newer session that already opened owns the connected flag.
                if !self.shared_state.is_connected() {
                    self.store.dispatch(Action::Disconnected);
                }
                false
            }
        };

        if !current || self.manual_close.load(Ordering::Acquire) || cancel.is_cancelled() {
            tracing::debug!("closed locally, not reconnecting");
            return;
        }
        self.schedule_reconnect(cancel);
    }

    fn schedule_reconnect(self: &Arc<Self>, cancel: &CancellationToken) {
        let attempt = self.shared_state.attempt();
        let Some(delay) = self.config.backoff.next_delay(attempt) else {
            tracing::warn!(attempts = attempt, "giving up reconnecting");
            return;
        };
        let attempt = attempt.saturating_add(1);
        self.shared_state.set_attempt(attempt);
        tracing::info!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            "scheduling reconnect"
        );

        let timer = cancel.child_token();
        if let Some(previous) = lock(&self.retry).replace(timer.clone()) {
            previous.cancel();
        }
        let cancel = cancel.clone();
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = timer.cancelled() => {}
                _ = tokio::time::sleep(delay) => manager.open(cancel),
            }
        });
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
