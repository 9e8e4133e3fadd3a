// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Synchronization facade.
//!
//! [`SyncService`] is created once per signed-in session and handed to
//! whatever needs live data. Dropping it shuts the connection down.

use std::sync::Arc;

use threadsync_core::{IssueStatus, Notification, SyncState, ThreadState};
use tokio::sync::watch;

use super::commands::CommandSender;
use super::connection::{ConnectionConfig, ConnectionManager, ConnectionStatus};
use super::store::StateStore;
use super::transport::{Connector, WebSocketConnector};
use crate::auth::Credentials;

/// Public surface of the realtime core: connection lifecycle, live state
/// and user commands.
pub struct SyncService<C: Connector = WebSocketConnector> {
    manager: Arc<ConnectionManager<C>>,
    commands: CommandSender,
    store: StateStore,
}

impl SyncService<WebSocketConnector> {
    /// Create a service that talks to a real WebSocket endpoint.
    pub fn new(config: ConnectionConfig, credentials: Credentials) -> Self {
        Self::with_connector(config, WebSocketConnector, credentials)
    }
}

impl<C: Connector> SyncService<C> {
    /// Create a service over a custom connector.
    pub fn with_connector(config: ConnectionConfig, connector: C, credentials: Credentials) -> Self {
        let store = StateStore::new();
        let manager = Arc::new(ConnectionManager::new(
            config,
            connector,
            credentials,
            store.clone(),
        ));
        let commands = manager.commands();
        SyncService {
            manager,
            commands,
            store,
        }
    }

    /// Open the socket unless it is open or opening.
    pub fn connect(&self) {
        self.manager.connect();
    }

    /// Start over after automatic reconnects were exhausted.
    pub fn reconnect(&self) {
        self.manager.reconnect();
    }

    /// Close the socket for good; no reconnect follows.
    pub fn shutdown(&self) {
        self.manager.shutdown();
    }

    /// Shut down and wait until the session task has closed the socket.
    pub async fn close(&self) {
        self.manager.shutdown();
        let mut rx = self.store.subscribe();
        let _ = rx.wait_for(|state| !state.connected).await;
    }

    pub fn status(&self) -> ConnectionStatus {
        self.manager.shared_state().status()
    }

    pub fn status_string(&self) -> String {
        self.manager.shared_state().status_string()
    }

    pub fn is_connected(&self) -> bool {
        self.manager.shared_state().is_connected()
    }

    /// Reconnects scheduled since the last successful open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.manager.shared_state().attempt()
    }

    /// Snapshot of the live state.
    pub fn state(&self) -> SyncState {
        self.store.snapshot()
    }

    /// Live data of one thread.
    pub fn thread(&self, thread_id: &str) -> Option<ThreadState> {
        self.store.read(|s| s.thread(thread_id).cloned())
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.store.read(|s| s.notifications.clone())
    }

    pub fn unread_count(&self) -> usize {
        self.store.read(SyncState::unread_count)
    }

    pub fn error(&self) -> Option<String> {
        self.store.read(|s| s.error.clone())
    }

    /// Receiver woken on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.store.subscribe()
    }

    /// Store shared with the connection, for folding REST confirmations.
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn commands(&self) -> &CommandSender {
        &self.commands
    }

    pub fn join_thread(&self, thread_id: &str) -> bool {
        self.commands.join_thread(thread_id)
    }

    pub fn leave_thread(&self, thread_id: &str) -> bool {
        self.commands.leave_thread(thread_id)
    }

    pub fn send_message(&self, issue_id: &str, text: &str) -> bool {
        self.commands.send_message(issue_id, text)
    }

    pub fn change_status(&self, issue_id: &str, status: IssueStatus) -> bool {
        self.commands.change_status(issue_id, status)
    }

    pub fn mark_read(&self, message_ids: Vec<String>) -> bool {
        self.commands.mark_read(message_ids)
    }
}

impl<C: Connector> Drop for SyncService<C> {
    fn drop(&mut self) {
        self.manager.shutdown();
    }
}
