// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Observable sync state.
//!
//! Every writer goes through [`StateStore::dispatch`], which folds one action
//! with the reducer and wakes subscribers only if something changed.

use std::sync::Arc;

use threadsync_core::{Action, SyncState};
use tokio::sync::watch;

/// Shared handle on the reducer-owned state.
#[derive(Debug, Clone)]
pub struct StateStore {
    tx: Arc<watch::Sender<SyncState>>,
}

impl StateStore {
    /// Create a store holding the empty state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SyncState::default());
        StateStore { tx: Arc::new(tx) }
    }

    /// Apply an action. Returns true if subscribers were notified.
    pub fn dispatch(&self, action: impl Into<Action>) -> bool {
        let action = action.into();
        tracing::trace!(?action, "dispatch");
        self.tx.send_if_modified(|state| state.apply(action))
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> SyncState {
        self.tx.borrow().clone()
    }

    /// Read the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&SyncState) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Receiver woken on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.tx.subscribe()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
