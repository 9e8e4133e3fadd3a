// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! threadsync-core: Domain model for the realtime issue thread client.
//!
//! This crate holds everything that does not touch the network: the wire
//! protocol, the thread/issue/notification types, the event reducer, the
//! snapshot reconciliation and the reconnect backoff policy. The
//! `threadsync` crate drives these with real sockets and HTTP.

pub mod backoff;
pub mod error;
pub mod issue;
pub mod notification;
pub mod protocol;
pub mod reconcile;
pub mod state;
pub mod thread;

pub use backoff::Backoff;
pub use error::{Error, Result};
pub use issue::{Issue, IssueStatus};
pub use notification::Notification;
pub use protocol::{ClientMessage, ServerEvent};
pub use reconcile::reconcile_issues;
pub use state::{reduce, Action, SyncState, ThreadState};
pub use thread::{Message, Thread, Visibility};
