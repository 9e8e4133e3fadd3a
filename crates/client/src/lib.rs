// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! threadsync - Realtime client for issue threads and notifications.
//!
//! This crate drives the `threadsync-core` domain model over the network:
//! a self-healing WebSocket connection that folds server events into a
//! shared state, a REST client for snapshots and fallbacks, and a session
//! that reconciles the two for the thread being viewed.
//!
//! # Main Components
//!
//! - [`SyncService`] - connection lifecycle, live state and socket commands
//! - [`ApiClient`] - REST access to threads, issues, messages and notifications
//! - [`IssuesSession`] - thread view, REST fallbacks and notification handling
//! - [`Config`] - endpoints and reconnect policy from `config.toml`
//!
//! ```rust,ignore
//! use threadsync::{ApiClient, Credentials, IssuesSession, SyncService};
//!
//! let credentials = Credentials::new(token);
//! let api = ApiClient::new("http://localhost:8001", credentials.clone(), None)?;
//! let sync = Arc::new(SyncService::new(ConnectionConfig::default(), credentials));
//! sync.connect();
//!
//! let session = IssuesSession::new(api, sync);
//! let thread = session.fetch_thread("t1").await?;
//! ```

mod cli;
mod commands;

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod session;
pub mod sync;

pub use api::{ApiClient, ApiError, NewIssue, NewThread};
pub use auth::Credentials;
pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{Error, Result};
pub use session::{IssuesSession, Subscription};
pub use sync::{ConnectionConfig, ConnectionStatus, SyncService};

/// Load the configuration and run one subcommand.
pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::discover(cli.config.as_deref())?;
    commands::run(config, cli.token, cli.command).await
}
