// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Realtime sync over the issues socket.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ SyncService │────►│ Connection  │────►│  Transport  │◄───► server
//! │  (facade)   │     │  Manager    │     │   (trait)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   │
//!        ▼                   ▼
//! ┌─────────────┐     ┌─────────────┐
//! │  Command    │     │ StateStore  │  (reducer + watch channel)
//! │  Sender     │     └─────────────┘
//! └─────────────┘
//! ```
//!
//! # Features
//!
//! - One authenticated WebSocket connection, token in the query string
//! - Bounded exponential backoff on unexpected close
//! - Fire-and-forget commands, dropped while disconnected
//! - Injectable transport trait for testing

mod commands;
mod connection;
mod service;
mod store;
mod transport;

pub use commands::CommandSender;
pub use connection::{
    ConnectionConfig, ConnectionManager, ConnectionStatus, SharedConnectionState, WEBSOCKET_ERROR,
};
pub use service::SyncService;
pub use store::StateStore;
pub use transport::{
    Connector, Transport, TransportError, TransportFuture, TransportResult, WebSocketConnector,
    WebSocketTransport,
};

#[cfg(test)]
pub(crate) mod test_helpers;

#[cfg(test)]
mod service_tests;
