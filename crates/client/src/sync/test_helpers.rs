// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Channel-backed transport for sync tests.
//!
//! Each [`MockPeer`] registered on a [`MockConnector`] accepts exactly one
//! connect call; a connect with no registered peer fails. Connect attempts
//! are timestamped with tokio's clock so paused-time tests can check the
//! backoff schedule.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use threadsync_core::{ClientMessage, ServerEvent};
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::transport::{Connector, Transport, TransportError, TransportFuture};

/// Transport side of a mock peer.
struct PeerEnd {
    inbound: mpsc::UnboundedReceiver<Option<String>>,
    outbound: mpsc::UnboundedSender<ClientMessage>,
}

#[derive(Default)]
struct ConnectorState {
    peers: VecDeque<PeerEnd>,
    attempts: Vec<Instant>,
    urls: Vec<String>,
}

/// Connector handing out [`MockTransport`]s.
#[derive(Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<ConnectorState>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer that accepts the next connect.
    pub fn peer(&self) -> MockPeer {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        self.state.lock().unwrap().peers.push_back(PeerEnd {
            inbound: inbound_rx,
            outbound: outbound_tx,
        });
        MockPeer {
            inbound: inbound_tx,
            sent: outbound_rx,
        }
    }

    /// Times of every connect call, successful or not.
    pub fn attempts(&self) -> Vec<Instant> {
        self.state.lock().unwrap().attempts.clone()
    }

    /// URLs of every connect call.
    pub fn urls(&self) -> Vec<String> {
        self.state.lock().unwrap().urls.clone()
    }
}

impl Connector for MockConnector {
    type Transport = MockTransport;

    fn transport(&self) -> MockTransport {
        MockTransport {
            state: Arc::clone(&self.state),
            end: None,
        }
    }
}

/// Mock transport for testing without real sockets.
pub struct MockTransport {
    state: Arc<Mutex<ConnectorState>>,
    end: Option<PeerEnd>,
}

impl Transport for MockTransport {
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()> {
        let url = url.to_string();
        Box::pin(async move {
            let peer = {
                let mut state = self.state.lock().unwrap();
                state.attempts.push(Instant::now());
                state.urls.push(url);
                state.peers.pop_front()
            };
            match peer {
                Some(end) => {
                    self.end = Some(end);
                    Ok(())
                }
                None => Err(TransportError::Connect("connection refused".into())),
            }
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.end = None;
            Ok(())
        })
    }

    fn send(&mut self, msg: ClientMessage) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            let end = self.end.as_ref().ok_or(TransportError::Closed)?;
            end.outbound
                .send(msg)
                .map_err(|e| TransportError::Send(e.to_string()))
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<String>> {
        Box::pin(async move {
            let end = self.end.as_mut().ok_or(TransportError::Closed)?;
            match end.inbound.recv().await {
                Some(Some(text)) => Ok(Some(text)),
                Some(None) | None => {
                    self.end = None;
                    Ok(None)
                }
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.end.is_some()
    }
}

/// Server side of one mock connection.
pub struct MockPeer {
    inbound: mpsc::UnboundedSender<Option<String>>,
    sent: mpsc::UnboundedReceiver<ClientMessage>,
}

impl MockPeer {
    /// Push an event to the client.
    pub fn push(&self, event: ServerEvent) {
        self.push_raw(&event.to_json().unwrap());
    }

    /// Push a raw text frame to the client.
    pub fn push_raw(&self, text: &str) {
        let _ = self.inbound.send(Some(text.to_string()));
    }

    /// Close the connection from the server side.
    pub fn close(&self) {
        let _ = self.inbound.send(None);
    }

    /// Drain the commands received so far.
    pub fn sent(&mut self) -> Vec<ClientMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = self.sent.try_recv() {
            out.push(msg);
        }
        out
    }
}

/// Let spawned tasks run without advancing the clock.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
