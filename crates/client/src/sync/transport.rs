// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Socket transport seam.
//!
//! The connection manager only talks to a [`Transport`]; production uses
//! [`WebSocketTransport`], tests plug in channel-backed doubles through a
//! [`Connector`]. Inbound frames come back as raw text so that a frame the
//! client does not understand is skipped rather than fatal.

use std::future::Future;
use std::pin::Pin;

use futures_util::{SinkExt, StreamExt};
use threadsync_core::ClientMessage;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as Frame;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// Failure of a single socket operation.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("could not open socket: {0}")]
    Connect(String),

    /// No socket is open, or the peer closed it.
    #[error("socket closed")]
    Closed,

    #[error("could not send frame: {0}")]
    Send(String),

    #[error("could not read frame: {0}")]
    Receive(String),

    #[error("could not encode command: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Boxed future returned by transport methods.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = TransportResult<T>> + Send + 'a>>;

/// One socket, opened at most once.
pub trait Transport: Send + Sync {
    /// Open the socket. The URL already carries the access token.
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()>;

    /// Close the socket. Closing an unopened transport succeeds.
    fn disconnect(&mut self) -> TransportFuture<'_, ()>;

    /// Encode and write one command frame.
    fn send(&mut self, msg: ClientMessage) -> TransportFuture<'_, ()>;

    /// Next text frame, or `None` once the peer has closed the socket.
    fn recv(&mut self) -> TransportFuture<'_, Option<String>>;

    fn is_connected(&self) -> bool;
}

/// Factory for fresh transports, one per connection attempt.
pub trait Connector: Send + Sync + 'static {
    type Transport: Transport + 'static;

    /// Create an unconnected transport.
    fn transport(&self) -> Self::Transport;
}

/// Connector producing [`WebSocketTransport`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl Connector for WebSocketConnector {
    type Transport = WebSocketTransport;

    fn transport(&self) -> WebSocketTransport {
        WebSocketTransport::new()
    }
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// [`Transport`] over tokio-tungstenite, for `ws://` and `wss://` (rustls).
#[derive(Default)]
pub struct WebSocketTransport {
    socket: Option<Socket>,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn socket(&mut self) -> TransportResult<&mut Socket> {
        self.socket.as_mut().ok_or(TransportError::Closed)
    }
}

impl Transport for WebSocketTransport {
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()> {
        let url = url.to_owned();
        Box::pin(async move {
            let (socket, response) = tokio_tungstenite::connect_async(url)
                .await
                .map_err(|e| TransportError::Connect(e.to_string()))?;
            tracing::trace!(status = %response.status(), "socket handshake complete");
            self.socket = Some(socket);
            Ok(())
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if let Some(mut socket) = self.socket.take() {
                // Peer may already be gone.
                let _ = socket.close(None).await;
            }
            Ok(())
        })
    }

    fn send(&mut self, msg: ClientMessage) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            let frame = Frame::text(msg.to_json()?);
            let result = self.socket()?.send(frame).await;
            result.map_err(|e| {
                self.socket = None;
                TransportError::Send(e.to_string())
            })
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<String>> {
        Box::pin(async move {
            loop {
                let next = self.socket()?.next().await;
                let frame = match next {
                    Some(Ok(frame)) => frame,
                    Some(Err(e)) => {
                        self.socket = None;
                        return Err(TransportError::Receive(e.to_string()));
                    }
                    None => {
                        self.socket = None;
                        return Ok(None);
                    }
                };
                match frame {
                    Frame::Text(text) => return Ok(Some(text.as_str().to_owned())),
                    Frame::Close(reason) => {
                        tracing::debug!(?reason, "close frame received");
                        self.socket = None;
                        return Ok(None);
                    }
                    // tungstenite answers pings itself; the protocol has no binary frames.
                    _ => {}
                }
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.socket.is_some()
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
