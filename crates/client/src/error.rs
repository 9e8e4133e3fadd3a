// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::api::ApiError;
use crate::sync::TransportError;

/// All possible errors surfaced by the threadsync library.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Core(#[from] threadsync_core::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not authenticated\n  hint: pass --token or set THREADSYNC_TOKEN")]
    NotAuthenticated,

    #[error("request cancelled: the thread view was left before the response arrived")]
    Cancelled,

    #[error("not connected to {0}\n  hint: check ws_url in the config file")]
    NotConnected(String),

    #[error("status '{status}' is not allowed for this issue\n  hint: allowed statuses are: {allowed}")]
    StatusNotAllowed { status: String, allowed: String },
}

/// A specialized Result type for threadsync operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
