// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared access credential.
//!
//! Storage and refresh of tokens belong to the login flow; this handle only
//! carries the current value to the socket (query parameter) and the REST
//! client (bearer header). Clones share the same slot.

use std::sync::{Arc, PoisonError, RwLock};

/// Cloneable handle on the current access token.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    token: Arc<RwLock<Option<String>>>,
}

impl Credentials {
    /// Create credentials holding the given token.
    pub fn new(token: impl Into<String>) -> Self {
        let credentials = Self::default();
        credentials.set(token);
        credentials
    }

    /// Create credentials with no token (signed out).
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Current access token, if signed in. Empty tokens count as absent.
    pub fn access_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|t| !t.is_empty())
    }

    /// Replace the access token.
    pub fn set(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    /// Forget the access token (logout).
    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Check if a token is present.
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_token() {
        let credentials = Credentials::anonymous();
        let shared = credentials.clone();
        assert!(!shared.is_authenticated());

        credentials.set("abc");
        assert_eq!(shared.access_token().as_deref(), Some("abc"));

        shared.clear();
        assert!(credentials.access_token().is_none());
    }

    #[test]
    fn empty_token_is_absent() {
        assert!(!Credentials::new("").is_authenticated());
    }
}
