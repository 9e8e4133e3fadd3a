// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the issues REST API.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::auth::Credentials;

/// Path of the issues API below the configured origin.
pub const API_PREFIX: &str = "api/v1/issues";

/// Error type for REST calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx response. `body` is the server's JSON object, or empty when the
    /// body was not a JSON object.
    #[error("request failed with status {status}{}", detail_suffix(.body))]
    Status {
        status: u16,
        body: Map<String, Value>,
    },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A response body was required but the server sent none.
    #[error("response has no body")]
    MissingBody,
}

fn detail_suffix(body: &Map<String, Value>) -> String {
    match body.get("detail").and_then(Value::as_str) {
        Some(detail) => format!(": {}", detail),
        None => String::new(),
    }
}

impl ApiError {
    /// HTTP status of a rejected request.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Server-provided `detail` message, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { body, .. } => body.get("detail").and_then(Value::as_str),
            _ => None,
        }
    }
}

/// Result type for REST calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// List payload: either a paginated envelope or a bare array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page { results: Vec<T> },
    Items(Vec<T>),
}

impl<T> Listing<T> {
    /// The listed items, whatever the envelope.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Page { results } => results,
            Listing::Items(items) => items,
        }
    }
}

/// Authenticated JSON client rooted at the issues API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl ApiClient {
    /// Create a client for the given origin (e.g. `http://localhost:8001`).
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        timeout: Option<Duration>,
    ) -> ApiResult<Self> {
        url::Url::parse(base_url)?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: format!("{}/{}", base_url.trim_end_matches('/'), API_PREFIX),
            credentials,
        })
    }

    /// Credentials used for the bearer header.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build authorization header value
    fn auth_header(&self) -> Option<String> {
        self.credentials
            .access_token()
            .map(|t| format!("Bearer {}", t))
    }

    fn authorized(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }
        request
    }

    /// GET a JSON resource.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ApiResult<T> {
        let request = self.authorized(self.client.get(self.url(path)).query(query));
        tracing::debug!(path, "GET");
        Self::send(request).await?.ok_or(ApiError::MissingBody)
    }

    /// POST a JSON body. Returns `None` for an empty (e.g. 204) response.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<Option<T>> {
        let request = self.authorized(self.client.post(self.url(path)).json(body));
        tracing::debug!(path, "POST");
        Self::send(request).await
    }

    /// POST without a body. Returns `None` for an empty (e.g. 204) response.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Option<T>> {
        let request = self.authorized(self.client.post(self.url(path)));
        tracing::debug!(path, "POST");
        Self::send(request).await
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> ApiResult<Option<T>> {
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> ApiResult<Option<T>> {
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body = match serde_json::from_slice::<Value>(&bytes) {
                Ok(Value::Object(map)) => map,
                _ => Map::new(),
            };
            tracing::debug!(status = status.as_u16(), "request rejected");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if bytes.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(ApiError::Decode)
    }
}
