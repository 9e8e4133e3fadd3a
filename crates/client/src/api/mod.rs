// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! REST access to threads, issues, messages and notifications.
//!
//! Every call carries `Authorization: Bearer <token>`. Failures surface as
//! [`ApiError::Status`] with the server's JSON body; a `204` is a success
//! without a value.

mod client;
mod issues;

pub use client::{ApiClient, ApiError, ApiResult, Listing, API_PREFIX};
pub use issues::{NewIssue, NewThread};
