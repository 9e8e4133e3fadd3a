// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reconnect backoff policy.
//!
//! The delay before reconnect number `attempt` (zero-based) is
//! `min(base × 2^attempt, max)`. Once `max_attempts` reconnects have been
//! scheduled without a successful open in between, no further delay is
//! produced and automatic recovery stops.

use std::time::Duration;

/// Exponential backoff with a hard attempt ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Delay before the first reconnect.
    pub base: Duration,
    /// Upper bound for any single delay.
    pub max: Duration,
    /// Number of reconnects scheduled before giving up.
    pub max_attempts: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff {
            base: Duration::from_millis(1000),
            max: Duration::from_millis(30_000),
            max_attempts: 5,
        }
    }
}

impl Backoff {
    /// Creates a policy from millisecond values.
    pub fn from_millis(base_ms: u64, max_ms: u64, max_attempts: u32) -> Self {
        Backoff {
            base: Duration::from_millis(base_ms),
            max: Duration::from_millis(max_ms),
            max_attempts,
        }
    }

    /// Uncapped-by-ceiling delay for the given zero-based attempt.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base
            .checked_mul(factor)
            .map_or(self.max, |d| d.min(self.max))
    }

    /// Delay for the given attempt, or `None` once the ceiling is reached.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            None
        } else {
            Some(self.delay(attempt))
        }
    }

    /// Returns true when no more reconnects will be scheduled.
    pub fn is_exhausted(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
