// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Merge of a REST snapshot with live event-sourced state.
//!
//! REST responses and socket events interleave without a total order, so
//! the merge is an overlay that gives the same result whichever arrived
//! first.

use std::collections::HashSet;

use crate::issue::Issue;
use crate::state::ThreadState;

/// Build the issue list displayed for a thread.
///
/// Snapshot issues come first in snapshot order, with the live status
/// overlaid when one was observed. Live issues absent from the snapshot
/// (created after the fetch) are appended in arrival order. Ids are unique
/// in the result.
pub fn reconcile_issues(snapshot: &[Issue], live: Option<&ThreadState>) -> Vec<Issue> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(snapshot.len());
    let mut merged = Vec::with_capacity(snapshot.len());

    for issue in snapshot {
        if !seen.insert(issue.id.as_str()) {
            continue;
        }
        let status = live
            .and_then(|thread| thread.live_status(&issue.id))
            .unwrap_or(issue.status);
        merged.push(issue.clone().with_status(status));
    }

    if let Some(thread) = live {
        for issue in &thread.issues {
            if seen.insert(issue.id.as_str()) {
                merged.push(issue.clone());
            }
        }
    }

    merged
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
