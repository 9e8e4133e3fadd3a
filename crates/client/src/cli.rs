// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use threadsync_core::IssueStatus;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

fn issue_status(s: &str) -> Result<IssueStatus, String> {
    s.parse().map_err(|e: threadsync_core::Error| e.to_string())
}

#[derive(Parser, Debug)]
#[command(name = "threadsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Realtime client for issue threads and notifications")]
pub struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Access token for the API and the socket
    #[arg(long, global = true, env = "THREADSYNC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stay connected and log live events until interrupted
    Watch {
        /// Join this thread once connected
        #[arg(long, value_name = "ID")]
        thread: Option<String>,
    },

    /// List threads
    Threads {
        /// Only threads attached to this product
        #[arg(long, value_name = "ID")]
        product: Option<String>,
    },

    /// Show a thread with its issues
    Thread {
        /// Thread ID
        #[arg(value_parser = non_empty_string)]
        id: String,
    },

    /// List notifications
    Notifications {
        /// Mark all notifications read afterwards
        #[arg(long)]
        mark_read: bool,
    },

    /// Post a message on an issue
    Send {
        /// Issue ID
        #[arg(value_parser = non_empty_string)]
        issue: String,

        /// Message text
        #[arg(value_parser = non_empty_string)]
        text: String,

        /// Post over REST within this thread instead of the socket
        #[arg(long, value_name = "ID")]
        thread: Option<String>,
    },

    /// Change the status of an issue
    Status {
        /// Issue ID
        #[arg(value_parser = non_empty_string)]
        issue: String,

        /// Target status (open, in_progress, resolved, verified, rejected)
        #[arg(value_parser = issue_status)]
        status: IssueStatus,

        /// Change over REST within this thread instead of the socket
        #[arg(long, value_name = "ID")]
        thread: Option<String>,
    },
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
