//! CLI command definitions for the `imarc` binary.
//!
//! Uses clap derive macros for argument parsing. Every command is read-only
//! against the Messages store.

pub mod chat;
pub mod message;
pub mod schema;
pub mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Browse and search an Apple Messages archive.
#[derive(Parser)]
#[command(name = "imarc", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a chat.db file. Defaults to the configured path, then
    /// ~/Library/Messages/chat.db.
    #[arg(long, global = true, env = "IMARCHIVE_DB")]
    pub db: Option<PathBuf>,

    /// Export tracing spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List conversations, most recent first.
    #[command(alias = "ls")]
    Chats {
        /// Maximum chats to show.
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show a page of a conversation.
    Messages {
        /// Chat id (from `imarc chats`).
        chat_id: i64,

        /// Page size. Defaults to `page_size` from config.
        #[arg(long)]
        limit: Option<u32>,

        /// Messages to skip back from the newest.
        #[arg(long, default_value = "0")]
        offset: u32,
    },

    /// Search message text, including text recovered from rich-text bodies.
    Search {
        /// Case-insensitive substring to look for.
        term: String,

        /// Maximum results. Defaults to `search_limit` from config.
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show the messages surrounding one message.
    Around {
        /// Chat id the message belongs to.
        chat_id: i64,

        /// Target message id (from `imarc search`).
        message_id: i64,

        /// Messages to show on each side of the target.
        #[arg(long)]
        width: Option<u32>,
    },

    /// Show the tables and columns detected in the database.
    Schema,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Shorten `text` to at most `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    let single_line = text.replace(['\n', '\r'], " ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let kept: String = single_line.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

pub fn format_relative_time(dt: &chrono::DateTime<chrono::Utc>) -> String {
    let now = chrono::Utc::now();
    let diff = now - *dt;

    if diff.num_minutes() < 1 {
        "just now".to_string()
    } else if diff.num_hours() < 1 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_days() < 1 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_days() < 30 {
        format!("{}d ago", diff.num_days())
    } else {
        dt.format("%Y-%m-%d").to_string()
    }
}
