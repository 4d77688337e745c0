//! Infrastructure layer for imarchive.
//!
//! Implements the `ArchiveStore` port from `imarchive-core` over the Messages
//! SQLite schema, and loads configuration from the data directory.

pub mod config;
pub mod sqlite;
