//! SQLite storage layer.
//!
//! Read-only access to a Messages `chat.db` through a single-connection sqlx
//! pool, with the schema probed once at open time.

pub mod chat;
pub mod message;
pub mod pool;
pub mod schema;
pub mod store;

#[cfg(test)]
pub(crate) mod fixture;

pub use store::SqliteArchiveStore;
