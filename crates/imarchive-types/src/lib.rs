//! Shared domain types for imarchive.
//!
//! This crate contains the value types used across the archive engine:
//! Chat, Handle, Message, Attachment, their display projections, the
//! configuration record, and the error enums.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod message;
