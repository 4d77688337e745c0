//! ArchiveStore trait definition (the store accessor port).
//!
//! The infrastructure layer (imarchive-infra) implements this over the
//! Messages SQLite schema. Every method returns typed records; optional
//! schema columns surface as `Option` fields rather than missing keys.

use imarchive_types::chat::{Chat, Handle};
use imarchive_types::error::StoreError;
use imarchive_types::message::{Attachment, Message};

/// Read-only access to a Messages store.
///
/// "Chronological" below means ordered by normalized timestamp, ties broken
/// by ascending row id. Only messages that belong to a chat are ever returned.
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ArchiveStore: Send + Sync {
    /// Chats ordered by their newest message, most recent first.
    fn list_chats(
        &self,
        limit: Option<u32>,
    ) -> impl std::future::Future<Output = Result<Vec<Chat>, StoreError>> + Send;

    /// Participant handles of a chat.
    fn chat_participants(
        &self,
        chat_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Handle>, StoreError>> + Send;

    /// A page of displayable messages in a chat, newest first.
    fn message_page(
        &self,
        chat_id: i64,
        limit: u32,
        offset: u32,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, StoreError>> + Send;

    /// Ids of every displayable message in a chat, chronological.
    fn chat_timeline(
        &self,
        chat_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<i64>, StoreError>> + Send;

    /// The messages of a chat with the given ids, in the order of `ids`. Ids
    /// that are unknown or belong to another chat are skipped.
    fn messages_by_ids(
        &self,
        chat_id: i64,
        ids: &[i64],
    ) -> impl std::future::Future<Output = Result<Vec<Message>, StoreError>> + Send;

    /// Case-insensitive substring match over the plain-text fields: message
    /// text, subject, associated message id, sender identifier, chat
    /// identifier, and chat display name. Newest first, at most `limit` rows.
    fn search_text(
        &self,
        term: &str,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, StoreError>> + Send;

    /// Up to `batch_size` messages with `id > after_id`, ascending by id.
    fn scan_messages(
        &self,
        after_id: i64,
        batch_size: u32,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, StoreError>> + Send;

    /// Attachments of a single message.
    fn attachments(
        &self,
        message_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Attachment>, StoreError>> + Send;
}
