//! Message, attachment, and display projection types.
//!
//! `Message` keeps the raw store values (including the rich-text blob) so that
//! the blob stays available for deeper offline analysis; `ProcessedMessage`
//! carries the decoded text and normalized timestamp for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message row joined with its owning chat and sender handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// `message.ROWID`.
    pub id: i64,
    pub guid: Option<String>,
    /// Plain-text body. Newer records frequently leave this NULL.
    pub text: Option<String>,
    /// Serialized rich-text archive (`attributedBody`).
    pub rich_text: Option<Vec<u8>>,
    pub is_from_me: bool,
    /// Raw `message.date`: seconds or nanoseconds since 2001-01-01T00:00:00Z.
    pub date: Option<i64>,
    pub handle_id: i64,
    /// `handle.id` of the sender, when the handle row resolves.
    pub handle_identifier: Option<String>,
    pub service: Option<String>,
    pub has_attachments: bool,
    pub subject: Option<String>,
    /// Owning chat through `chat_message_join`.
    pub chat_id: i64,
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// `attachment.ROWID`.
    pub id: i64,
    pub filename: Option<String>,
    pub transfer_name: Option<String>,
    pub mime_type: Option<String>,
    pub total_bytes: i64,
    pub is_sticker: bool,
}

/// Display-ready projection of a [`Message`].
///
/// Produced fresh on every call; decoded text is never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedMessage {
    pub id: i64,
    pub chat_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    /// Decoded display text or one of the sentinel labels.
    pub text: String,
    pub date: DateTime<Utc>,
    /// True when the raw timestamp was unusable and `date` is the time of processing.
    #[serde(default)]
    pub date_estimated: bool,
    pub is_from_me: bool,
    /// "Me", a formatted phone number/email, or `Contact {handle_id}`.
    pub sender: String,
    pub handle_id: i64,
    pub service: Option<String>,
    pub subject: Option<String>,
    pub has_attachments: bool,
    /// Loaded only when `has_attachments` is set.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Size of the raw rich-text blob, kept for diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_blob_len: Option<usize>,
}

/// One page of a chat thread, in chronological order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePage {
    pub messages: Vec<ProcessedMessage>,
    /// `messages.len() == page_size`. An exact boundary costs one extra empty fetch.
    pub has_more: bool,
}

/// A window of messages around a target message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageContext {
    pub messages: Vec<ProcessedMessage>,
    /// Index of the target within `messages`, or `None` when the target was not
    /// found and `messages` holds the most recent page instead.
    pub target_index: Option<usize>,
}

impl MessageContext {
    /// The target message, if it was located.
    pub fn target(&self) -> Option<&ProcessedMessage> {
        self.target_index.and_then(|idx| self.messages.get(idx))
    }
}
