//! Conversation and participant types.
//!
//! `Chat` and `Handle` mirror rows of the Messages store as-is; `ProcessedChat`
//! is the display-ready projection produced by the core mapper.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Style code the Messages schema stores on `chat.style` for group conversations.
///
/// One-to-one chats use `45`; rows with a NULL style are treated as one-to-one.
pub const GROUP_CHAT_STYLE: i64 = 43;

/// A conversation thread as stored in the `chat` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    /// `chat.ROWID`.
    pub id: i64,
    pub guid: String,
    pub display_name: Option<String>,
    /// Phone number, email, or a synthetic `chatNNN` id for groups.
    pub chat_identifier: Option<String>,
    pub style: Option<i64>,
    /// Raw `message.date` of the newest message in the chat, if any.
    pub last_message_date: Option<i64>,
}

impl Chat {
    /// Whether the style code marks this chat as a group conversation.
    pub fn is_group(&self) -> bool {
        self.style == Some(GROUP_CHAT_STYLE)
    }
}

/// A participant identifier (phone number or email address).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handle {
    /// `handle.ROWID`.
    pub id: i64,
    /// The phone number or email address (`handle.id` in the schema).
    pub identifier: String,
    /// Owning service, e.g. "iMessage" or "SMS".
    pub service: Option<String>,
}

/// Display-ready projection of a [`Chat`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedChat {
    pub id: i64,
    pub guid: String,
    /// Resolved display name (explicit name, formatted identifier, or fallback label).
    pub display_name: String,
    pub chat_identifier: Option<String>,
    pub is_group: bool,
    /// Formatted participant identifiers, ordered by handle id.
    pub participants: Vec<String>,
    /// Normalized timestamp of the newest message, if the chat has any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_at: Option<DateTime<Utc>>,
}
