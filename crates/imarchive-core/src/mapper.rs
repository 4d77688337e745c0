//! Projection of store records into display-ready values.
//!
//! Resolves chat display names and sender labels, decodes message bodies,
//! normalizes timestamps, and loads attachments for messages that have them.

use imarchive_types::chat::{Chat, Handle, ProcessedChat};
use imarchive_types::error::StoreError;
use imarchive_types::message::{Attachment, Message, ProcessedMessage};

use crate::decoder;
use crate::repository::ArchiveStore;
use crate::timestamp;

/// Sender label for messages sent from the archive owner's devices.
pub const FROM_ME_LABEL: &str = "Me";

/// Format a handle identifier for display.
///
/// Emails are returned verbatim. Phone-like identifiers with 10 digits become
/// `(AAA) BBB-CCCC`; 11 digits with a leading `1` become `+1 (AAA) BBB-CCCC`.
/// Anything else is returned unchanged.
pub fn format_identifier(identifier: &str) -> String {
    if identifier.contains('@') {
        return identifier.to_string();
    }
    let phone_like = identifier
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | '.' | ' '));
    if !phone_like {
        return identifier.to_string();
    }

    let digits: String = identifier.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        10 => format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]),
        11 if digits.starts_with('1') => {
            format!("+1 ({}) {}-{}", &digits[1..4], &digits[4..7], &digits[7..])
        }
        _ => identifier.to_string(),
    }
}

/// Fallback label for a chat or handle with nothing better to show.
pub fn contact_label(id: i64) -> String {
    format!("Contact {id}")
}

/// Resolve a chat's display name: explicit name, then formatted identifier,
/// then `Contact {id}`.
pub fn resolve_display_name(chat: &Chat) -> String {
    if let Some(name) = non_blank(chat.display_name.as_deref()) {
        return name.to_string();
    }
    if let Some(identifier) = non_blank(chat.chat_identifier.as_deref()) {
        return format_identifier(identifier);
    }
    contact_label(chat.id)
}

/// Label for the sender of a message.
pub fn sender_label(message: &Message) -> String {
    if message.is_from_me {
        return FROM_ME_LABEL.to_string();
    }
    match non_blank(message.handle_identifier.as_deref()) {
        Some(identifier) => format_identifier(identifier),
        None => contact_label(message.handle_id),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Build the display projection of a chat from its row and participants.
pub fn to_processed_chat(chat: &Chat, participants: &[Handle]) -> ProcessedChat {
    ProcessedChat {
        id: chat.id,
        guid: chat.guid.clone(),
        display_name: resolve_display_name(chat),
        chat_identifier: chat.chat_identifier.clone(),
        is_group: chat.is_group(),
        participants: participants
            .iter()
            .map(|h| format_identifier(&h.identifier))
            .collect(),
        last_message_at: chat.last_message_date.and_then(timestamp::try_normalize_raw),
    }
}

/// Build the display projection of a message with already-loaded attachments.
pub fn to_processed_message(message: &Message, attachments: Vec<Attachment>) -> ProcessedMessage {
    let text = decoder::decode_message(message).into_string();
    let normalized = timestamp::normalize_raw(message.date);

    ProcessedMessage {
        id: message.id,
        chat_id: message.chat_id,
        guid: message.guid.clone(),
        text,
        date: normalized.date,
        date_estimated: normalized.estimated,
        is_from_me: message.is_from_me,
        sender: sender_label(message),
        handle_id: message.handle_id,
        service: message.service.clone(),
        subject: message.subject.clone(),
        has_attachments: message.has_attachments,
        attachments,
        raw_blob_len: message.rich_text.as_ref().map(Vec::len),
    }
}

/// Project a message, fetching attachments only when its flag is set.
pub async fn process_message<S: ArchiveStore>(
    store: &S,
    message: &Message,
) -> Result<ProcessedMessage, StoreError> {
    let attachments = if message.has_attachments {
        store.attachments(message.id).await?
    } else {
        Vec::new()
    };
    Ok(to_processed_message(message, attachments))
}

/// Project a batch of messages, preserving order.
pub async fn process_messages<S: ArchiveStore>(
    store: &S,
    messages: &[Message],
) -> Result<Vec<ProcessedMessage>, StoreError> {
    let mut processed = Vec::with_capacity(messages.len());
    for message in messages {
        processed.push(process_message(store, message).await?);
    }
    Ok(processed)
}

/// Project a chat, loading its participants.
pub async fn process_chat<S: ArchiveStore>(
    store: &S,
    chat: &Chat,
) -> Result<ProcessedChat, StoreError> {
    let participants = store.chat_participants(chat.id).await?;
    Ok(to_processed_chat(chat, &participants))
}
