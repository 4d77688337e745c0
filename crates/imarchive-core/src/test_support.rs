//! In-memory `ArchiveStore` used by the engine tests.
//!
//! Mirrors the ordering and filtering rules of the SQLite implementation so
//! engine behavior can be tested without a database file.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use imarchive_types::chat::{Chat, Handle};
use imarchive_types::error::StoreError;
use imarchive_types::message::{Attachment, Message};

use crate::decoder;
use crate::repository::ArchiveStore;
use crate::timestamp;

pub(crate) fn make_message(id: i64, chat_id: i64, text: Option<&str>, date: i64) -> Message {
    Message {
        id,
        guid: Some(format!("msg-{id}")),
        text: text.map(String::from),
        rich_text: None,
        is_from_me: false,
        date: Some(date),
        handle_id: 1,
        handle_identifier: Some("+15551234567".to_string()),
        service: Some("iMessage".to_string()),
        has_attachments: false,
        subject: None,
        chat_id,
    }
}

pub(crate) fn make_chat(id: i64, identifier: &str) -> Chat {
    Chat {
        id,
        guid: format!("iMessage;-;{identifier}"),
        display_name: None,
        chat_identifier: Some(identifier.to_string()),
        style: Some(45),
        last_message_date: None,
    }
}

#[derive(Default)]
pub(crate) struct InMemoryStore {
    pub chats: Vec<Chat>,
    pub participants: HashMap<i64, Vec<Handle>>,
    pub messages: Vec<Message>,
    pub attachments: HashMap<i64, Vec<Attachment>>,
    pub fail_search: bool,
    pub fail_scan: bool,
    /// Sleep before serving each scan batch.
    pub scan_delay: Option<Duration>,
    lookups: Mutex<Vec<i64>>,
    scans: Mutex<u32>,
}

impl InMemoryStore {
    pub fn add_attachment(&mut self, message_id: i64, filename: &str, mime: &str) {
        let list = self.attachments.entry(message_id).or_default();
        list.push(Attachment {
            id: message_id * 100 + list.len() as i64,
            filename: Some(format!("~/Library/Messages/Attachments/{filename}")),
            transfer_name: Some(filename.to_string()),
            mime_type: Some(mime.to_string()),
            total_bytes: 1024,
            is_sticker: false,
        });
    }

    /// Message ids whose attachments were requested, in call order.
    pub fn attachment_lookups(&self) -> Vec<i64> {
        self.lookups.lock().unwrap().clone()
    }

    /// Number of scan batches served.
    pub fn scan_calls(&self) -> u32 {
        *self.scans.lock().unwrap()
    }

    fn chronological(&self, chat_id: i64) -> Vec<&Message> {
        let mut messages: Vec<&Message> = self
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id && decoder::has_displayable_content(m))
            .collect();
        messages.sort_by_key(|m| (timestamp::sort_key(m.date), m.id));
        messages
    }

    fn chat(&self, chat_id: i64) -> Option<&Chat> {
        self.chats.iter().find(|c| c.id == chat_id)
    }
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

impl ArchiveStore for InMemoryStore {
    async fn list_chats(&self, limit: Option<u32>) -> Result<Vec<Chat>, StoreError> {
        let mut chats: Vec<Chat> = self
            .chats
            .iter()
            .map(|c| Chat {
                last_message_date: self
                    .messages
                    .iter()
                    .filter(|m| m.chat_id == c.id)
                    .max_by_key(|m| timestamp::sort_key(m.date))
                    .and_then(|m| m.date),
                ..c.clone()
            })
            .collect();
        chats.sort_by_key(|c| std::cmp::Reverse(timestamp::sort_key(c.last_message_date)));
        if let Some(limit) = limit {
            chats.truncate(limit as usize);
        }
        Ok(chats)
    }

    async fn chat_participants(&self, chat_id: i64) -> Result<Vec<Handle>, StoreError> {
        Ok(self.participants.get(&chat_id).cloned().unwrap_or_default())
    }

    async fn message_page(
        &self,
        chat_id: i64,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Message>, StoreError> {
        Ok(self
            .chronological(chat_id)
            .into_iter()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn chat_timeline(&self, chat_id: i64) -> Result<Vec<i64>, StoreError> {
        Ok(self.chronological(chat_id).iter().map(|m| m.id).collect())
    }

    async fn messages_by_ids(&self, chat_id: i64, ids: &[i64]) -> Result<Vec<Message>, StoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.messages
                    .iter()
                    .find(|m| m.id == *id && m.chat_id == chat_id)
            })
            .cloned()
            .collect())
    }

    async fn search_text(&self, term: &str, limit: u32) -> Result<Vec<Message>, StoreError> {
        if self.fail_search {
            return Err(StoreError::Query("database disk image is malformed".to_string()));
        }
        let needle = term.to_lowercase();
        let mut found: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| {
                let chat = self.chat(m.chat_id);
                contains_ci(m.text.as_deref(), &needle)
                    || contains_ci(m.subject.as_deref(), &needle)
                    || contains_ci(m.handle_identifier.as_deref(), &needle)
                    || contains_ci(chat.and_then(|c| c.chat_identifier.as_deref()), &needle)
                    || contains_ci(chat.and_then(|c| c.display_name.as_deref()), &needle)
            })
            .cloned()
            .collect();
        found.sort_by_key(|m| std::cmp::Reverse((timestamp::sort_key(m.date), m.id)));
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn scan_messages(&self, after_id: i64, batch_size: u32) -> Result<Vec<Message>, StoreError> {
        *self.scans.lock().unwrap() += 1;
        if let Some(delay) = self.scan_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_scan {
            return Err(StoreError::Query("interrupted".to_string()));
        }
        let mut batch: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| m.id > after_id)
            .cloned()
            .collect();
        batch.sort_by_key(|m| m.id);
        batch.truncate(batch_size as usize);
        Ok(batch)
    }

    async fn attachments(&self, message_id: i64) -> Result<Vec<Attachment>, StoreError> {
        self.lookups.lock().unwrap().push(message_id);
        Ok(self.attachments.get(&message_id).cloned().unwrap_or_default())
    }
}
