//! Archive service: the engine's public operations.
//!
//! `ArchiveService` wires the mapper, pagination, context locator, and search
//! engine to a single injected store and applies configured defaults.

use std::sync::Arc;
use std::time::Duration;

use imarchive_types::chat::ProcessedChat;
use imarchive_types::config::ArchiveConfig;
use imarchive_types::error::ArchiveError;
use imarchive_types::message::{MessageContext, MessagePage, ProcessedMessage};
use tracing::warn;

use crate::context;
use crate::mapper;
use crate::pagination;
use crate::repository::ArchiveStore;
use crate::search::{self, SearchRequest};

/// Read-only operations over one Messages store.
///
/// Generic over `ArchiveStore` so the core never depends on imarchive-infra.
/// The store is shared behind an `Arc` so a timed-out search can keep
/// running on its own task.
pub struct ArchiveService<S: ArchiveStore> {
    store: Arc<S>,
    config: ArchiveConfig,
}

impl<S: ArchiveStore + 'static> ArchiveService<S> {
    pub fn new(store: Arc<S>, config: ArchiveConfig) -> Self {
        Self { store, config }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Chats ordered by most recent activity.
    pub async fn list_chats(&self, limit: Option<u32>) -> Result<Vec<ProcessedChat>, ArchiveError> {
        let chats = self.store.list_chats(limit).await?;
        let mut processed = Vec::with_capacity(chats.len());
        for chat in &chats {
            processed.push(mapper::process_chat(&*self.store, chat).await?);
        }
        Ok(processed)
    }

    /// A chronological page of a chat, `offset` messages back from the newest.
    pub async fn get_messages(
        &self,
        chat_id: i64,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<MessagePage, ArchiveError> {
        let page_size = limit.unwrap_or(self.config.page_size);
        pagination::get_page(&*self.store, chat_id, page_size, offset).await
    }

    /// Full-history search, newest first.
    ///
    /// With `search_timeout_secs` configured, the search runs on its own task
    /// and the caller gets [`ArchiveError::SearchTimeout`] once the timeout
    /// passes. The scan is not cancelled and runs to completion in the
    /// background.
    pub async fn search_messages(
        &self,
        term: &str,
        limit: Option<u32>,
    ) -> Result<Vec<ProcessedMessage>, ArchiveError> {
        let request = SearchRequest {
            term: term.to_string(),
            limit: limit.unwrap_or(self.config.search_limit),
            batch_size: self.config.scan_batch_size,
        };

        let Some(secs) = self.config.search_timeout_secs else {
            return search::search(&*self.store, &request).await;
        };

        let timeout = Duration::from_secs(secs);
        let store = Arc::clone(&self.store);
        let task = tokio::spawn(async move { search::search(&*store, &request).await });

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(ArchiveError::TaskFailed(join_err.to_string())),
            Err(_) => {
                warn!(term = %term, ?timeout, "search timed out; scan continues in background");
                Err(ArchiveError::SearchTimeout(timeout))
            }
        }
    }

    /// Messages surrounding `message_id`, for jumping to a search result.
    pub async fn get_messages_around_message(
        &self,
        chat_id: i64,
        message_id: i64,
        half_width: Option<u32>,
    ) -> Result<MessageContext, ArchiveError> {
        context::locate(
            &*self.store,
            chat_id,
            message_id,
            half_width.unwrap_or(self.config.context_half_width),
            self.config.page_size,
        )
        .await
    }
}
