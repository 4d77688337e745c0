//! SQLite implementation of the `ArchiveStore` port.
//!
//! `SqliteArchiveStore` owns at most one open database at a time. Opening a
//! new path closes the previous connection first; every query against a
//! closed store fails with `StoreError::NotOpen`.

use std::path::{Path, PathBuf};

use imarchive_core::repository::ArchiveStore;
use imarchive_types::chat::{Chat, Handle};
use imarchive_types::error::StoreError;
use imarchive_types::message::{Attachment, Message};
use sqlx::sqlite::SqlitePool;
use tokio::sync::RwLock;
use tracing::info;

use super::schema::SchemaInfo;
use super::{chat, message, pool};

/// A validated, open Messages database.
pub(crate) struct OpenDatabase {
    pub(crate) pool: SqlitePool,
    pub(crate) path: PathBuf,
    pub(crate) schema: SchemaInfo,
}

/// Read-only Messages store backed by sqlx.
#[derive(Default)]
pub struct SqliteArchiveStore {
    state: RwLock<Option<OpenDatabase>>,
}

impl SqliteArchiveStore {
    /// A store with no database open.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and validate `path`, replacing any database already open.
    ///
    /// The previous connection is closed before the new one is attempted, so
    /// a failed open leaves the store closed.
    pub async fn open(&self, path: &Path) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if let Some(previous) = state.take() {
            info!(path = %previous.path.display(), "closing archive database");
            previous.pool.close().await;
        }

        let (pool, schema) = pool::connect(path).await?;
        info!(
            path = %path.display(),
            tables = schema.tables().count(),
            "opened archive database"
        );
        *state = Some(OpenDatabase {
            pool,
            path: path.to_path_buf(),
            schema,
        });
        Ok(())
    }

    /// Close the open database, if any.
    pub async fn close(&self) {
        if let Some(db) = self.state.write().await.take() {
            db.pool.close().await;
            info!(path = %db.path.display(), "closed archive database");
        }
    }

    pub async fn is_open(&self) -> bool {
        self.state.read().await.is_some()
    }

    /// Path of the open database.
    pub async fn path(&self) -> Option<PathBuf> {
        self.state.read().await.as_ref().map(|db| db.path.clone())
    }

    /// Tables and columns detected when the database was opened.
    pub async fn schema(&self) -> Result<SchemaInfo, StoreError> {
        let state = self.state.read().await;
        let db = state.as_ref().ok_or(StoreError::NotOpen)?;
        Ok(db.schema.clone())
    }
}

impl ArchiveStore for SqliteArchiveStore {
    async fn list_chats(&self, limit: Option<u32>) -> Result<Vec<Chat>, StoreError> {
        let state = self.state.read().await;
        let db = state.as_ref().ok_or(StoreError::NotOpen)?;
        chat::list_chats(db, limit).await
    }

    async fn chat_participants(&self, chat_id: i64) -> Result<Vec<Handle>, StoreError> {
        let state = self.state.read().await;
        let db = state.as_ref().ok_or(StoreError::NotOpen)?;
        chat::chat_participants(db, chat_id).await
    }

    async fn message_page(
        &self,
        chat_id: i64,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Message>, StoreError> {
        let state = self.state.read().await;
        let db = state.as_ref().ok_or(StoreError::NotOpen)?;
        message::message_page(db, chat_id, limit, offset).await
    }

    async fn chat_timeline(&self, chat_id: i64) -> Result<Vec<i64>, StoreError> {
        let state = self.state.read().await;
        let db = state.as_ref().ok_or(StoreError::NotOpen)?;
        message::chat_timeline(db, chat_id).await
    }

    async fn messages_by_ids(&self, chat_id: i64, ids: &[i64]) -> Result<Vec<Message>, StoreError> {
        let state = self.state.read().await;
        let db = state.as_ref().ok_or(StoreError::NotOpen)?;
        message::messages_by_ids(db, chat_id, ids).await
    }

    async fn search_text(&self, term: &str, limit: u32) -> Result<Vec<Message>, StoreError> {
        let state = self.state.read().await;
        let db = state.as_ref().ok_or(StoreError::NotOpen)?;
        message::search_text(db, term, limit).await
    }

    async fn scan_messages(&self, after_id: i64, batch_size: u32) -> Result<Vec<Message>, StoreError> {
        let state = self.state.read().await;
        let db = state.as_ref().ok_or(StoreError::NotOpen)?;
        message::scan_messages(db, after_id, batch_size).await
    }

    async fn attachments(&self, message_id: i64) -> Result<Vec<Attachment>, StoreError> {
        let state = self.state.read().await;
        let db = state.as_ref().ok_or(StoreError::NotOpen)?;
        message::attachments(db, message_id).await
    }
}
