//! Chat and participant queries against the Messages schema.
//!
//! Raw queries mapped through private Row structs. Optional columns are
//! projected through [`SchemaInfo::column`] so older schemas read as NULL.

use imarchive_types::chat::{Chat, Handle};
use imarchive_types::error::StoreError;
use sqlx::Row;

use super::message::NORMALIZED_DATE;
use super::store::OpenDatabase;

// ---------------------------------------------------------------------------
// Private Row types
// ---------------------------------------------------------------------------

struct ChatRow {
    id: i64,
    guid: String,
    display_name: Option<String>,
    chat_identifier: Option<String>,
    style: Option<i64>,
    last_date: Option<i64>,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            guid: row.try_get("guid")?,
            display_name: row.try_get("display_name")?,
            chat_identifier: row.try_get("chat_identifier")?,
            style: row.try_get("style")?,
            last_date: row.try_get("last_date")?,
        })
    }

    fn into_chat(self) -> Chat {
        Chat {
            id: self.id,
            guid: self.guid,
            display_name: self.display_name.filter(|n| !n.trim().is_empty()),
            chat_identifier: self.chat_identifier,
            style: self.style,
            last_message_date: self.last_date,
        }
    }
}

struct HandleRow {
    id: i64,
    identifier: String,
    service: Option<String>,
}

impl HandleRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            identifier: row.try_get("identifier")?,
            service: row.try_get("service")?,
        })
    }

    fn into_handle(self) -> Handle {
        Handle {
            id: self.id,
            identifier: self.identifier,
            service: self.service,
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Chats ordered by newest message; chats without messages sort last.
pub(crate) async fn list_chats(
    db: &OpenDatabase,
    limit: Option<u32>,
) -> Result<Vec<Chat>, StoreError> {
    let schema = &db.schema;
    // SQLite returns the bare `m.date` from the row that supplied MAX().
    let sql = format!(
        r#"SELECT c.ROWID AS id, c.guid AS guid, {display_name} AS display_name,
                  c.chat_identifier AS chat_identifier, {style} AS style, last.date AS last_date
           FROM chat c
           LEFT JOIN (
               SELECT cmj.chat_id AS chat_id, MAX({norm}) AS last_norm, m.date AS date
               FROM chat_message_join cmj
               JOIN message m ON m.ROWID = cmj.message_id
               GROUP BY cmj.chat_id
           ) last ON last.chat_id = c.ROWID
           ORDER BY last.last_norm IS NULL, last.last_norm DESC, c.ROWID DESC
           LIMIT ?"#,
        display_name = schema.column("chat", "c", "display_name"),
        style = schema.column("chat", "c", "style"),
        norm = NORMALIZED_DATE,
    );

    let rows = sqlx::query(&sql)
        .bind(limit.map_or(-1, i64::from))
        .fetch_all(&db.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

    let mut chats = Vec::with_capacity(rows.len());
    for row in &rows {
        let chat_row = ChatRow::from_row(row).map_err(|e| StoreError::Query(e.to_string()))?;
        chats.push(chat_row.into_chat());
    }
    Ok(chats)
}

/// Participants from `chat_handle_join`, or the distinct senders of the
/// chat's messages on schemas without that table.
pub(crate) async fn chat_participants(
    db: &OpenDatabase,
    chat_id: i64,
) -> Result<Vec<Handle>, StoreError> {
    let service = db.schema.column("handle", "h", "service");
    let sql = if db.schema.has_table("chat_handle_join") {
        format!(
            r#"SELECT h.ROWID AS id, h.id AS identifier, {service} AS service
               FROM chat_handle_join chj
               JOIN handle h ON h.ROWID = chj.handle_id
               WHERE chj.chat_id = ?
               ORDER BY h.ROWID"#
        )
    } else {
        format!(
            r#"SELECT DISTINCT h.ROWID AS id, h.id AS identifier, {service} AS service
               FROM chat_message_join cmj
               JOIN message m ON m.ROWID = cmj.message_id
               JOIN handle h ON h.ROWID = m.handle_id
               WHERE cmj.chat_id = ?
               ORDER BY h.ROWID"#
        )
    };

    let rows = sqlx::query(&sql)
        .bind(chat_id)
        .fetch_all(&db.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

    let mut handles = Vec::with_capacity(rows.len());
    for row in &rows {
        let handle_row = HandleRow::from_row(row).map_err(|e| StoreError::Query(e.to_string()))?;
        handles.push(handle_row.into_handle());
    }
    Ok(handles)
}
