//! Message and attachment queries against the Messages schema.
//!
//! Timelines order by the normalized timestamp so seconds-era and
//! nanosecond-era rows interleave correctly, ties broken by ROWID.

use std::collections::{HashMap, HashSet};

use imarchive_types::error::StoreError;
use imarchive_types::message::{Attachment, Message};
use sqlx::Row;

use super::schema::SchemaInfo;
use super::store::OpenDatabase;

/// `m.date` in seconds whatever unit the row was written in.
pub(crate) const NORMALIZED_DATE: &str =
    "CASE WHEN abs(m.date) > 1000000000000000 THEN m.date / 1000000000.0 ELSE m.date END";

/// Upper bound on ids per `IN (...)` list, below SQLite's variable limit.
const ID_CHUNK: usize = 500;

// ---------------------------------------------------------------------------
// Private Row types
// ---------------------------------------------------------------------------

struct MessageRow {
    id: i64,
    guid: Option<String>,
    text: Option<String>,
    attributed_body: Option<Vec<u8>>,
    is_from_me: Option<i64>,
    date: Option<i64>,
    handle_id: Option<i64>,
    handle_identifier: Option<String>,
    service: Option<String>,
    has_attachments: Option<i64>,
    subject: Option<String>,
    chat_id: i64,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            guid: row.try_get("guid")?,
            text: row.try_get("text")?,
            attributed_body: row.try_get("attributed_body")?,
            is_from_me: row.try_get("is_from_me")?,
            date: row.try_get("date")?,
            handle_id: row.try_get("handle_id")?,
            handle_identifier: row.try_get("handle_identifier")?,
            service: row.try_get("service")?,
            has_attachments: row.try_get("has_attachments")?,
            subject: row.try_get("subject")?,
            chat_id: row.try_get("chat_id")?,
        })
    }

    fn into_message(self) -> Message {
        Message {
            id: self.id,
            guid: self.guid,
            text: self.text,
            rich_text: self.attributed_body,
            is_from_me: self.is_from_me.unwrap_or(0) != 0,
            date: self.date,
            handle_id: self.handle_id.unwrap_or(0),
            handle_identifier: self.handle_identifier,
            service: self.service,
            has_attachments: self.has_attachments.unwrap_or(0) != 0,
            subject: self.subject,
            chat_id: self.chat_id,
        }
    }
}

struct AttachmentRow {
    id: i64,
    filename: Option<String>,
    transfer_name: Option<String>,
    mime_type: Option<String>,
    total_bytes: i64,
    is_sticker: i64,
}

impl AttachmentRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            filename: row.try_get("filename")?,
            transfer_name: row.try_get("transfer_name")?,
            mime_type: row.try_get("mime_type")?,
            total_bytes: row.try_get("total_bytes")?,
            is_sticker: row.try_get("is_sticker")?,
        })
    }

    fn into_attachment(self) -> Attachment {
        Attachment {
            id: self.id,
            filename: self.filename,
            transfer_name: self.transfer_name,
            mime_type: self.mime_type,
            total_bytes: self.total_bytes,
            is_sticker: self.is_sticker != 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Message projection shared by every query; the caller supplies `chat_id`.
fn message_columns(schema: &SchemaInfo) -> String {
    format!(
        r#"m.ROWID AS id, {guid} AS guid, m.text AS text, {body} AS attributed_body,
           {from_me} AS is_from_me, m.date AS date, {handle_id} AS handle_id,
           h.id AS handle_identifier, {service} AS service,
           {attachments} AS has_attachments, {subject} AS subject"#,
        guid = schema.column("message", "m", "guid"),
        body = schema.column("message", "m", "attributedBody"),
        from_me = schema.column("message", "m", "is_from_me"),
        handle_id = schema.column("message", "m", "handle_id"),
        service = schema.column("message", "m", "service"),
        attachments = schema.column("message", "m", "cache_has_attachments"),
        subject = schema.column("message", "m", "subject"),
    )
}

/// Rows with text, a rich-text body, or attachments.
fn displayable(schema: &SchemaInfo) -> String {
    format!(
        "((m.text IS NOT NULL AND m.text <> '') OR {body} IS NOT NULL OR {attachments} = 1)",
        body = schema.column("message", "m", "attributedBody"),
        attachments = schema.column("message", "m", "cache_has_attachments"),
    )
}

fn map_messages(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Message>, StoreError> {
    let mut messages = Vec::with_capacity(rows.len());
    for row in rows {
        let message_row = MessageRow::from_row(row).map_err(|e| StoreError::Query(e.to_string()))?;
        messages.push(message_row.into_message());
    }
    Ok(messages)
}

/// `%term%` with LIKE wildcards escaped by `\`.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Displayable messages of a chat, newest first.
pub(crate) async fn message_page(
    db: &OpenDatabase,
    chat_id: i64,
    limit: u32,
    offset: u32,
) -> Result<Vec<Message>, StoreError> {
    let sql = format!(
        r#"SELECT {columns}, cmj.chat_id AS chat_id
           FROM message m
           JOIN chat_message_join cmj ON cmj.message_id = m.ROWID
           LEFT JOIN handle h ON h.ROWID = m.handle_id
           WHERE cmj.chat_id = ? AND {displayable}
           ORDER BY {norm} DESC, m.ROWID DESC
           LIMIT ? OFFSET ?"#,
        columns = message_columns(&db.schema),
        displayable = displayable(&db.schema),
        norm = NORMALIZED_DATE,
    );

    let rows = sqlx::query(&sql)
        .bind(chat_id)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&db.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

    map_messages(&rows)
}

/// Ids of the displayable messages of a chat, chronological.
pub(crate) async fn chat_timeline(db: &OpenDatabase, chat_id: i64) -> Result<Vec<i64>, StoreError> {
    let sql = format!(
        r#"SELECT m.ROWID
           FROM message m
           JOIN chat_message_join cmj ON cmj.message_id = m.ROWID
           WHERE cmj.chat_id = ? AND {displayable}
           ORDER BY {norm} ASC, m.ROWID ASC"#,
        displayable = displayable(&db.schema),
        norm = NORMALIZED_DATE,
    );

    sqlx::query_scalar::<_, i64>(&sql)
        .bind(chat_id)
        .fetch_all(&db.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))
}

/// Messages of a chat by id, in the order of `ids`.
///
/// Callers pass a slice of [`chat_timeline`]; its order is kept as is.
pub(crate) async fn messages_by_ids(
    db: &OpenDatabase,
    chat_id: i64,
    ids: &[i64],
) -> Result<Vec<Message>, StoreError> {
    let columns = message_columns(&db.schema);
    let mut messages = Vec::with_capacity(ids.len());

    for chunk in ids.chunks(ID_CHUNK) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!(
            r#"SELECT {columns}, cmj.chat_id AS chat_id
               FROM message m
               JOIN chat_message_join cmj ON cmj.message_id = m.ROWID
               LEFT JOIN handle h ON h.ROWID = m.handle_id
               WHERE cmj.chat_id = ? AND m.ROWID IN ({placeholders})"#
        );
        let mut query = sqlx::query(&sql).bind(chat_id);
        for id in chunk {
            query = query.bind(*id);
        }
        let rows = query
            .fetch_all(&db.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        messages.extend(map_messages(&rows)?);
    }

    let position: HashMap<i64, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    messages.sort_by_key(|m| position.get(&m.id).copied());
    Ok(messages)
}

/// Phase-1 search over the plain-text columns present in this schema.
pub(crate) async fn search_text(
    db: &OpenDatabase,
    term: &str,
    limit: u32,
) -> Result<Vec<Message>, StoreError> {
    let schema = &db.schema;
    let fields: Vec<String> = [
        ("message", "m", "text"),
        ("message", "m", "subject"),
        ("message", "m", "associated_message_guid"),
        ("handle", "h", "id"),
        ("chat", "c", "chat_identifier"),
        ("chat", "c", "display_name"),
    ]
    .into_iter()
    .filter(|(table, _, column)| schema.has_column(table, column))
    .map(|(_, alias, column)| format!("{alias}.{column} LIKE ? ESCAPE '\\'"))
    .collect();

    if fields.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        r#"SELECT {columns}, cmj.chat_id AS chat_id
           FROM message m
           JOIN chat_message_join cmj ON cmj.message_id = m.ROWID
           JOIN chat c ON c.ROWID = cmj.chat_id
           LEFT JOIN handle h ON h.ROWID = m.handle_id
           WHERE {predicate}
           ORDER BY {norm} DESC, m.ROWID DESC
           LIMIT ?"#,
        columns = message_columns(schema),
        predicate = fields.join(" OR "),
        norm = NORMALIZED_DATE,
    );

    let pattern = like_pattern(term);
    let mut query = sqlx::query(&sql);
    for _ in &fields {
        query = query.bind(pattern.as_str());
    }
    let rows = query
        .bind(i64::from(limit))
        .fetch_all(&db.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

    // A message joined to several chats comes back once per chat.
    let mut seen = HashSet::new();
    let mut messages = map_messages(&rows)?;
    messages.retain(|m| seen.insert(m.id));
    Ok(messages)
}

/// Keyset batch of chat-bound messages with `ROWID > after_id`.
pub(crate) async fn scan_messages(
    db: &OpenDatabase,
    after_id: i64,
    batch_size: u32,
) -> Result<Vec<Message>, StoreError> {
    let sql = format!(
        r#"SELECT {columns},
                  (SELECT MIN(cmj.chat_id) FROM chat_message_join cmj WHERE cmj.message_id = m.ROWID) AS chat_id
           FROM message m
           LEFT JOIN handle h ON h.ROWID = m.handle_id
           WHERE m.ROWID > ?
             AND EXISTS (SELECT 1 FROM chat_message_join cmj WHERE cmj.message_id = m.ROWID)
           ORDER BY m.ROWID ASC
           LIMIT ?"#,
        columns = message_columns(&db.schema),
    );

    let rows = sqlx::query(&sql)
        .bind(after_id)
        .bind(i64::from(batch_size))
        .fetch_all(&db.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

    map_messages(&rows)
}

/// Attachments of one message; empty on schemas without attachment tables.
pub(crate) async fn attachments(
    db: &OpenDatabase,
    message_id: i64,
) -> Result<Vec<Attachment>, StoreError> {
    let schema = &db.schema;
    if !schema.has_table("attachment") || !schema.has_table("message_attachment_join") {
        return Ok(Vec::new());
    }

    let sql = format!(
        r#"SELECT a.ROWID AS id, {filename} AS filename, {transfer_name} AS transfer_name,
                  {mime_type} AS mime_type, COALESCE({total_bytes}, 0) AS total_bytes,
                  COALESCE({is_sticker}, 0) AS is_sticker
           FROM message_attachment_join maj
           JOIN attachment a ON a.ROWID = maj.attachment_id
           WHERE maj.message_id = ?
           ORDER BY a.ROWID"#,
        filename = schema.column("attachment", "a", "filename"),
        transfer_name = schema.column("attachment", "a", "transfer_name"),
        mime_type = schema.column("attachment", "a", "mime_type"),
        total_bytes = schema.column("attachment", "a", "total_bytes"),
        is_sticker = schema.column("attachment", "a", "is_sticker"),
    );

    let rows = sqlx::query(&sql)
        .bind(message_id)
        .fetch_all(&db.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

    let mut attachments = Vec::with_capacity(rows.len());
    for row in &rows {
        let attachment_row =
            AttachmentRow::from_row(row).map_err(|e| StoreError::Query(e.to_string()))?;
        attachments.push(attachment_row.into_attachment());
    }
    Ok(attachments)
}
