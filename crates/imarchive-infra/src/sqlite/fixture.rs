//! Temporary Messages databases for tests.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tempfile::TempDir;

/// Subset of the Messages schema this crate reads, as shipped by current OS versions.
pub const MESSAGES_SCHEMA: &str = r#"
CREATE TABLE handle (ROWID INTEGER PRIMARY KEY AUTOINCREMENT UNIQUE, id TEXT NOT NULL, country TEXT, service TEXT NOT NULL, uncanonicalized_id TEXT);
CREATE TABLE chat (ROWID INTEGER PRIMARY KEY AUTOINCREMENT, guid TEXT UNIQUE NOT NULL, style INTEGER, state INTEGER, chat_identifier TEXT, service_name TEXT, room_name TEXT, display_name TEXT);
CREATE TABLE message (ROWID INTEGER PRIMARY KEY AUTOINCREMENT, guid TEXT UNIQUE NOT NULL, text TEXT, handle_id INTEGER DEFAULT 0, subject TEXT, service TEXT, date INTEGER, is_from_me INTEGER DEFAULT 0, cache_has_attachments INTEGER DEFAULT 0, associated_message_guid TEXT, attributedBody BLOB);
CREATE TABLE chat_message_join (chat_id INTEGER REFERENCES chat (ROWID) ON DELETE CASCADE, message_id INTEGER REFERENCES message (ROWID) ON DELETE CASCADE, message_date INTEGER DEFAULT 0, PRIMARY KEY (chat_id, message_id));
CREATE INDEX chat_message_join_idx_message_id_only ON chat_message_join(message_id);
CREATE TABLE chat_handle_join (chat_id INTEGER REFERENCES chat (ROWID) ON DELETE CASCADE, handle_id INTEGER REFERENCES handle (ROWID) ON DELETE CASCADE, UNIQUE(chat_id, handle_id));
CREATE TABLE attachment (ROWID INTEGER PRIMARY KEY AUTOINCREMENT, guid TEXT UNIQUE NOT NULL, filename TEXT, mime_type TEXT, transfer_name TEXT, total_bytes INTEGER DEFAULT 0, is_sticker INTEGER DEFAULT 0);
CREATE TABLE message_attachment_join (message_id INTEGER REFERENCES message (ROWID) ON DELETE CASCADE, attachment_id INTEGER REFERENCES attachment (ROWID) ON DELETE CASCADE, UNIQUE(message_id, attachment_id));
"#;

/// An older layout: no rich-text, subject, attachment-flag, or display-name
/// columns, and no attachment tables.
pub const LEGACY_SCHEMA: &str = r#"
CREATE TABLE handle (ROWID INTEGER PRIMARY KEY AUTOINCREMENT UNIQUE, id TEXT NOT NULL, service TEXT NOT NULL);
CREATE TABLE chat (ROWID INTEGER PRIMARY KEY AUTOINCREMENT, guid TEXT UNIQUE NOT NULL, style INTEGER, chat_identifier TEXT);
CREATE TABLE message (ROWID INTEGER PRIMARY KEY AUTOINCREMENT, guid TEXT UNIQUE NOT NULL, text TEXT, handle_id INTEGER DEFAULT 0, service TEXT, date INTEGER, is_from_me INTEGER DEFAULT 0);
CREATE TABLE chat_message_join (chat_id INTEGER, message_id INTEGER, PRIMARY KEY (chat_id, message_id));
"#;

/// Create a database file at `path` and run `sql` against it.
pub async fn create_database(path: &Path, sql: &str) {
    let pool = writer(path).await;
    sqlx::raw_sql(sql).execute(&pool).await.unwrap();
    pool.close().await;
}

async fn writer(path: &Path) -> SqlitePool {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap()
}

/// A typedstream-style `attributedBody` holding `text` behind the usual
/// class-name preamble.
pub fn archived_body(text: &str) -> Vec<u8> {
    let mut blob = Vec::new();
    blob.extend_from_slice(b"\x04\x0bstreamtyped\x81\xe8\x03\x84\x01@\x84\x84\x84");
    blob.extend_from_slice(b"\x12NSAttributedString\x00\x84\x84\x08NSObject\x00\x85\x92");
    blob.extend_from_slice(b"\x84\x84\x84\x08NSString\x01\x94\x84\x01+");
    blob.push(text.len() as u8);
    blob.extend_from_slice(text.as_bytes());
    blob.extend_from_slice(b"\x86\x84\x02iI\x01\x0b\x92\x84\x84\x84\x0cNSDictionary\x00");
    blob.extend_from_slice(b"\x94\x84\x01i\x01\x92\x84\x96\x96\x1d__kIMMessagePartAttributeName");
    blob.extend_from_slice(b"\x86\x92\x84\x84\x84\x08NSNumber\x00\x84\x84\x07NSValue\x00\x94\x86\x86");
    blob
}

/// Values for one inserted message; unset fields take schema defaults.
#[derive(Default)]
pub struct NewMessage<'a> {
    /// Owning chat. `None` inserts an orphan with no join row.
    pub chat_id: Option<i64>,
    pub text: Option<&'a str>,
    pub body: Option<Vec<u8>>,
    pub date: i64,
    pub handle_id: i64,
    pub is_from_me: bool,
    pub has_attachments: bool,
    pub subject: Option<&'a str>,
    pub associated_guid: Option<&'a str>,
}

/// A Messages database in a temporary directory, writable by the test.
pub struct TestDb {
    _dir: TempDir,
    path: PathBuf,
    pool: SqlitePool,
    next_guid: AtomicI64,
}

impl TestDb {
    pub async fn new() -> Self {
        Self::with_schema(MESSAGES_SCHEMA).await
    }

    pub async fn with_schema(sql: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.db");
        create_database(&path, sql).await;
        let pool = writer(&path).await;
        Self {
            _dir: dir,
            path,
            pool,
            next_guid: AtomicI64::new(1),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn guid(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_guid.fetch_add(1, Ordering::Relaxed))
    }

    pub async fn handle(&self, identifier: &str) -> i64 {
        sqlx::query("INSERT INTO handle (id, service) VALUES (?, 'iMessage')")
            .bind(identifier)
            .execute(&self.pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    pub async fn chat(&self, identifier: &str, display_name: Option<&str>, style: i64) -> i64 {
        sqlx::query(
            "INSERT INTO chat (guid, style, chat_identifier, display_name) VALUES (?, ?, ?, ?)",
        )
        .bind(format!("iMessage;-;{identifier}"))
        .bind(style)
        .bind(identifier)
        .bind(display_name)
        .execute(&self.pool)
        .await
        .unwrap()
        .last_insert_rowid()
    }

    pub async fn participant(&self, chat_id: i64, handle_id: i64) {
        sqlx::query("INSERT INTO chat_handle_join (chat_id, handle_id) VALUES (?, ?)")
            .bind(chat_id)
            .bind(handle_id)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn message(&self, new: NewMessage<'_>) -> i64 {
        let id = sqlx::query(
            r#"INSERT INTO message (guid, text, handle_id, subject, service, date, is_from_me, cache_has_attachments, associated_message_guid, attributedBody)
               VALUES (?, ?, ?, ?, 'iMessage', ?, ?, ?, ?, ?)"#,
        )
        .bind(self.guid("msg"))
        .bind(new.text)
        .bind(new.handle_id)
        .bind(new.subject)
        .bind(new.date)
        .bind(new.is_from_me as i64)
        .bind(new.has_attachments as i64)
        .bind(new.associated_guid)
        .bind(new.body)
        .execute(&self.pool)
        .await
        .unwrap()
        .last_insert_rowid();

        if let Some(chat_id) = new.chat_id {
            self.join(chat_id, id).await;
        }
        id
    }

    pub async fn join(&self, chat_id: i64, message_id: i64) {
        sqlx::query("INSERT INTO chat_message_join (chat_id, message_id) VALUES (?, ?)")
            .bind(chat_id)
            .bind(message_id)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn attachment(&self, message_id: i64, transfer_name: &str, mime_type: &str) -> i64 {
        let id = sqlx::query(
            r#"INSERT INTO attachment (guid, filename, mime_type, transfer_name, total_bytes)
               VALUES (?, ?, ?, ?, 2048)"#,
        )
        .bind(self.guid("att"))
        .bind(format!("~/Library/Messages/Attachments/{transfer_name}"))
        .bind(mime_type)
        .bind(transfer_name)
        .execute(&self.pool)
        .await
        .unwrap()
        .last_insert_rowid();

        sqlx::query("INSERT INTO message_attachment_join (message_id, attachment_id) VALUES (?, ?)")
            .bind(message_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .unwrap();
        id
    }
}
