//! Schema probe for Messages databases.
//!
//! The schema belongs to the platform and drifts between OS versions, so the
//! columns actually present are read once at open time. Query builders ask
//! for columns through [`SchemaInfo::column`], which substitutes `NULL` for
//! anything missing.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use sqlx::Row;
use sqlx::sqlite::SqlitePool;
use tracing::debug;

/// Tables that must exist for a file to count as a Messages store.
pub const REQUIRED_TABLES: &[&str] = &["message", "chat", "chat_message_join", "handle"];

/// Tables read when present.
pub const OPTIONAL_TABLES: &[&str] = &["chat_handle_join", "attachment", "message_attachment_join"];

/// Columns present per table, as reported by `PRAGMA table_info`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaInfo {
    tables: BTreeMap<String, BTreeSet<String>>,
}

impl SchemaInfo {
    /// Build from explicit table/column lists.
    pub fn from_tables<'a>(tables: impl IntoIterator<Item = (&'a str, &'a [&'a str])>) -> Self {
        Self {
            tables: tables
                .into_iter()
                .map(|(table, cols)| {
                    (
                        table.to_string(),
                        cols.iter().map(|c| c.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Column lookup is case-insensitive, like SQLite identifiers.
    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.tables
            .get(table)
            .is_some_and(|cols| cols.iter().any(|c| c.eq_ignore_ascii_case(column)))
    }

    /// `alias.column` when the column exists, `NULL` otherwise.
    pub fn column(&self, table: &str, alias: &str, column: &str) -> String {
        if self.has_column(table, column) {
            format!("{alias}.{column}")
        } else {
            debug!(table, column, "optional column missing, projecting NULL");
            "NULL".to_string()
        }
    }

    /// The first required table that is absent, if any.
    pub fn missing_required_table(&self) -> Option<&'static str> {
        REQUIRED_TABLES.iter().copied().find(|t| !self.has_table(t))
    }

    /// Table names and their columns, sorted.
    pub fn tables(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.tables.iter().map(|(t, c)| (t.as_str(), c))
    }
}

/// Read the columns of every table this crate queries.
pub async fn probe(pool: &SqlitePool) -> Result<SchemaInfo, sqlx::Error> {
    let existing: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table'")
            .fetch_all(pool)
            .await?;

    let mut tables = BTreeMap::new();
    for table in REQUIRED_TABLES.iter().chain(OPTIONAL_TABLES) {
        if !existing.iter().any(|name| name == table) {
            continue;
        }
        let rows = sqlx::query(&format!("PRAGMA table_info(\"{table}\")"))
            .fetch_all(pool)
            .await?;
        let mut columns = BTreeSet::new();
        for row in &rows {
            columns.insert(row.try_get::<String, _>("name")?);
        }
        tables.insert(table.to_string(), columns);
    }

    Ok(SchemaInfo { tables })
}
