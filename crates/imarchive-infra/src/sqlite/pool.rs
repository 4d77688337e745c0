//! Read-only, single-connection pool over a Messages database file.
//!
//! The store is opened read-only and never created. The pool holds exactly one
//! connection, so statements issued by concurrent callers are serialized on it.

use std::path::Path;

use imarchive_types::error::StoreError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::schema::{self, SchemaInfo};

/// Open `path` read-only and validate that it is a Messages store.
///
/// On any failure the pool is closed before returning, so no half-open
/// connection outlives the error.
pub async fn connect(path: &Path) -> Result<(SqlitePool, SchemaInfo), StoreError> {
    let fail = |reason: String| StoreError::Connection {
        path: path.display().to_string(),
        reason,
    };

    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return Err(fail("not a regular file".to_string())),
        Err(e) => return Err(fail(e.to_string())),
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .create_if_missing(false)
        .busy_timeout(std::time::Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| fail(e.to_string()))?;

    // The first real read is where a corrupt or non-SQLite file shows up.
    let schema = match schema::probe(&pool).await {
        Ok(schema) => schema,
        Err(e) => {
            pool.close().await;
            return Err(fail(e.to_string()));
        }
    };

    if let Some(table) = schema.missing_required_table() {
        pool.close().await;
        return Err(fail(format!("not a Messages database (missing table '{table}')")));
    }

    Ok((pool, schema))
}
