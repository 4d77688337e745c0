//! Application state wiring the archive service to the SQLite store.
//!
//! `ArchiveService` is generic over the store trait; AppState pins it to the
//! infra implementation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use imarchive_core::service::ArchiveService;
use imarchive_infra::config::{load_config, resolve_data_dir, resolve_database_path};
use imarchive_infra::sqlite::SqliteArchiveStore;

pub type ConcreteArchiveService = ArchiveService<SqliteArchiveStore>;

/// Shared state for CLI commands.
pub struct AppState {
    pub service: ConcreteArchiveService,
    pub database_path: PathBuf,
}

impl AppState {
    /// Load config, open the store read-only, and wire the service.
    ///
    /// `db_override` comes from `--db` and wins over `database_path` in
    /// `config.toml`.
    pub async fn init(db_override: Option<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_config(&data_dir).await;

        let database_path = resolve_database_path(db_override, &config).context(
            "no database to open: pass --db or set database_path in config.toml",
        )?;

        let store = SqliteArchiveStore::new();
        store
            .open(&database_path)
            .await
            .with_context(|| format!("failed to open {}", database_path.display()))?;

        Ok(Self {
            service: ArchiveService::new(Arc::new(store), config),
            database_path,
        })
    }

    /// Release the database connection.
    pub async fn shutdown(&self) {
        self.service.store().close().await;
    }
}
