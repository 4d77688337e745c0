//! Configuration loading for imarchive.
//!
//! Reads `config.toml` from the data directory (`~/.imarchive/` by default)
//! and deserializes it into [`ArchiveConfig`]. Falls back to defaults when
//! the file is missing or malformed.

use std::path::{Path, PathBuf};

use imarchive_types::config::ArchiveConfig;

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`ArchiveConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_config(data_dir: &Path) -> ArchiveConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ArchiveConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ArchiveConfig::default();
        }
    };

    match toml::from_str::<ArchiveConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ArchiveConfig::default()
        }
    }
}

/// Resolve the data directory.
///
/// Priority:
/// 1. `IMARCHIVE_DATA_DIR` environment variable
/// 2. `~/.imarchive`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("IMARCHIVE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".imarchive");
    }

    PathBuf::from(".imarchive")
}

/// Where Messages keeps its store on macOS: `~/Library/Messages/chat.db`.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("Library").join("Messages").join("chat.db"))
}

/// Pick the database to open: explicit override, then config, then the
/// platform default.
pub fn resolve_database_path(
    override_path: Option<PathBuf>,
    config: &ArchiveConfig,
) -> Option<PathBuf> {
    override_path
        .or_else(|| config.database_path.clone())
        .or_else(default_database_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await;
        assert_eq!(config.page_size, 50);
        assert_eq!(config.database_path, None);
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
database_path = "/tmp/backup/chat.db"
page_size = 20
search_timeout_secs = 15
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/backup/chat.db")));
        assert_eq!(config.page_size, 20);
        assert_eq!(config.search_timeout_secs, Some(15));
        assert_eq!(config.context_half_width, 25);
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "page_size = \"many\"")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.page_size, 50);
    }

    #[tokio::test]
    async fn load_config_unreadable_path_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::create_dir(tmp.path().join("config.toml")).await.unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn resolve_database_path_prefers_override() {
        let config = ArchiveConfig {
            database_path: Some(PathBuf::from("/from/config.db")),
            ..ArchiveConfig::default()
        };
        assert_eq!(
            resolve_database_path(Some(PathBuf::from("/from/flag.db")), &config),
            Some(PathBuf::from("/from/flag.db"))
        );
        assert_eq!(
            resolve_database_path(None, &config),
            Some(PathBuf::from("/from/config.db"))
        );
    }

    #[test]
    fn test_resolve_data_dir_from_env() {
        // SAFETY: This test is single-threaded and restores the env var immediately.
        unsafe {
            std::env::set_var("IMARCHIVE_DATA_DIR", "/tmp/test-imarchive");
        }
        let dir = resolve_data_dir();
        assert_eq!(dir, PathBuf::from("/tmp/test-imarchive"));
        unsafe {
            std::env::remove_var("IMARCHIVE_DATA_DIR");
        }
    }
}
