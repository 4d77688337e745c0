//! Configuration types for imarchive.
//!
//! `ArchiveConfig` represents the `config.toml` in the data directory that
//! controls the default store path, page sizes, and search limits.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Store file opened when no path is given on the command line.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Messages per page when paging through a chat thread.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Messages on each side of the target in a context window.
    #[serde(default = "default_context_half_width")]
    pub context_half_width: u32,

    /// Maximum number of search results.
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,

    /// Soft timeout for a full-history search. The scan itself is not cancelled.
    #[serde(default)]
    pub search_timeout_secs: Option<u64>,

    /// Rows fetched per round-trip during the decoded-content scan.
    #[serde(default = "default_scan_batch_size")]
    pub scan_batch_size: u32,
}

fn default_page_size() -> u32 {
    50
}

fn default_context_half_width() -> u32 {
    25
}

fn default_search_limit() -> u32 {
    100
}

fn default_scan_batch_size() -> u32 {
    500
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            page_size: default_page_size(),
            context_half_width: default_context_half_width(),
            search_limit: default_search_limit(),
            search_timeout_secs: None,
            scan_batch_size: default_scan_batch_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = ArchiveConfig::default();
        assert!(config.database_path.is_none());
        assert_eq!(config.page_size, 50);
        assert_eq!(config.context_half_width, 25);
        assert_eq!(config.search_limit, 100);
        assert_eq!(config.search_timeout_secs, None);
        assert_eq!(config.scan_batch_size, 500);
    }

    #[test]
    fn test_config_deserialize_with_defaults() {
        let config: ArchiveConfig = toml::from_str("").unwrap();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.search_limit, 100);
    }

    #[test]
    fn test_config_deserialize_with_values() {
        let toml_str = r#"
database_path = "/Users/me/Backups/chat.db"
page_size = 20
context_half_width = 5
search_limit = 30
search_timeout_secs = 15
"#;
        let config: ArchiveConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.database_path,
            Some(PathBuf::from("/Users/me/Backups/chat.db"))
        );
        assert_eq!(config.page_size, 20);
        assert_eq!(config.context_half_width, 5);
        assert_eq!(config.search_limit, 30);
        assert_eq!(config.search_timeout_secs, Some(15));
        assert_eq!(config.scan_batch_size, 500);
    }
}
