//! Application configuration
//!
//! Central location for configuration constants and the on-disk
//! store configuration loaded at startup.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

// ===== Database =====

/// File name of the notes database inside the data directory
pub const DATABASE_FILE_NAME: &str = "note_db";

/// File name of the store configuration inside the data directory
pub const STORE_CONFIG_FILE_NAME: &str = "store.json";

/// Schema version this build migrates databases to
pub const LATEST_SCHEMA_VERSION: i32 = 2;

/// Default size of the application connection pool
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default time a connection waits on a locked database, in milliseconds
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

// ===== Notes =====

/// Id a caller passes to let the store assign one on insert
pub const NEW_NOTE_ID: i64 = 0;

/// Background color of a note that has never been rendered
pub const UNSET_COLOR: i32 = 0;

// ===== View-model =====

/// Buffered write failures per view-model before slow subscribers lag
pub const WRITE_FAILURE_CHANNEL_CAPACITY: usize = 32;

/// Store configuration, persisted as JSON next to the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    pub database_path: PathBuf,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

impl StoreConfig {
    /// Default configuration with the database stored in `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            database_path: dir.join(DATABASE_FILE_NAME),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    /// Load configuration from a JSON file.
    ///
    /// A missing file yields the defaults for the file's directory.
    pub async fn load(path: &Path) -> Result<Self> {
        if !fs::try_exists(path).await? {
            tracing::info!("No store config at {:?}, using defaults", path);
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            return Ok(Self::in_dir(dir));
        }

        let content = fs::read_to_string(path).await?;
        let config: StoreConfig = serde_json::from_str(&content)?;

        tracing::debug!("Loaded store config from {:?}", path);
        Ok(config)
    }

    /// Save configuration as pretty-printed JSON
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;

        tracing::debug!("Saved store config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(STORE_CONFIG_FILE_NAME);

        let config = StoreConfig::load(&path).await.unwrap();

        assert_eq!(config, StoreConfig::in_dir(temp.path()));
        assert_eq!(config.database_path, temp.path().join("note_db"));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(STORE_CONFIG_FILE_NAME);

        let mut config = StoreConfig::in_dir(temp.path());
        config.max_connections = 2;
        config.save(&path).await.unwrap();

        let loaded = StoreConfig::load(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_partial_config_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(STORE_CONFIG_FILE_NAME);
        tokio::fs::write(&path, r#"{ "database_path": "/tmp/notes.db" }"#)
            .await
            .unwrap();

        let loaded = StoreConfig::load(&path).await.unwrap();

        assert_eq!(loaded.database_path, PathBuf::from("/tmp/notes.db"));
        assert_eq!(loaded.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(loaded.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
    }

    #[tokio::test]
    async fn test_malformed_config_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(STORE_CONFIG_FILE_NAME);
        tokio::fs::write(&path, "not json").await.unwrap();

        assert!(StoreConfig::load(&path).await.is_err());
    }
}
