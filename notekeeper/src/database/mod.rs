//! Database module
//!
//! This module provides all database functionality including:
//! - Schema and migrations
//! - Model definitions
//! - SQL access and live queries over the notes table
//! - The process-wide database handle

pub mod dao;
pub mod models;
pub mod observer;
pub mod schema;

pub use dao::{search_pattern, NoteDao};
pub use models::*;
pub use observer::{InvalidationTracker, LiveQuery};
pub use schema::initialize_database;

use crate::config::StoreConfig;
use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Build connection options shared by migration and application connections.
fn connect_options(config: &StoreConfig) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(&config.database_path)
        .create_if_missing(true)
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .journal_mode(SqliteJournalMode::Wal)
}

/// Create and initialize a database connection pool.
///
/// Migrations run on a dedicated single-connection pool that is closed
/// before the application pool is created, so every pooled connection
/// sees the migrated schema.
pub async fn create_pool(config: &StoreConfig) -> Result<SqlitePool> {
    tracing::info!("Creating database connection pool at: {:?}", config.database_path);

    if let Some(parent) = config.database_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let migration_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options(config))
        .await?;

    initialize_database(&migration_pool).await?;
    migration_pool.close().await;

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .connect_with(connect_options(config))
        .await?;

    tracing::info!("Database pool created successfully");

    Ok(pool)
}

/// The notes database: connection pool, SQL access and change tracking
pub struct NoteDatabase {
    pool: SqlitePool,
    dao: NoteDao,
    tracker: InvalidationTracker,
}

impl NoteDatabase {
    /// Open (creating and migrating if needed) the database described by `config`
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let pool = create_pool(config).await?;
        Ok(Self::from_pool(pool))
    }

    /// Wrap an already migrated pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        let tracker = InvalidationTracker::new();
        let dao = NoteDao::new(pool.clone(), tracker.clone());

        Self { pool, dao, tracker }
    }

    /// The process-wide instance, opened by whichever caller gets here first.
    ///
    /// Later calls return the same instance and ignore `config`.
    pub async fn shared(config: &StoreConfig) -> Result<Arc<NoteDatabase>> {
        static SHARED: DatabaseCell = DatabaseCell::new();
        SHARED.get_or_open(config).await
    }

    pub fn dao(&self) -> &NoteDao {
        &self.dao
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn tracker(&self) -> &InvalidationTracker {
        &self.tracker
    }

    /// Live list of all notes, newest id first
    pub fn observe_all_notes(&self) -> LiveQuery<Vec<Note>> {
        let dao = self.dao.clone();
        LiveQuery::spawn(&self.tracker, "all_notes", move || {
            let dao = dao.clone();
            async move { dao.all_notes().await }
        })
    }

    /// Live list of notes whose title or body matches a `LIKE` pattern
    pub fn observe_search(&self, pattern: String) -> LiveQuery<Vec<Note>> {
        let dao = self.dao.clone();
        LiveQuery::spawn(&self.tracker, "search_notes", move || {
            let dao = dao.clone();
            let pattern = pattern.clone();
            async move { dao.search_notes(&pattern).await }
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database closed");
    }
}

/// Holds at most one `NoteDatabase`, constructed on first use.
///
/// Concurrent first callers wait for a single construction and all receive
/// the same instance. A failed construction leaves the cell empty.
pub struct DatabaseCell {
    cell: OnceCell<Arc<NoteDatabase>>,
}

impl DatabaseCell {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    pub async fn get_or_open(&self, config: &StoreConfig) -> Result<Arc<NoteDatabase>> {
        let db = self
            .cell
            .get_or_try_init(|| async {
                tracing::info!("Opening shared database");
                NoteDatabase::open(config).await.map(Arc::new)
            })
            .await?;

        Ok(Arc::clone(db))
    }

    /// The instance, if one has been opened
    pub fn get(&self) -> Option<Arc<NoteDatabase>> {
        self.cell.get().cloned()
    }
}

impl Default for DatabaseCell {
    fn default() -> Self {
        Self::new()
    }
}
