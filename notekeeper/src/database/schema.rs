//! Database schema and migrations
//!
//! This module handles database initialization and schema migrations.
//! Migrations are additive: each one only creates or extends tables.

use crate::config::LATEST_SCHEMA_VERSION;
use crate::error::{AppError, Result};
use sqlx::{sqlite::SqlitePool, Row};

/// Initialize database with the latest schema
pub async fn initialize_database(pool: &SqlitePool) -> Result<()> {
    migrate_to(pool, LATEST_SCHEMA_VERSION).await
}

/// Bring the database up to `target_version`.
///
/// Versions already applied are skipped. A database recorded at a newer
/// version than this build knows is rejected untouched.
pub async fn migrate_to(pool: &SqlitePool, target_version: i32) -> Result<()> {
    tracing::info!("Initializing database schema");

    // Create migrations table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    let current_version = schema_version(pool).await?;

    tracing::info!("Current database version: {}", current_version);

    if current_version > LATEST_SCHEMA_VERSION {
        return Err(AppError::SchemaTooNew {
            found: current_version,
            supported: LATEST_SCHEMA_VERSION,
        });
    }

    apply_migrations(pool, current_version, target_version).await?;

    tracing::info!("Database initialization complete");
    Ok(())
}

/// Highest applied migration version, 0 for a fresh database
pub async fn schema_version(pool: &SqlitePool) -> Result<i32> {
    let version: i32 = sqlx::query("SELECT COALESCE(MAX(version), 0) FROM migrations")
        .fetch_one(pool)
        .await?
        .get(0);

    Ok(version)
}

async fn apply_migrations(
    pool: &SqlitePool,
    current_version: i32,
    target_version: i32,
) -> Result<()> {
    for (version, sql) in get_migrations() {
        if version <= current_version || version > target_version {
            continue;
        }

        tracing::info!("Applying migration version {}", version);

        // Schema change and its version record commit together
        let mut tx = pool.begin().await?;

        for statement in sql.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        sqlx::query("INSERT INTO migrations (version) VALUES (?)")
            .bind(version)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Migration version {} applied successfully", version);
    }

    Ok(())
}

fn get_migrations() -> Vec<(i32, &'static str)> {
    vec![
        (1, include_str!("migrations/001_create_notes.sql")),
        (2, include_str!("migrations/002_add_background_color.sql")),
    ]
}
