//! Data access for the notes table
//!
//! This module provides the SQL for every note operation.
//! Writes that change rows invalidate live queries after they commit.

use super::models::Note;
use super::observer::InvalidationTracker;
use crate::config::NEW_NOTE_ID;
use crate::error::{AppError, Result};
use sqlx::SqlitePool;

/// Build a `LIKE` pattern matching `text` anywhere in a column
pub fn search_pattern(text: &str) -> String {
    format!("%{}%", text)
}

/// SQL access to the notes table
#[derive(Clone)]
pub struct NoteDao {
    pool: SqlitePool,
    tracker: InvalidationTracker,
}

impl NoteDao {
    pub fn new(pool: SqlitePool, tracker: InvalidationTracker) -> Self {
        Self { pool, tracker }
    }

    /// Insert a note, replacing any row with the same id.
    ///
    /// A note with `NEW_NOTE_ID` gets an id from the store. Returns the row id.
    pub async fn insert_note(&self, note: &Note) -> Result<i64> {
        let id = (note.id != NEW_NOTE_ID).then_some(note.id);

        let result = sqlx::query(
            r#"
            INSERT OR REPLACE INTO notes (id, noteTitle, noteBody, backgroundColor)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(&note.note_title)
        .bind(&note.note_body)
        .bind(note.background_color)
        .execute(&self.pool)
        .await?;

        let row_id = result.last_insert_rowid();
        self.tracker.notify();

        tracing::debug!("Inserted note: {}", row_id);
        Ok(row_id)
    }

    /// Overwrite title, body and color of the row with the note's id.
    ///
    /// Returns the number of rows changed; a missing row is not an error.
    pub async fn update_note(&self, note: &Note) -> Result<u64> {
        let rows = sqlx::query(
            r#"
            UPDATE notes SET noteTitle = ?, noteBody = ?, backgroundColor = ?
            WHERE id = ?
            "#,
        )
        .bind(&note.note_title)
        .bind(&note.note_body)
        .bind(note.background_color)
        .bind(note.id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows > 0 {
            self.tracker.notify();
        }

        tracing::debug!("Updated note {} ({} rows)", note.id, rows);
        Ok(rows)
    }

    /// Set only the background color of a note, leaving its text alone
    pub async fn update_color(&self, id: i64, color: i32) -> Result<u64> {
        let rows = sqlx::query("UPDATE notes SET backgroundColor = ? WHERE id = ?")
            .bind(color)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows > 0 {
            self.tracker.notify();
        }

        tracing::debug!("Recolored note {} ({} rows)", id, rows);
        Ok(rows)
    }

    /// Delete the row with the note's id
    pub async fn delete_note(&self, note: &Note) -> Result<u64> {
        let rows = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(note.id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows > 0 {
            self.tracker.notify();
        }

        tracing::debug!("Deleted note {} ({} rows)", note.id, rows);
        Ok(rows)
    }

    /// Get a note by ID
    pub async fn get_note(&self, id: i64) -> Result<Note> {
        let note = sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NoteNotFound(id))?;

        Ok(note)
    }

    /// All notes, newest id first
    pub async fn all_notes(&self) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>("SELECT * FROM notes ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(notes)
    }

    /// Notes whose title or body matches a `LIKE` pattern
    pub async fn search_notes(&self, pattern: &str) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT * FROM notes
            WHERE noteTitle LIKE ? OR noteBody LIKE ?
            "#,
        )
        .bind(pattern)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    pub async fn count_notes(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notes")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
