//! Note repository
//!
//! Hands store operations through to the database unchanged, so the
//! view-model never touches SQL or the connection pool.

use crate::database::{search_pattern, LiveQuery, Note, NoteDatabase};
use crate::error::Result;
use std::sync::Arc;

#[derive(Clone)]
pub struct NoteRepository {
    db: Arc<NoteDatabase>,
}

impl NoteRepository {
    pub fn new(db: Arc<NoteDatabase>) -> Self {
        Self { db }
    }

    pub async fn insert_note(&self, note: &Note) -> Result<i64> {
        self.db.dao().insert_note(note).await
    }

    pub async fn update_note(&self, note: &Note) -> Result<u64> {
        self.db.dao().update_note(note).await
    }

    pub async fn update_color(&self, id: i64, color: i32) -> Result<u64> {
        self.db.dao().update_color(id, color).await
    }

    pub async fn delete_note(&self, note: &Note) -> Result<u64> {
        self.db.dao().delete_note(note).await
    }

    pub async fn get_note(&self, id: i64) -> Result<Note> {
        self.db.dao().get_note(id).await
    }

    pub fn all_notes(&self) -> LiveQuery<Vec<Note>> {
        self.db.observe_all_notes()
    }

    /// Live search; `query` is matched anywhere in title or body
    pub fn search_notes(&self, query: &str) -> LiveQuery<Vec<Note>> {
        self.db.observe_search(search_pattern(query))
    }
}
