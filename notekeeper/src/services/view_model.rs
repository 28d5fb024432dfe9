//! Notes view-model
//!
//! UI-facing entry point: live note lists for rendering and fire-and-forget
//! writes. Writes go through one queue per view-model and reach the store in
//! the order they were dispatched.

use super::tasks::TaskScope;
use crate::config::WRITE_FAILURE_CHANNEL_CAPACITY;
use crate::database::{random_color, LiveQuery, Note};
use crate::error::{AppError, Result};
use crate::repository::NoteRepository;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Which write a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOp {
    Insert,
    Update,
    Recolor,
    Delete,
}

/// A dispatched write that did not reach the store
#[derive(Debug, Clone, Serialize)]
pub struct WriteFailure {
    pub op: WriteOp,
    pub note_id: i64,
    pub message: String,
}

enum WriteCommand {
    Write { op: WriteOp, note: Note },
    /// Answered once every write queued before it has finished
    Barrier(oneshot::Sender<()>),
}

/// Exposes notes to a UI and forwards its edits to the repository
pub struct NoteViewModel {
    repo: NoteRepository,
    scope: TaskScope,
    writes: mpsc::UnboundedSender<WriteCommand>,
    failures: broadcast::Sender<WriteFailure>,
}

impl NoteViewModel {
    /// Create a view-model and start its writer. Must be called from within a Tokio runtime.
    pub fn new(repo: NoteRepository) -> Self {
        let (failures, _) = broadcast::channel(WRITE_FAILURE_CHANNEL_CAPACITY);
        let (writes, queue) = mpsc::unbounded_channel();

        let scope = TaskScope::new("note_view_model");
        scope.spawn(run_writer(repo.clone(), queue, failures.clone()));

        Self {
            repo,
            scope,
            writes,
            failures,
        }
    }

    /// All notes, newest first, refreshed after every write
    pub fn all_notes(&self) -> LiveQuery<Vec<Note>> {
        self.repo.all_notes()
    }

    /// Notes containing `query` in title or body, refreshed after every write
    pub fn search_notes(&self, query: &str) -> LiveQuery<Vec<Note>> {
        self.repo.search_notes(query)
    }

    /// Writes that failed after being dispatched
    pub fn write_failures(&self) -> broadcast::Receiver<WriteFailure> {
        self.failures.subscribe()
    }

    pub fn add_note(&self, note: Note) {
        self.dispatch(WriteOp::Insert, note);
    }

    pub fn update_note(&self, note: Note) {
        self.dispatch(WriteOp::Update, note);
    }

    pub fn delete_note(&self, note: Note) {
        self.dispatch(WriteOp::Delete, note);
    }

    /// Save a note from the "new note" form
    pub fn submit_new_note(&self, title: &str, body: &str) -> Result<()> {
        validate_title(title)?;
        self.add_note(Note::new(title.trim(), body.trim()));
        Ok(())
    }

    /// Save edits to an existing note, keeping its id and color
    pub fn submit_edit(&self, note: &Note, title: &str, body: &str) -> Result<()> {
        validate_title(title)?;
        self.update_note(note.edited(title.trim(), body.trim()));
        Ok(())
    }

    /// Give a note its card color the first time it is shown.
    ///
    /// An uncolored note gets a random color which is written back; a
    /// colored note is returned as is. Only the color column is written.
    pub fn assign_color_if_unset(&self, note: Note) -> Note {
        if note.has_color() {
            return note;
        }

        let colored = Note {
            background_color: random_color(&mut rand::thread_rng()),
            ..note
        };
        self.dispatch(WriteOp::Recolor, colored.clone());
        colored
    }

    /// Wait for every write dispatched so far to finish
    pub async fn settle(&self) {
        let (done, finished) = oneshot::channel();
        if self.writes.send(WriteCommand::Barrier(done)).is_err() {
            return;
        }
        // Dropped unanswered when the writer is cancelled
        let _ = finished.await;
    }

    /// Tear down: writes still queued or running are cancelled
    pub fn clear(&self) {
        tracing::debug!("Clearing note view-model");
        self.scope.cancel();
    }

    fn dispatch(&self, op: WriteOp, note: Note) {
        let note_id = note.id;
        if self.writes.send(WriteCommand::Write { op, note }).is_err() {
            tracing::debug!("Dropped {:?} for note {} after teardown", op, note_id);
        }
    }
}

impl Drop for NoteViewModel {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Apply queued writes one at a time, in order
async fn run_writer(
    repo: NoteRepository,
    mut queue: mpsc::UnboundedReceiver<WriteCommand>,
    failures: broadcast::Sender<WriteFailure>,
) {
    while let Some(command) = queue.recv().await {
        let (op, note) = match command {
            WriteCommand::Write { op, note } => (op, note),
            WriteCommand::Barrier(done) => {
                let _ = done.send(());
                continue;
            }
        };

        let result = match op {
            WriteOp::Insert => repo.insert_note(&note).await.map(|_| ()),
            WriteOp::Update => repo.update_note(&note).await.map(|_| ()),
            WriteOp::Recolor => repo
                .update_color(note.id, note.background_color)
                .await
                .map(|_| ()),
            WriteOp::Delete => repo.delete_note(&note).await.map(|_| ()),
        };

        if let Err(e) = result {
            tracing::error!("Note {:?} failed for note {}: {}", op, note.id, e);
            // No subscribers is fine
            let _ = failures.send(WriteFailure {
                op,
                note_id: note.id,
                message: e.to_string(),
            });
        }
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Please enter note title".to_string()));
    }
    Ok(())
}
