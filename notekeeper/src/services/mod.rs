//! Services module
//!
//! UI-facing logic that sits on top of the repository.

pub mod diff;
pub mod tasks;
pub mod view_model;

pub use diff::{apply_edits, diff_lists, diff_notes, ListEdit};
pub use tasks::TaskScope;
pub use view_model::{NoteViewModel, WriteFailure, WriteOp};
