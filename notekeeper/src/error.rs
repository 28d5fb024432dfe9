//! Error types for Notekeeper
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized for a UI bridge.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Note not found: {0}")]
    NoteNotFound(i64),

    #[error("Database schema version {found} is newer than the supported version {supported}")]
    SchemaTooNew { found: i32, supported: i32 },

    #[error("Live query channel closed")]
    ChannelClosed,

    #[error("{0}")]
    Generic(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_display_string() {
        let err = AppError::Validation("Please enter note title".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#""Validation error: Please enter note title""#);
    }

    #[test]
    fn test_schema_too_new_message() {
        let err = AppError::SchemaTooNew {
            found: 7,
            supported: 2,
        };
        assert_eq!(
            err.to_string(),
            "Database schema version 7 is newer than the supported version 2"
        );
    }
}
