//! Database models
//!
//! Rust structs representing database entities.
//! Field names serialize as the table's column names.

use crate::config::{NEW_NOTE_ID, UNSET_COLOR};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A short text note shown as a colored card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Store-assigned; `NEW_NOTE_ID` until inserted
    pub id: i64,
    #[sqlx(rename = "noteTitle")]
    pub note_title: String,
    #[sqlx(rename = "noteBody")]
    pub note_body: String,
    /// ARGB color, `UNSET_COLOR` until first rendered
    #[sqlx(rename = "backgroundColor")]
    #[serde(default)]
    pub background_color: i32,
}

impl Note {
    /// A note that has not been stored yet
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: NEW_NOTE_ID,
            note_title: title.into(),
            note_body: body.into(),
            background_color: UNSET_COLOR,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id == NEW_NOTE_ID
    }

    pub fn has_color(&self) -> bool {
        self.background_color != UNSET_COLOR
    }

    /// Same card as `other`: id and text match, color may differ.
    pub fn same_item(&self, other: &Note) -> bool {
        self.id == other.id
            && self.note_title == other.note_title
            && self.note_body == other.note_body
    }

    /// Copy of this note with new text, keeping id and color
    pub fn edited(&self, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: self.id,
            note_title: title.into(),
            note_body: body.into(),
            background_color: self.background_color,
        }
    }
}

/// Pack an opaque RGB color into the ARGB integer stored per note.
pub fn rgb(red: u8, green: u8, blue: u8) -> i32 {
    let argb =
        0xFF00_0000u32 | (u32::from(red) << 16) | (u32::from(green) << 8) | u32::from(blue);
    argb as i32
}

/// Pick a random opaque color. Never returns `UNSET_COLOR`.
pub fn random_color<R: Rng>(rng: &mut R) -> i32 {
    rgb(rng.gen(), rng.gen(), rng.gen())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_note_is_unsaved_and_uncolored() {
        let note = Note::new("Groceries", "milk");
        assert!(note.is_new());
        assert!(!note.has_color());
        assert_eq!(note.id, NEW_NOTE_ID);
    }

    #[test]
    fn test_rgb_is_opaque() {
        assert_eq!(rgb(0, 0, 0) as u32, 0xFF00_0000);
        assert_eq!(rgb(0x12, 0x34, 0x56) as u32, 0xFF12_3456);
    }

    #[test]
    fn test_random_color_never_unset() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            assert_ne!(random_color(&mut rng), UNSET_COLOR);
        }
    }

    #[test]
    fn test_same_item_ignores_color() {
        let a = Note {
            id: 3,
            note_title: "t".to_string(),
            note_body: "b".to_string(),
            background_color: UNSET_COLOR,
        };
        let b = Note {
            background_color: rgb(1, 2, 3),
            ..a.clone()
        };

        assert!(a.same_item(&b));
        assert_ne!(a, b);
        assert!(!a.same_item(&a.edited("t", "other")));
    }

    #[test]
    fn test_serializes_with_column_names() {
        let note = Note::new("Title", "Body");
        let json = serde_json::to_value(&note).unwrap();

        assert_eq!(json["noteTitle"], "Title");
        assert_eq!(json["noteBody"], "Body");
        assert_eq!(json["backgroundColor"], 0);
    }
}
