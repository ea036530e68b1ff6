//! Note domain model.
//!
//! # Responsibility
//! - Define the note record together with its eagerly loaded relations.
//! - Provide the completion derivation and lifecycle helpers.
//!
//! # Invariants
//! - `content` non-empty implies `todo_items` empty, and the reverse.
//! - `is_all_done` as written by create/content updates equals
//!   [`derive_all_done`] over `todo_items`.
//! - `deleted_at == None` means the note is active.
//! - `owner_id` never changes after creation.

use crate::model::attachment::{Event, Reminder};
use crate::model::tag::Tag;
use crate::model::UserId;
use serde::{Deserialize, Serialize};

/// Identifier of a note.
pub type NoteId = i64;
/// Identifier of one checklist entry.
pub type ToDoItemId = i64;

/// Checklist entry exclusively owned by one note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToDoItem {
    #[serde(rename = "todo_id")]
    pub id: ToDoItemId,
    pub note_id: NoteId,
    pub content: String,
    pub is_done: bool,
}

/// Checklist entry as supplied by callers, before ids are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewToDoItem {
    pub content: String,
    #[serde(default)]
    pub is_done: bool,
}

impl NewToDoItem {
    pub fn new(content: impl Into<String>, is_done: bool) -> Self {
        Self {
            content: content.into(),
            is_done,
        }
    }
}

/// Canonical note record with relations attached.
///
/// Serialized field names follow the external JSON contract
/// (`note_id`, `user_id`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(rename = "note_id")]
    pub id: NoteId,
    #[serde(rename = "user_id")]
    pub owner_id: UserId,
    pub title: String,
    /// Free-text body. Empty while the note is in checklist mode.
    pub content: String,
    pub color: String,
    pub priority: i64,
    pub is_todo: bool,
    pub is_all_done: bool,
    pub created_at: String,
    pub updated_at: String,
    /// Soft-delete tombstone; serialized as `""` while active.
    #[serde(with = "empty_as_none", default)]
    pub deleted_at: Option<String>,
    /// Ordered by insertion position.
    pub todo_items: Vec<ToDoItem>,
    pub tags: Vec<Tag>,
    pub reminders: Vec<Reminder>,
    pub event: Option<Event>,
}

impl Note {
    /// Returns whether this note is visible to list/get operations.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Derives the completion flag from checklist item states.
///
/// An empty checklist is trivially complete.
pub fn derive_all_done<I>(done_flags: I) -> bool
where
    I: IntoIterator<Item = bool>,
{
    done_flags.into_iter().all(|is_done| is_done)
}

mod empty_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.filter(|text| !text.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::derive_all_done;

    #[test]
    fn empty_checklist_is_complete() {
        assert!(derive_all_done(Vec::new()));
    }

    #[test]
    fn one_open_item_makes_checklist_incomplete() {
        assert!(!derive_all_done([true, false, true]));
        assert!(derive_all_done([true, true]));
    }
}
