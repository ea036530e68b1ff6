//! Time-based note attachments.
//!
//! Reminders (many per note) and the calendar event (at most one per note)
//! are carried along with a note but take no part in its consistency rules.

use crate::model::note::NoteId;
use serde::{Deserialize, Serialize};

pub type ReminderId = i64;
pub type EventId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    #[serde(rename = "reminder_id")]
    pub id: ReminderId,
    pub note_id: NoteId,
    pub reminder_time: String,
    pub recurring: bool,
    /// Free-form recurrence label (`daily`, `weekly`, ...). Empty when one-shot.
    pub frequency: String,
}

/// Reminder fields as supplied by callers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewReminder {
    pub reminder_time: String,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub frequency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "event_id")]
    pub id: EventId,
    pub note_id: NoteId,
    pub start_time: String,
    pub end_time: String,
}
