//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist notes together with their checklist items atomically.
//! - Eager-load tags, todo items, reminders and the event of a note.
//! - Own soft-delete / restore primitives over the `deleted_at` column.
//!
//! # Invariants
//! - `deleted_at = ''` marks an active row; every list query filters on it.
//! - Checklist replacement is delete-then-insert inside one transaction.
//! - Writes are scoped by `(id, owner_id)`; a zero-row update is `NotFound`.

use crate::model::attachment::{Event, NewReminder, Reminder, ReminderId};
use crate::model::note::{NewToDoItem, Note, NoteId, ToDoItem};
use crate::model::tag::Tag;
use crate::model::timestamp::optional_from_db;
use crate::model::UserId;
use crate::repo::{
    bool_to_int, ensure_schema_ready, int_to_bool, map_owner_insert_error, RepoError, RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    title,
    content,
    color,
    priority,
    is_todo,
    is_all_done,
    created_at,
    updated_at,
    deleted_at
FROM notes";

/// Row visibility for single-note lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteVisibility {
    /// Only rows with `deleted_at = ''`.
    ActiveOnly,
    /// Active and soft-deleted rows. Reserved for delete/restore paths.
    IncludeDeleted,
}

/// Fully resolved note row for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub owner_id: UserId,
    pub title: String,
    pub content: String,
    pub color: String,
    pub priority: i64,
    pub is_todo: bool,
    pub is_all_done: bool,
    pub created_at: String,
    pub todo_items: Vec<NewToDoItem>,
}

/// Resolved title/body state written by content updates.
///
/// `todo_items = Some(..)` replaces the whole checklist (an empty slice clears
/// it); `None` leaves stored items untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteBodyWrite<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub is_todo: bool,
    pub is_all_done: bool,
    pub updated_at: &'a str,
    pub todo_items: Option<&'a [NewToDoItem]>,
}

/// Repository interface for notes and their attachments.
pub trait NoteRepository {
    /// Inserts the note row and its checklist in one transaction.
    fn insert_note(&self, draft: &NoteDraft) -> RepoResult<NoteId>;
    /// Loads one note with relations attached.
    fn find_note(&self, id: NoteId, visibility: NoteVisibility) -> RepoResult<Option<Note>>;
    /// Lists active notes of one owner, `updated_at DESC, id ASC`.
    fn list_active_notes(&self, owner_id: UserId) -> RepoResult<Vec<Note>>;
    /// Writes title/body state and optionally replaces the checklist.
    fn write_body(&self, id: NoteId, owner_id: UserId, body: &NoteBodyWrite<'_>)
        -> RepoResult<()>;
    fn update_color(&self, id: NoteId, owner_id: UserId, color: &str, updated_at: &str)
        -> RepoResult<()>;
    fn update_priority(
        &self,
        id: NoteId,
        owner_id: UserId,
        priority: i64,
        updated_at: &str,
    ) -> RepoResult<()>;
    fn update_status(
        &self,
        id: NoteId,
        owner_id: UserId,
        is_todo: bool,
        is_all_done: bool,
        updated_at: &str,
    ) -> RepoResult<()>;
    /// Sets `deleted_at` on an active row. Returns `false` when the row was
    /// already soft-deleted.
    fn mark_deleted(&self, id: NoteId, owner_id: UserId, deleted_at: &str) -> RepoResult<bool>;
    /// Clears `deleted_at`. Returns `false` when the row was already active.
    fn clear_deleted(&self, id: NoteId, owner_id: UserId) -> RepoResult<bool>;
    fn insert_reminder(&self, note_id: NoteId, reminder: &NewReminder) -> RepoResult<ReminderId>;
    /// Returns `false` when no such reminder belongs to the note.
    fn delete_reminder(&self, note_id: NoteId, reminder_id: ReminderId) -> RepoResult<bool>;
    /// Creates or replaces the single event of a note.
    fn upsert_event(&self, note_id: NoteId, start_time: &str, end_time: &str) -> RepoResult<()>;
    /// Returns `false` when the note had no event.
    fn delete_event(&self, note_id: NoteId) -> RepoResult<bool>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    fn begin(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert_note(&self, draft: &NoteDraft) -> RepoResult<NoteId> {
        let tx = self.begin()?;
        tx.execute(
            "INSERT INTO notes (
                owner_id,
                title,
                content,
                color,
                priority,
                is_todo,
                is_all_done,
                created_at,
                updated_at,
                deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, '');",
            params![
                draft.owner_id,
                draft.title.as_str(),
                draft.content.as_str(),
                draft.color.as_str(),
                draft.priority,
                bool_to_int(draft.is_todo),
                bool_to_int(draft.is_all_done),
                draft.created_at.as_str(),
            ],
        )
        .map_err(|err| map_owner_insert_error(err, "notes", draft.owner_id))?;
        let note_id = tx.last_insert_rowid();
        insert_todo_items(&tx, note_id, &draft.todo_items)?;
        tx.commit()?;
        Ok(note_id)
    }

    fn find_note(&self, id: NoteId, visibility: NoteVisibility) -> RepoResult<Option<Note>> {
        let include_deleted = visibility == NoteVisibility::IncludeDeleted;
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE id = ?1
               AND (?2 = 1 OR deleted_at = '');"
        ))?;
        let mut rows = stmt.query(params![id, bool_to_int(include_deleted)])?;
        match rows.next()? {
            Some(row) => {
                let mut note = parse_note_row(row)?;
                attach_relations(self.conn, &mut note)?;
                Ok(Some(note))
            }
            None => Ok(None),
        }
    }

    fn list_active_notes(&self, owner_id: UserId) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE owner_id = ?1
               AND deleted_at = ''
             ORDER BY updated_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([owner_id])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        for note in &mut notes {
            attach_relations(self.conn, note)?;
        }
        Ok(notes)
    }

    fn write_body(
        &self,
        id: NoteId,
        owner_id: UserId,
        body: &NoteBodyWrite<'_>,
    ) -> RepoResult<()> {
        let tx = self.begin()?;
        let changed = tx.execute(
            "UPDATE notes
             SET
                title = ?3,
                content = ?4,
                is_todo = ?5,
                is_all_done = ?6,
                updated_at = ?7
             WHERE id = ?1
               AND owner_id = ?2
               AND deleted_at = '';",
            params![
                id,
                owner_id,
                body.title,
                body.content,
                bool_to_int(body.is_todo),
                bool_to_int(body.is_all_done),
                body.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "note", id });
        }

        if let Some(items) = body.todo_items {
            tx.execute("DELETE FROM todo_items WHERE note_id = ?1;", [id])?;
            insert_todo_items(&tx, id, items)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn update_color(
        &self,
        id: NoteId,
        owner_id: UserId,
        color: &str,
        updated_at: &str,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET color = ?3, updated_at = ?4
             WHERE id = ?1 AND owner_id = ?2 AND deleted_at = '';",
            params![id, owner_id, color, updated_at],
        )?;
        ensure_changed(changed, id)
    }

    fn update_priority(
        &self,
        id: NoteId,
        owner_id: UserId,
        priority: i64,
        updated_at: &str,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET priority = ?3, updated_at = ?4
             WHERE id = ?1 AND owner_id = ?2 AND deleted_at = '';",
            params![id, owner_id, priority, updated_at],
        )?;
        ensure_changed(changed, id)
    }

    fn update_status(
        &self,
        id: NoteId,
        owner_id: UserId,
        is_todo: bool,
        is_all_done: bool,
        updated_at: &str,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET is_todo = ?3, is_all_done = ?4, updated_at = ?5
             WHERE id = ?1 AND owner_id = ?2 AND deleted_at = '';",
            params![
                id,
                owner_id,
                bool_to_int(is_todo),
                bool_to_int(is_all_done),
                updated_at
            ],
        )?;
        ensure_changed(changed, id)
    }

    fn mark_deleted(&self, id: NoteId, owner_id: UserId, deleted_at: &str) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET deleted_at = ?3
             WHERE id = ?1 AND owner_id = ?2 AND deleted_at = '';",
            params![id, owner_id, deleted_at],
        )?;
        Ok(changed == 1)
    }

    fn clear_deleted(&self, id: NoteId, owner_id: UserId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET deleted_at = ''
             WHERE id = ?1 AND owner_id = ?2 AND deleted_at <> '';",
            params![id, owner_id],
        )?;
        Ok(changed == 1)
    }

    fn insert_reminder(&self, note_id: NoteId, reminder: &NewReminder) -> RepoResult<ReminderId> {
        self.conn.execute(
            "INSERT INTO reminders (note_id, reminder_time, recurring, frequency)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                note_id,
                reminder.reminder_time.as_str(),
                bool_to_int(reminder.recurring),
                reminder.frequency.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn delete_reminder(&self, note_id: NoteId, reminder_id: ReminderId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM reminders WHERE id = ?1 AND note_id = ?2;",
            params![reminder_id, note_id],
        )?;
        Ok(changed == 1)
    }

    fn upsert_event(&self, note_id: NoteId, start_time: &str, end_time: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO events (note_id, start_time, end_time)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (note_id) DO UPDATE SET
                start_time = excluded.start_time,
                end_time = excluded.end_time;",
            params![note_id, start_time, end_time],
        )?;
        Ok(())
    }

    fn delete_event(&self, note_id: NoteId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM events WHERE note_id = ?1;", [note_id])?;
        Ok(changed == 1)
    }
}

fn ensure_changed(changed: usize, id: NoteId) -> RepoResult<()> {
    if changed == 0 {
        return Err(RepoError::NotFound { entity: "note", id });
    }
    Ok(())
}

fn insert_todo_items(tx: &Transaction<'_>, note_id: NoteId, items: &[NewToDoItem]) -> RepoResult<()> {
    if items.is_empty() {
        return Ok(());
    }
    let mut stmt = tx.prepare(
        "INSERT INTO todo_items (note_id, position, content, is_done)
         VALUES (?1, ?2, ?3, ?4);",
    )?;
    for (position, item) in items.iter().enumerate() {
        stmt.execute(params![
            note_id,
            position as i64,
            item.content.as_str(),
            bool_to_int(item.is_done),
        ])?;
    }
    Ok(())
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    Ok(Note {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        color: row.get("color")?,
        priority: row.get("priority")?,
        is_todo: int_to_bool(row.get("is_todo")?, "notes.is_todo")?,
        is_all_done: int_to_bool(row.get("is_all_done")?, "notes.is_all_done")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: optional_from_db(row.get("deleted_at")?),
        todo_items: Vec::new(),
        tags: Vec::new(),
        reminders: Vec::new(),
        event: None,
    })
}

fn attach_relations(conn: &Connection, note: &mut Note) -> RepoResult<()> {
    note.todo_items = load_todo_items(conn, note.id)?;
    note.tags = load_tags(conn, note.id)?;
    note.reminders = load_reminders(conn, note.id)?;
    note.event = load_event(conn, note.id)?;
    Ok(())
}

fn load_todo_items(conn: &Connection, note_id: NoteId) -> RepoResult<Vec<ToDoItem>> {
    let mut stmt = conn.prepare(
        "SELECT id, note_id, content, is_done
         FROM todo_items
         WHERE note_id = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([note_id])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(ToDoItem {
            id: row.get("id")?,
            note_id: row.get("note_id")?,
            content: row.get("content")?,
            is_done: int_to_bool(row.get("is_done")?, "todo_items.is_done")?,
        });
    }
    Ok(items)
}

fn load_tags(conn: &Connection, note_id: NoteId) -> RepoResult<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.owner_id, t.name
         FROM note_tags nt
         INNER JOIN tags t ON t.id = nt.tag_id
         WHERE nt.note_id = ?1
         ORDER BY t.name COLLATE NOCASE ASC;",
    )?;
    let mut rows = stmt.query([note_id])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(Tag {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
        });
    }
    Ok(tags)
}

fn load_reminders(conn: &Connection, note_id: NoteId) -> RepoResult<Vec<Reminder>> {
    let mut stmt = conn.prepare(
        "SELECT id, note_id, reminder_time, recurring, frequency
         FROM reminders
         WHERE note_id = ?1
         ORDER BY reminder_time ASC, id ASC;",
    )?;
    let mut rows = stmt.query([note_id])?;
    let mut reminders = Vec::new();
    while let Some(row) = rows.next()? {
        reminders.push(Reminder {
            id: row.get("id")?,
            note_id: row.get("note_id")?,
            reminder_time: row.get("reminder_time")?,
            recurring: int_to_bool(row.get("recurring")?, "reminders.recurring")?,
            frequency: row.get("frequency")?,
        });
    }
    Ok(reminders)
}

fn load_event(conn: &Connection, note_id: NoteId) -> RepoResult<Option<Event>> {
    let event = conn
        .query_row(
            "SELECT id, note_id, start_time, end_time
             FROM events
             WHERE note_id = ?1;",
            [note_id],
            |row| {
                Ok(Event {
                    id: row.get(0)?,
                    note_id: row.get(1)?,
                    start_time: row.get(2)?,
                    end_time: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(event)
}
