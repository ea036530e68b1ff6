//! Note use-case service (consistency engine).
//!
//! # Responsibility
//! - Enforce content-mode exclusivity (text vs checklist) on every write.
//! - Derive `is_all_done` whenever the note body changes. `is_todo` is derived
//!   at creation only; later it changes through `update_status` alone.
//! - Drive the Active -> SoftDeleted -> Active lifecycle.
//! - Route every access through the authorization gate.
//!
//! # Invariants
//! - A note never holds non-empty `content` and a non-empty checklist.
//! - `UpdateStatus` is a manual override: it never re-derives. A manual
//!   `is_all_done` holds until the next body change; a manual `is_todo` holds
//!   until the next `UpdateStatus`.
//! - Soft-deleted notes are invisible except to delete/restore.
//! - Omitted (`None`) fields are left untouched; `Some("")` is a real value.

use crate::model::attachment::{NewReminder, ReminderId};
use crate::model::note::{derive_all_done, NewToDoItem, Note, NoteId};
use crate::model::timestamp::now_timestamp;
use crate::model::validation::{
    validate_body, validate_color, validate_event_window, validate_timestamp,
    validate_todo_items, ValidationError,
};
use crate::repo::note_repo::{NoteBodyWrite, NoteDraft, NoteRepository, NoteVisibility};
use crate::repo::RepoError;
use crate::service::auth::{authorize, AuthContext};
use crate::service::error::{ResourceKind, ServiceError, ServiceResult};
use log::{debug, info};
use serde::Deserialize;

/// Input for note creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    pub todo_items: Vec<NewToDoItem>,
    pub color: String,
    pub priority: i64,
}

/// Partial title/body update. `None` leaves the field as stored.
///
/// Supplying `content` switches the note to text mode and drops the
/// checklist; supplying `todo_items` switches to checklist mode and clears
/// the text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpdateNoteContent {
    pub title: Option<String>,
    pub content: Option<String>,
    pub todo_items: Option<Vec<NewToDoItem>>,
}

/// Manual status override. `None` keeps the stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpdateNoteStatus {
    pub is_todo: Option<bool>,
    pub is_all_done: Option<bool>,
}

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one note owned by the caller, with its checklist, atomically.
    ///
    /// An unregistered caller gets `NotFoundOrForbidden` for the user.
    pub fn create_note(&self, ctx: &AuthContext, request: CreateNoteRequest) -> ServiceResult<Note> {
        validate_body(&request.content, &request.todo_items)?;
        validate_color(&request.color)?;

        let draft = NoteDraft {
            owner_id: ctx.user_id(),
            is_todo: !request.todo_items.is_empty(),
            is_all_done: derive_all_done(request.todo_items.iter().map(|item| item.is_done)),
            title: request.title,
            content: request.content,
            color: request.color,
            priority: request.priority,
            created_at: now_timestamp(),
            todo_items: request.todo_items,
        };
        let note_id = self
            .repo
            .insert_note(&draft)
            .map_err(|err| match err {
                RepoError::NotFound { .. } => {
                    ServiceError::not_found(ResourceKind::User, ctx.user_id())
                }
                other => other.into(),
            })?;
        info!(
            "event=note_create module=note_service status=ok note_id={note_id} user_id={} todo_items={}",
            ctx.user_id(),
            draft.todo_items.len()
        );
        self.reload(note_id)
    }

    /// Gets one active note owned by the caller.
    pub fn get_note(&self, ctx: &AuthContext, note_id: NoteId) -> ServiceResult<Note> {
        self.authorized_note(ctx, note_id, NoteVisibility::ActiveOnly)
    }

    /// Lists the caller's active notes with all relations attached.
    pub fn list_notes(&self, ctx: &AuthContext) -> ServiceResult<Vec<Note>> {
        Ok(self.repo.list_active_notes(ctx.user_id())?)
    }

    /// Updates title and/or body with partial-update semantics.
    pub fn update_title_and_content(
        &self,
        ctx: &AuthContext,
        note_id: NoteId,
        update: UpdateNoteContent,
    ) -> ServiceResult<Note> {
        let note = self.authorized_note(ctx, note_id, NoteVisibility::ActiveOnly)?;

        let content_given = update.content.as_deref().is_some_and(|text| !text.is_empty());
        let items_given = update.todo_items.as_ref().is_some_and(|items| !items.is_empty());
        if content_given && items_given {
            return Err(ValidationError::ContentAndChecklist.into());
        }
        if let Some(items) = update.todo_items.as_deref() {
            validate_todo_items(items)?;
        }

        let title = update.title.unwrap_or(note.title);
        let (content, todo_items) = match (update.content, update.todo_items) {
            (None, None) => (note.content, None),
            (Some(content), None) => (content, Some(Vec::new())),
            (None, Some(items)) => (String::new(), Some(items)),
            // At most one side is non-empty here.
            (Some(content), Some(items)) => {
                if items.is_empty() {
                    (content, Some(items))
                } else {
                    (String::new(), Some(items))
                }
            }
        };

        let is_all_done = match todo_items.as_deref() {
            Some(items) => derive_all_done(items.iter().map(|item| item.is_done)),
            None => note.is_all_done,
        };

        let updated_at = now_timestamp();
        let body = NoteBodyWrite {
            title: &title,
            content: &content,
            is_todo: note.is_todo,
            is_all_done,
            updated_at: &updated_at,
            todo_items: todo_items.as_deref(),
        };
        self.repo
            .write_body(note_id, ctx.user_id(), &body)
            .map_err(|err| note_write_error(err, note_id))?;
        debug!(
            "event=note_update_body module=note_service status=ok note_id={note_id} replaced_items={}",
            todo_items.is_some()
        );
        self.reload(note_id)
    }

    pub fn update_color(&self, ctx: &AuthContext, note_id: NoteId, color: &str) -> ServiceResult<Note> {
        self.authorized_note(ctx, note_id, NoteVisibility::ActiveOnly)?;
        validate_color(color)?;
        self.repo
            .update_color(note_id, ctx.user_id(), color, &now_timestamp())
            .map_err(|err| note_write_error(err, note_id))?;
        self.reload(note_id)
    }

    pub fn update_priority(
        &self,
        ctx: &AuthContext,
        note_id: NoteId,
        priority: i64,
    ) -> ServiceResult<Note> {
        self.authorized_note(ctx, note_id, NoteVisibility::ActiveOnly)?;
        self.repo
            .update_priority(note_id, ctx.user_id(), priority, &now_timestamp())
            .map_err(|err| note_write_error(err, note_id))?;
        self.reload(note_id)
    }

    /// Applies a manual status override without consulting the checklist.
    pub fn update_status(
        &self,
        ctx: &AuthContext,
        note_id: NoteId,
        status: UpdateNoteStatus,
    ) -> ServiceResult<Note> {
        let note = self.authorized_note(ctx, note_id, NoteVisibility::ActiveOnly)?;
        let is_todo = status.is_todo.unwrap_or(note.is_todo);
        let is_all_done = status.is_all_done.unwrap_or(note.is_all_done);
        self.repo
            .update_status(note_id, ctx.user_id(), is_todo, is_all_done, &now_timestamp())
            .map_err(|err| note_write_error(err, note_id))?;
        self.reload(note_id)
    }

    /// Soft-deletes an active note.
    ///
    /// # Errors
    /// - `AlreadyDeleted` when the note is already soft-deleted.
    pub fn delete_note(&self, ctx: &AuthContext, note_id: NoteId) -> ServiceResult<()> {
        let note = self.authorized_note(ctx, note_id, NoteVisibility::IncludeDeleted)?;
        if !note.is_active() {
            return Err(ServiceError::AlreadyDeleted(note_id));
        }
        if !self
            .repo
            .mark_deleted(note_id, ctx.user_id(), &now_timestamp())?
        {
            return Err(ServiceError::AlreadyDeleted(note_id));
        }
        info!(
            "event=note_delete module=note_service status=ok note_id={note_id} user_id={}",
            ctx.user_id()
        );
        Ok(())
    }

    /// Restores a soft-deleted note. Restoring an active note is a no-op.
    pub fn restore_note(&self, ctx: &AuthContext, note_id: NoteId) -> ServiceResult<Note> {
        let note = self.authorized_note(ctx, note_id, NoteVisibility::IncludeDeleted)?;
        if note.is_active() {
            return Ok(note);
        }
        self.repo.clear_deleted(note_id, ctx.user_id())?;
        info!(
            "event=note_restore module=note_service status=ok note_id={note_id} user_id={}",
            ctx.user_id()
        );
        self.reload(note_id)
    }

    pub fn add_reminder(
        &self,
        ctx: &AuthContext,
        note_id: NoteId,
        reminder: NewReminder,
    ) -> ServiceResult<Note> {
        self.authorized_note(ctx, note_id, NoteVisibility::ActiveOnly)?;
        validate_timestamp("reminder_time", &reminder.reminder_time)?;
        let reminder = NewReminder {
            reminder_time: reminder.reminder_time.trim().to_string(),
            recurring: reminder.recurring,
            frequency: reminder.frequency.trim().to_string(),
        };
        self.repo.insert_reminder(note_id, &reminder)?;
        self.reload(note_id)
    }

    pub fn remove_reminder(
        &self,
        ctx: &AuthContext,
        note_id: NoteId,
        reminder_id: ReminderId,
    ) -> ServiceResult<Note> {
        self.authorized_note(ctx, note_id, NoteVisibility::ActiveOnly)?;
        if !self.repo.delete_reminder(note_id, reminder_id)? {
            return Err(ServiceError::not_found(ResourceKind::Reminder, reminder_id));
        }
        self.reload(note_id)
    }

    /// Creates or replaces the calendar event of a note.
    pub fn set_event(
        &self,
        ctx: &AuthContext,
        note_id: NoteId,
        start_time: &str,
        end_time: &str,
    ) -> ServiceResult<Note> {
        self.authorized_note(ctx, note_id, NoteVisibility::ActiveOnly)?;
        validate_event_window(start_time, end_time)?;
        self.repo
            .upsert_event(note_id, start_time.trim(), end_time.trim())?;
        self.reload(note_id)
    }

    /// Removes the calendar event of a note, if any.
    pub fn clear_event(&self, ctx: &AuthContext, note_id: NoteId) -> ServiceResult<Note> {
        self.authorized_note(ctx, note_id, NoteVisibility::ActiveOnly)?;
        self.repo.delete_event(note_id)?;
        self.reload(note_id)
    }

    fn authorized_note(
        &self,
        ctx: &AuthContext,
        note_id: NoteId,
        visibility: NoteVisibility,
    ) -> ServiceResult<Note> {
        let note = self.repo.find_note(note_id, visibility)?;
        authorize(note, ctx, note_id)
    }

    fn reload(&self, note_id: NoteId) -> ServiceResult<Note> {
        self.repo
            .find_note(note_id, NoteVisibility::ActiveOnly)?
            .ok_or_else(|| ServiceError::not_found(ResourceKind::Note, note_id))
    }
}

/// A scoped write that touched no row lost a race with delete/ownership.
fn note_write_error(err: RepoError, note_id: NoteId) -> ServiceError {
    match err {
        RepoError::NotFound { .. } => ServiceError::not_found(ResourceKind::Note, note_id),
        other => other.into(),
    }
}
