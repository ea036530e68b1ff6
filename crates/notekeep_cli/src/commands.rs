//! Command handlers: map parsed commands onto core services.

use crate::cli::{Acting, Command, NoteCommand, TagCommand, UserCommand};
use anyhow::Result;
use notekeep_core::{
    AuthContext, CreateNoteRequest, NewReminder, NoteService, SqliteNoteRepository,
    SqliteTagRepository, SqliteUserRepository, TagService, UpdateNoteContent, UpdateNoteStatus,
    UserService,
};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;

/// Executes one command and returns the JSON document to print.
pub fn execute(conn: &Connection, command: Command) -> Result<serde_json::Value> {
    match command {
        Command::User(command) => user(conn, command),
        Command::Note(command) => note(conn, command),
        Command::Tag(command) => tag(conn, command),
    }
}

fn ctx(acting: Acting) -> AuthContext {
    AuthContext::new(acting.user_id)
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}

fn user(conn: &Connection, command: UserCommand) -> Result<serde_json::Value> {
    let service = UserService::new(SqliteUserRepository::try_new(conn)?);
    match command {
        UserCommand::Register {
            username,
            email,
            password_hash,
        } => to_json(&service.register_user(&username, &email, &password_hash)?),
        UserCommand::Show(acting) => to_json(&service.get_user(acting.user_id)?),
        UserCommand::Rename { acting, username } => {
            to_json(&service.change_username(&ctx(acting), &username)?)
        }
        UserCommand::SetPasswordHash {
            acting,
            password_hash,
        } => {
            service.change_password_hash(&ctx(acting), &password_hash)?;
            Ok(json!({ "message": "password updated" }))
        }
    }
}

fn note(conn: &Connection, command: NoteCommand) -> Result<serde_json::Value> {
    let service = NoteService::new(SqliteNoteRepository::try_new(conn)?);
    match command {
        NoteCommand::Create {
            acting,
            title,
            content,
            items,
            color,
            priority,
        } => {
            let request = CreateNoteRequest {
                title,
                content,
                todo_items: items,
                color,
                priority,
            };
            to_json(&service.create_note(&ctx(acting), request)?)
        }
        NoteCommand::List(acting) => to_json(&service.list_notes(&ctx(acting))?),
        NoteCommand::Show { acting, id } => to_json(&service.get_note(&ctx(acting), id)?),
        NoteCommand::Update {
            acting,
            id,
            title,
            content,
            items,
            clear_items,
        } => {
            let todo_items = if clear_items || !items.is_empty() {
                Some(items)
            } else {
                None
            };
            let update = UpdateNoteContent {
                title,
                content,
                todo_items,
            };
            to_json(&service.update_title_and_content(&ctx(acting), id, update)?)
        }
        NoteCommand::Color { acting, id, color } => {
            to_json(&service.update_color(&ctx(acting), id, &color)?)
        }
        NoteCommand::Priority {
            acting,
            id,
            priority,
        } => to_json(&service.update_priority(&ctx(acting), id, priority)?),
        NoteCommand::Status {
            acting,
            id,
            is_todo,
            all_done,
        } => {
            let status = UpdateNoteStatus {
                is_todo,
                is_all_done: all_done,
            };
            to_json(&service.update_status(&ctx(acting), id, status)?)
        }
        NoteCommand::Delete { acting, id } => {
            service.delete_note(&ctx(acting), id)?;
            Ok(json!({ "message": "note deleted", "note_id": id }))
        }
        NoteCommand::Restore { acting, id } => to_json(&service.restore_note(&ctx(acting), id)?),
        NoteCommand::Remind {
            acting,
            id,
            at,
            recurring,
            frequency,
        } => {
            let reminder = NewReminder {
                reminder_time: at,
                recurring,
                frequency,
            };
            to_json(&service.add_reminder(&ctx(acting), id, reminder)?)
        }
        NoteCommand::Unremind {
            acting,
            id,
            reminder_id,
        } => to_json(&service.remove_reminder(&ctx(acting), id, reminder_id)?),
        NoteCommand::Event {
            acting,
            id,
            start,
            end,
        } => to_json(&service.set_event(&ctx(acting), id, &start, &end)?),
        NoteCommand::ClearEvent { acting, id } => to_json(&service.clear_event(&ctx(acting), id)?),
    }
}

fn tag(conn: &Connection, command: TagCommand) -> Result<serde_json::Value> {
    let service = TagService::new(SqliteTagRepository::try_new(conn)?);
    match command {
        TagCommand::Create { acting, name } => to_json(&service.create_tag(&ctx(acting), &name)?),
        TagCommand::List(acting) => to_json(&service.list_tags(&ctx(acting))?),
        TagCommand::Show { acting, id } => to_json(&service.get_tag(&ctx(acting), id)?),
        TagCommand::Rename { acting, id, name } => {
            to_json(&service.update_tag_name(&ctx(acting), id, &name)?)
        }
        TagCommand::Delete { acting, id } => {
            service.delete_tag(&ctx(acting), id)?;
            Ok(json!({ "message": "tag deleted", "tag_id": id }))
        }
        TagCommand::Add {
            acting,
            note_id,
            tag_id,
        } => {
            service.add_tag_to_note(&ctx(acting), note_id, tag_id)?;
            Ok(json!({ "message": "tag added", "note_id": note_id, "tag_id": tag_id }))
        }
        TagCommand::Remove {
            acting,
            note_id,
            tag_id,
        } => {
            service.remove_tag_from_note(&ctx(acting), note_id, tag_id)?;
            Ok(json!({ "message": "tag removed", "note_id": note_id, "tag_id": tag_id }))
        }
    }
}
