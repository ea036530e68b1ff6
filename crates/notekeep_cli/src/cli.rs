//! Command line definitions.

use clap::{Args, Parser, Subcommand};
use notekeep_core::NewToDoItem;
use std::path::PathBuf;

/// notekeep - personal notes with checklists, tags, reminders and events
#[derive(Parser, Debug)]
#[command(name = "notekeep", version, about, long_about = None)]
pub struct Cli {
    /// SQLite database file (overrides config file)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file (default: ~/.config/notekeep/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Directory for log files
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage user accounts
    #[command(subcommand)]
    User(UserCommand),

    /// Manage notes of the acting user
    #[command(subcommand)]
    Note(NoteCommand),

    /// Manage tags of the acting user
    #[command(subcommand)]
    Tag(TagCommand),
}

/// Authenticated user id, as resolved by the identity layer.
#[derive(Args, Debug, Clone, Copy)]
pub struct Acting {
    #[arg(short, long = "user")]
    pub user_id: i64,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Register a new account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        /// Pre-computed password hash
        #[arg(long)]
        password_hash: String,
    },
    /// Show one account
    Show(Acting),
    /// Change the username of the acting user
    Rename {
        #[command(flatten)]
        acting: Acting,
        username: String,
    },
    /// Replace the stored password hash of the acting user
    SetPasswordHash {
        #[command(flatten)]
        acting: Acting,
        password_hash: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum NoteCommand {
    /// Create a note in text or checklist mode
    Create {
        #[command(flatten)]
        acting: Acting,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        /// Checklist item; prefix with "[x] " to mark it done (repeatable)
        #[arg(long = "item", value_parser = parse_todo_item)]
        items: Vec<NewToDoItem>,
        #[arg(long, default_value = "")]
        color: String,
        #[arg(long, default_value_t = 0)]
        priority: i64,
    },
    /// List active notes
    List(Acting),
    /// Show one active note
    Show {
        #[command(flatten)]
        acting: Acting,
        id: i64,
    },
    /// Update title and/or body; omitted options are left unchanged
    Update {
        #[command(flatten)]
        acting: Acting,
        id: i64,
        #[arg(long)]
        title: Option<String>,
        /// Switch to text mode with this body (drops checklist)
        #[arg(long)]
        content: Option<String>,
        /// Switch to checklist mode; replaces all items (repeatable)
        #[arg(long = "item", value_parser = parse_todo_item)]
        items: Vec<NewToDoItem>,
        /// Replace the checklist with an empty one
        #[arg(long, conflicts_with = "items")]
        clear_items: bool,
    },
    /// Set the note color
    Color {
        #[command(flatten)]
        acting: Acting,
        id: i64,
        color: String,
    },
    /// Set the note priority
    Priority {
        #[command(flatten)]
        acting: Acting,
        id: i64,
        #[arg(allow_negative_numbers = true)]
        priority: i64,
    },
    /// Override the todo/completion flags
    Status {
        #[command(flatten)]
        acting: Acting,
        id: i64,
        #[arg(long)]
        is_todo: Option<bool>,
        #[arg(long)]
        all_done: Option<bool>,
    },
    /// Soft-delete a note
    Delete {
        #[command(flatten)]
        acting: Acting,
        id: i64,
    },
    /// Restore a soft-deleted note
    Restore {
        #[command(flatten)]
        acting: Acting,
        id: i64,
    },
    /// Attach a reminder ("YYYY-MM-DD HH:MM:SS")
    Remind {
        #[command(flatten)]
        acting: Acting,
        id: i64,
        #[arg(long)]
        at: String,
        #[arg(long)]
        recurring: bool,
        #[arg(long, default_value = "")]
        frequency: String,
    },
    /// Remove a reminder
    Unremind {
        #[command(flatten)]
        acting: Acting,
        id: i64,
        reminder_id: i64,
    },
    /// Set or replace the calendar event
    Event {
        #[command(flatten)]
        acting: Acting,
        id: i64,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// Remove the calendar event
    ClearEvent {
        #[command(flatten)]
        acting: Acting,
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum TagCommand {
    /// Create a tag
    Create {
        #[command(flatten)]
        acting: Acting,
        name: String,
    },
    /// List tags
    List(Acting),
    /// Show one tag
    Show {
        #[command(flatten)]
        acting: Acting,
        id: i64,
    },
    /// Rename a tag
    Rename {
        #[command(flatten)]
        acting: Acting,
        id: i64,
        name: String,
    },
    /// Delete a tag and all its note links
    Delete {
        #[command(flatten)]
        acting: Acting,
        id: i64,
    },
    /// Link a tag to a note
    Add {
        #[command(flatten)]
        acting: Acting,
        note_id: i64,
        tag_id: i64,
    },
    /// Unlink a tag from a note
    Remove {
        #[command(flatten)]
        acting: Acting,
        note_id: i64,
        tag_id: i64,
    },
}

/// Parses `"[x] text"` (done), `"[ ] text"` or `"text"` (open).
pub fn parse_todo_item(value: &str) -> Result<NewToDoItem, String> {
    let trimmed = value.trim_start();
    let (is_done, content) = if let Some(rest) = trimmed
        .strip_prefix("[x]")
        .or_else(|| trimmed.strip_prefix("[X]"))
    {
        (true, rest)
    } else if let Some(rest) = trimmed.strip_prefix("[ ]") {
        (false, rest)
    } else {
        (false, trimmed)
    };

    let content = content.trim();
    if content.is_empty() {
        return Err("checklist item cannot be blank".to_string());
    }
    Ok(NewToDoItem::new(content, is_done))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn todo_item_prefixes_set_done_flag() {
        assert_eq!(
            parse_todo_item("[x] buy milk").unwrap(),
            NewToDoItem::new("buy milk", true)
        );
        assert_eq!(
            parse_todo_item("[ ] call mom").unwrap(),
            NewToDoItem::new("call mom", false)
        );
        assert_eq!(
            parse_todo_item("plain").unwrap(),
            NewToDoItem::new("plain", false)
        );
        assert!(parse_todo_item("[x]   ").is_err());
    }

    #[test]
    fn update_parses_repeated_items() {
        let cli = Cli::try_parse_from([
            "notekeep", "note", "update", "--user", "1", "7", "--item", "a", "--item", "[x] b",
        ])
        .unwrap();
        match cli.command {
            Command::Note(NoteCommand::Update {
                acting, id, items, ..
            }) => {
                assert_eq!(acting.user_id, 1);
                assert_eq!(id, 7);
                assert_eq!(items.len(), 2);
                assert!(items[1].is_done);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn tag_show_takes_acting_user_and_id() {
        let cli = Cli::try_parse_from(["notekeep", "tag", "show", "-u", "3", "12"]).unwrap();
        match cli.command {
            Command::Tag(TagCommand::Show { acting, id }) => {
                assert_eq!(acting.user_id, 3);
                assert_eq!(id, 12);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn clear_items_conflicts_with_items() {
        let result = Cli::try_parse_from([
            "notekeep",
            "note",
            "update",
            "--user",
            "1",
            "7",
            "--item",
            "a",
            "--clear-items",
        ]);
        assert!(result.is_err());
    }
}
