//! Core domain logic for NoteKeep.
//! This crate is the single source of truth for note consistency invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::attachment::{Event, NewReminder, Reminder, ReminderId};
pub use model::note::{derive_all_done, NewToDoItem, Note, NoteId, ToDoItem};
pub use model::tag::{Tag, TagId};
pub use model::user::User;
pub use model::validation::ValidationError;
pub use model::UserId;
pub use repo::note_repo::{NoteRepository, NoteVisibility, SqliteNoteRepository};
pub use repo::tag_repo::{SqliteTagRepository, TagRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::auth::AuthContext;
pub use service::error::{ErrorClass, ResourceKind, ServiceError, ServiceResult};
pub use service::note_service::{
    CreateNoteRequest, NoteService, UpdateNoteContent, UpdateNoteStatus,
};
pub use service::tag_service::TagService;
pub use service::user_service::UserService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
