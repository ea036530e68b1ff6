//! Error kinds surfaced at the engine boundary.
//!
//! Not-found and not-owned are one kind (`NotFoundOrForbidden`) so callers
//! cannot probe for other users' resources.

use crate::model::note::NoteId;
use crate::model::tag::TagId;
use crate::model::validation::ValidationError;
use crate::repo::RepoError;
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Owner-scoped resource families checked by the authorization gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Note,
    Tag,
    Reminder,
    User,
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Note => "note",
            Self::Tag => "tag",
            Self::Reminder => "reminder",
            Self::User => "user",
        };
        f.write_str(label)
    }
}

/// Coarse classification for façades choosing a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed request (400-style).
    InvalidInput,
    /// Missing or foreign resource (403/404-style).
    NotFound,
    /// Request conflicts with current state (409-style).
    Conflict,
    /// Storage failure (500-style).
    Internal,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),
    #[error("{resource} {id} not found or does not belong to the user")]
    NotFoundOrForbidden { resource: ResourceKind, id: i64 },
    #[error("note {0} is already deleted")]
    AlreadyDeleted(NoteId),
    #[error("tag {tag_id} is already associated with note {note_id}")]
    AlreadyAssociated { note_id: NoteId, tag_id: TagId },
    #[error("tag {tag_id} is not associated with note {note_id}")]
    NotAssociated { note_id: NoteId, tag_id: TagId },
    #[error("tag name `{0}` already exists for this user")]
    DuplicateName(String),
    #[error("email `{0}` is already registered")]
    DuplicateEmail(String),
    #[error("transaction failed: {0}")]
    TransactionFailed(#[from] RepoError),
}

impl ServiceError {
    pub(crate) fn not_found(resource: ResourceKind, id: i64) -> Self {
        Self::NotFoundOrForbidden { resource, id }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidInput(_) => ErrorClass::InvalidInput,
            Self::NotFoundOrForbidden { .. } => ErrorClass::NotFound,
            Self::AlreadyDeleted(_)
            | Self::AlreadyAssociated { .. }
            | Self::NotAssociated { .. }
            | Self::DuplicateName(_)
            | Self::DuplicateEmail(_) => ErrorClass::Conflict,
            Self::TransactionFailed(_) => ErrorClass::Internal,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.class() == ErrorClass::Conflict
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorClass, ResourceKind, ServiceError};
    use crate::model::validation::ValidationError;
    use crate::repo::RepoError;
    use std::error::Error;

    #[test]
    fn foreign_and_missing_render_the_same_message() {
        let err = ServiceError::not_found(ResourceKind::Note, 7);
        assert_eq!(
            err.to_string(),
            "note 7 not found or does not belong to the user"
        );
        assert_eq!(err.class(), ErrorClass::NotFound);
    }

    #[test]
    fn conflict_kinds_are_grouped() {
        assert!(ServiceError::AlreadyDeleted(1).is_conflict());
        assert!(ServiceError::DuplicateName("work".to_string()).is_conflict());
        assert!(ServiceError::AlreadyAssociated {
            note_id: 1,
            tag_id: 2
        }
        .is_conflict());
        assert!(!ServiceError::from(ValidationError::BlankTagName).is_conflict());
    }

    #[test]
    fn transaction_failure_keeps_its_cause() {
        let err = ServiceError::from(RepoError::InvalidData("bad row".to_string()));
        assert_eq!(err.class(), ErrorClass::Internal);
        assert!(err.source().is_some());
    }
}
