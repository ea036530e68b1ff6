//! Tag use-case service (association manager).
//!
//! # Responsibility
//! - Create, rename, list and delete owner-scoped tags.
//! - Link/unlink tags and notes of the same owner.
//!
//! # Invariants
//! - Tag names are unique per owner (exact match), never globally.
//! - A note/tag link is a set member: adding it twice is `AlreadyAssociated`,
//!   removing a missing one is `NotAssociated`. Both leave storage unchanged.
//! - Both the note and the tag pass the gate before a link is touched.

use crate::model::note::NoteId;
use crate::model::tag::{Tag, TagId};
use crate::model::timestamp::now_timestamp;
use crate::model::validation::normalize_tag_name;
use crate::repo::tag_repo::{NoteRef, TagRepository};
use crate::repo::RepoError;
use crate::service::auth::{authorize, AuthContext};
use crate::service::error::{ResourceKind, ServiceError, ServiceResult};
use log::info;

/// Tag service facade over repository implementations.
pub struct TagService<R: TagRepository> {
    repo: R,
}

impl<R: TagRepository> TagService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a tag for the caller.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank name.
    /// - `DuplicateName` when the caller already has a tag with this name.
    /// - `NotFoundOrForbidden` (user) when the caller is not registered.
    pub fn create_tag(&self, ctx: &AuthContext, name: &str) -> ServiceResult<Tag> {
        let name = normalize_tag_name(name)?;
        if self
            .repo
            .find_tag_by_name(ctx.user_id(), &name)?
            .is_some()
        {
            return Err(ServiceError::DuplicateName(name));
        }

        let tag_id = self
            .repo
            .insert_tag(ctx.user_id(), &name)
            .map_err(|err| match err {
                RepoError::NotFound { .. } => {
                    ServiceError::not_found(ResourceKind::User, ctx.user_id())
                }
                other => duplicate_name_error(other, &name),
            })?;
        info!(
            "event=tag_create module=tag_service status=ok tag_id={tag_id} user_id={}",
            ctx.user_id()
        );
        Ok(Tag {
            id: tag_id,
            owner_id: ctx.user_id(),
            name,
        })
    }

    pub fn get_tag(&self, ctx: &AuthContext, tag_id: TagId) -> ServiceResult<Tag> {
        authorize(self.repo.find_tag(tag_id)?, ctx, tag_id)
    }

    pub fn list_tags(&self, ctx: &AuthContext) -> ServiceResult<Vec<Tag>> {
        Ok(self.repo.list_tags(ctx.user_id())?)
    }

    /// Renames a tag. Renaming to its own current name succeeds.
    pub fn update_tag_name(&self, ctx: &AuthContext, tag_id: TagId, name: &str) -> ServiceResult<Tag> {
        let tag = self.get_tag(ctx, tag_id)?;
        let name = normalize_tag_name(name)?;
        if let Some(existing) = self.repo.find_tag_by_name(ctx.user_id(), &name)? {
            if existing.id != tag.id {
                return Err(ServiceError::DuplicateName(name));
            }
        }

        self.repo
            .rename_tag(tag_id, ctx.user_id(), &name)
            .map_err(|err| match err {
                RepoError::NotFound { .. } => ServiceError::not_found(ResourceKind::Tag, tag_id),
                other => duplicate_name_error(other, &name),
            })?;
        Ok(Tag { name, ..tag })
    }

    /// Deletes a tag together with all of its note links.
    pub fn delete_tag(&self, ctx: &AuthContext, tag_id: TagId) -> ServiceResult<()> {
        self.get_tag(ctx, tag_id)?;
        let unlinked = self
            .repo
            .delete_tag(tag_id, ctx.user_id())
            .map_err(|err| match err {
                RepoError::NotFound { .. } => ServiceError::not_found(ResourceKind::Tag, tag_id),
                other => other.into(),
            })?;
        info!(
            "event=tag_delete module=tag_service status=ok tag_id={tag_id} user_id={} unlinked={unlinked}",
            ctx.user_id()
        );
        Ok(())
    }

    /// Links a tag to a note. Both must belong to the caller.
    pub fn add_tag_to_note(&self, ctx: &AuthContext, note_id: NoteId, tag_id: TagId) -> ServiceResult<()> {
        self.authorize_pair(ctx, note_id, tag_id)?;
        if self.repo.link_exists(note_id, tag_id)? {
            return Err(ServiceError::AlreadyAssociated { note_id, tag_id });
        }

        self.repo
            .insert_link(note_id, tag_id, &now_timestamp())
            .map_err(|err| match err {
                RepoError::UniqueViolation(_) => ServiceError::AlreadyAssociated { note_id, tag_id },
                other => other.into(),
            })
    }

    /// Unlinks a tag from a note.
    ///
    /// # Errors
    /// - `NotAssociated` when the link does not exist.
    pub fn remove_tag_from_note(
        &self,
        ctx: &AuthContext,
        note_id: NoteId,
        tag_id: TagId,
    ) -> ServiceResult<()> {
        self.authorize_pair(ctx, note_id, tag_id)?;
        if !self.repo.delete_link(note_id, tag_id, &now_timestamp())? {
            return Err(ServiceError::NotAssociated { note_id, tag_id });
        }
        Ok(())
    }

    fn authorize_pair(&self, ctx: &AuthContext, note_id: NoteId, tag_id: TagId) -> ServiceResult<()> {
        authorize::<NoteRef>(self.repo.find_note_ref(note_id)?, ctx, note_id)?;
        authorize::<Tag>(self.repo.find_tag(tag_id)?, ctx, tag_id)?;
        Ok(())
    }
}

fn duplicate_name_error(err: RepoError, name: &str) -> ServiceError {
    match err {
        RepoError::UniqueViolation(_) => ServiceError::DuplicateName(name.to_string()),
        other => other.into(),
    }
}
