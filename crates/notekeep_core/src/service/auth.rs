//! Authorization gate for owner-scoped resources.
//!
//! # Responsibility
//! - Carry the acting user through every engine call (`AuthContext`).
//! - Decide ownership in exactly one place (`authorize`).
//!
//! # Invariants
//! - A missing resource and a resource owned by someone else produce the
//!   same `NotFoundOrForbidden` error.
//! - The gate runs before any write is issued.

use crate::model::note::Note;
use crate::model::tag::Tag;
use crate::model::UserId;
use crate::repo::tag_repo::NoteRef;
use crate::service::error::{ResourceKind, ServiceError, ServiceResult};
use log::warn;

/// Authenticated caller identity, furnished by token verification upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthContext {
    user_id: UserId,
}

impl AuthContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

/// Resource carrying an immutable owner id.
pub trait Owned {
    const KIND: ResourceKind;

    fn resource_id(&self) -> i64;
    fn owner_id(&self) -> UserId;
}

impl Owned for Note {
    const KIND: ResourceKind = ResourceKind::Note;

    fn resource_id(&self) -> i64 {
        self.id
    }

    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}

impl Owned for NoteRef {
    const KIND: ResourceKind = ResourceKind::Note;

    fn resource_id(&self) -> i64 {
        self.id
    }

    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}

impl Owned for Tag {
    const KIND: ResourceKind = ResourceKind::Tag;

    fn resource_id(&self) -> i64 {
        self.id
    }

    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}

/// Returns whether `ctx` owns `resource`.
pub fn owns<R: Owned>(resource: &R, ctx: &AuthContext) -> bool {
    resource.owner_id() == ctx.user_id()
}

/// Passes an owned resource through, or fails with `NotFoundOrForbidden`.
///
/// `requested_id` is the id the caller asked for; it is reported for both
/// the missing and the foreign case.
pub fn authorize<R: Owned>(
    resource: Option<R>,
    ctx: &AuthContext,
    requested_id: i64,
) -> ServiceResult<R> {
    match resource {
        Some(resource) if owns(&resource, ctx) => Ok(resource),
        Some(resource) => {
            warn!(
                "event=authz_denied module=auth resource={} id={} user_id={}",
                R::KIND,
                resource.resource_id(),
                ctx.user_id()
            );
            Err(ServiceError::not_found(R::KIND, requested_id))
        }
        None => Err(ServiceError::not_found(R::KIND, requested_id)),
    }
}
