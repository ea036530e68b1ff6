//! Domain model for notes, checklists, tags, attachments and users.
//!
//! # Responsibility
//! - Define the records shared by repositories, services and façades.
//! - Hold the pure rules of the note engine (content-mode exclusivity,
//!   completion derivation, field validation).
//!
//! # Invariants
//! - Every record is identified by a store-assigned integer id.
//! - Notes and tags always carry the id of their owning user.
//! - Deletion of notes is a soft-delete tombstone (`deleted_at`).

pub mod attachment;
pub mod note;
pub mod tag;
pub mod timestamp;
pub mod user;
pub mod validation;

/// Identifier of a registered user.
pub type UserId = i64;
