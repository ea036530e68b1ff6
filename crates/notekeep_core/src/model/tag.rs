//! Tag domain model.
//!
//! # Invariants
//! - `name` is unique per owner. `work` and `Work` are distinct names.
//! - A tag is only ever linked to notes of the same owner.

use crate::model::UserId;
use serde::{Deserialize, Serialize};

/// Identifier of a tag.
pub type TagId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "tag_id")]
    pub id: TagId,
    #[serde(rename = "user_id")]
    pub owner_id: UserId,
    #[serde(rename = "tag_name")]
    pub name: String,
}
