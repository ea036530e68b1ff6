//! Tag repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist owner-scoped tags.
//! - Maintain the `note_tags` join as a set keyed by `(note_id, tag_id)`.
//!
//! # Invariants
//! - `(owner_id, name)` is unique; names compare exactly after trimming.
//! - Link membership is a primary-key lookup, never a scan.
//! - Deleting a tag removes all of its links in the same transaction.

use crate::model::note::NoteId;
use crate::model::tag::{Tag, TagId};
use crate::model::UserId;
use crate::repo::{
    ensure_schema_ready, map_owner_insert_error, map_unique_violation, RepoError, RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

/// Owner projection of an active note, used for link authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteRef {
    pub id: NoteId,
    pub owner_id: UserId,
}

/// Repository interface for tags and note links.
pub trait TagRepository {
    fn insert_tag(&self, owner_id: UserId, name: &str) -> RepoResult<TagId>;
    fn find_tag(&self, id: TagId) -> RepoResult<Option<Tag>>;
    /// Exact-name lookup within one owner.
    fn find_tag_by_name(&self, owner_id: UserId, name: &str) -> RepoResult<Option<Tag>>;
    /// Lists tags of one owner sorted by name.
    fn list_tags(&self, owner_id: UserId) -> RepoResult<Vec<Tag>>;
    fn rename_tag(&self, id: TagId, owner_id: UserId, name: &str) -> RepoResult<()>;
    /// Deletes the tag and its links. Returns the number of links removed.
    fn delete_tag(&self, id: TagId, owner_id: UserId) -> RepoResult<usize>;
    /// Resolves an active note to its owner.
    fn find_note_ref(&self, note_id: NoteId) -> RepoResult<Option<NoteRef>>;
    fn link_exists(&self, note_id: NoteId, tag_id: TagId) -> RepoResult<bool>;
    /// Inserts one link and refreshes the note's `updated_at`.
    fn insert_link(&self, note_id: NoteId, tag_id: TagId, touched_at: &str) -> RepoResult<()>;
    /// Removes one link and refreshes the note's `updated_at`. Returns `false`
    /// when the link did not exist.
    fn delete_link(&self, note_id: NoteId, tag_id: TagId, touched_at: &str) -> RepoResult<bool>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
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

impl TagRepository for SqliteTagRepository<'_> {
    fn insert_tag(&self, owner_id: UserId, name: &str) -> RepoResult<TagId> {
        self.conn
            .execute(
                "INSERT INTO tags (owner_id, name) VALUES (?1, ?2);",
                params![owner_id, name],
            )
            .map_err(|err| map_owner_insert_error(err, "tags", owner_id))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn find_tag(&self, id: TagId) -> RepoResult<Option<Tag>> {
        let tag = self
            .conn
            .query_row(
                "SELECT id, owner_id, name FROM tags WHERE id = ?1;",
                [id],
                |row| {
                    Ok(Tag {
                        id: row.get(0)?,
                        owner_id: row.get(1)?,
                        name: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(tag)
    }

    fn find_tag_by_name(&self, owner_id: UserId, name: &str) -> RepoResult<Option<Tag>> {
        let tag = self
            .conn
            .query_row(
                "SELECT id, owner_id, name
                 FROM tags
                 WHERE owner_id = ?1 AND name = ?2;",
                params![owner_id, name],
                |row| {
                    Ok(Tag {
                        id: row.get(0)?,
                        owner_id: row.get(1)?,
                        name: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(tag)
    }

    fn list_tags(&self, owner_id: UserId) -> RepoResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner_id, name
             FROM tags
             WHERE owner_id = ?1
             ORDER BY name COLLATE NOCASE ASC, id ASC;",
        )?;
        let mut rows = stmt.query([owner_id])?;
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

    fn rename_tag(&self, id: TagId, owner_id: UserId, name: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE tags SET name = ?3 WHERE id = ?1 AND owner_id = ?2;",
                params![id, owner_id, name],
            )
            .map_err(|err| map_unique_violation(err, "tags"))?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "tag", id });
        }
        Ok(())
    }

    fn delete_tag(&self, id: TagId, owner_id: UserId) -> RepoResult<usize> {
        let tx = self.begin()?;
        let unlinked = tx.execute("DELETE FROM note_tags WHERE tag_id = ?1;", [id])?;
        let changed = tx.execute(
            "DELETE FROM tags WHERE id = ?1 AND owner_id = ?2;",
            params![id, owner_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "tag", id });
        }
        tx.commit()?;
        Ok(unlinked)
    }

    fn find_note_ref(&self, note_id: NoteId) -> RepoResult<Option<NoteRef>> {
        let note = self
            .conn
            .query_row(
                "SELECT id, owner_id
                 FROM notes
                 WHERE id = ?1 AND deleted_at = '';",
                [note_id],
                |row| {
                    Ok(NoteRef {
                        id: row.get(0)?,
                        owner_id: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(note)
    }

    fn link_exists(&self, note_id: NoteId, tag_id: TagId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM note_tags WHERE note_id = ?1 AND tag_id = ?2
            );",
            params![note_id, tag_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn insert_link(&self, note_id: NoteId, tag_id: TagId, touched_at: &str) -> RepoResult<()> {
        let tx = self.begin()?;
        tx.execute(
            "INSERT INTO note_tags (note_id, tag_id) VALUES (?1, ?2);",
            params![note_id, tag_id],
        )
        .map_err(|err| map_unique_violation(err, "note_tags"))?;
        touch_note(&tx, note_id, touched_at)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_link(&self, note_id: NoteId, tag_id: TagId, touched_at: &str) -> RepoResult<bool> {
        let tx = self.begin()?;
        let changed = tx.execute(
            "DELETE FROM note_tags WHERE note_id = ?1 AND tag_id = ?2;",
            params![note_id, tag_id],
        )?;
        if changed == 0 {
            return Ok(false);
        }
        touch_note(&tx, note_id, touched_at)?;
        tx.commit()?;
        Ok(true)
    }
}

fn touch_note(tx: &Transaction<'_>, note_id: NoteId, touched_at: &str) -> RepoResult<()> {
    tx.execute(
        "UPDATE notes SET updated_at = ?2 WHERE id = ?1;",
        params![note_id, touched_at],
    )?;
    Ok(())
}
