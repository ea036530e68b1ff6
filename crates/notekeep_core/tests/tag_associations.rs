use notekeep_core::db::open_db_in_memory;
use notekeep_core::{
    AuthContext, CreateNoteRequest, Note, NoteService, ResourceKind, ServiceError,
    SqliteNoteRepository, SqliteTagRepository, SqliteUserRepository, TagService, UserService,
    ValidationError,
};
use rusqlite::{params, Connection};

fn register(conn: &Connection, name: &str) -> AuthContext {
    let service = UserService::new(SqliteUserRepository::try_new(conn).unwrap());
    let user = service
        .register_user(name, &format!("{name}@example.com"), "argon2-hash")
        .unwrap();
    AuthContext::new(user.id)
}

fn create_note(conn: &Connection, ctx: &AuthContext, title: &str) -> Note {
    let service = NoteService::new(SqliteNoteRepository::try_new(conn).unwrap());
    service
        .create_note(
            ctx,
            CreateNoteRequest {
                title: title.to_string(),
                ..CreateNoteRequest::default()
            },
        )
        .unwrap()
}

fn link_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM note_tags;", [], |row| row.get(0))
        .unwrap()
}

fn note_link_count(conn: &Connection, note_id: i64) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM note_tags WHERE note_id = ?1;",
        [note_id],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn tag_names_are_scoped_per_user() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let bob = register(&conn, "bob");
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let alice_work = service.create_tag(&alice, "work").unwrap();
    let bob_work = service.create_tag(&bob, "work").unwrap();
    assert_ne!(alice_work.id, bob_work.id);

    let err = service.create_tag(&alice, " work ").unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateName(ref name) if name == "work"));

    assert_eq!(service.list_tags(&alice).unwrap(), vec![alice_work]);
    assert_eq!(service.list_tags(&bob).unwrap(), vec![bob_work]);
}

#[test]
fn tag_names_differing_only_in_case_are_distinct() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let lower = service.create_tag(&alice, "work").unwrap();
    let upper = service.create_tag(&alice, "Work").unwrap();
    assert_ne!(lower.id, upper.id);
    assert_eq!(upper.name, "Work");
    assert_eq!(service.list_tags(&alice).unwrap().len(), 2);
}

#[test]
fn tag_names_are_trimmed_and_must_not_be_blank() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    assert_eq!(service.create_tag(&alice, "  home ").unwrap().name, "home");
    assert!(matches!(
        service.create_tag(&alice, "   ").unwrap_err(),
        ServiceError::InvalidInput(ValidationError::BlankTagName)
    ));
}

#[test]
fn list_tags_sorts_by_name() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());
    for name in ["travel", "Errands", "books"] {
        service.create_tag(&alice, name).unwrap();
    }

    let names: Vec<_> = service
        .list_tags(&alice)
        .unwrap()
        .into_iter()
        .map(|tag| tag.name)
        .collect();
    assert_eq!(names, vec!["books", "Errands", "travel"]);
}

#[test]
fn rename_checks_duplicates_but_allows_own_name() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());
    let work = service.create_tag(&alice, "work").unwrap();
    service.create_tag(&alice, "home").unwrap();

    assert!(matches!(
        service.update_tag_name(&alice, work.id, "home").unwrap_err(),
        ServiceError::DuplicateName(_)
    ));
    assert_eq!(
        service.update_tag_name(&alice, work.id, "work").unwrap().name,
        "work"
    );
    assert_eq!(
        service.update_tag_name(&alice, work.id, "HOME").unwrap().name,
        "HOME"
    );
    assert_eq!(
        service.update_tag_name(&alice, work.id, "office").unwrap().name,
        "office"
    );
    assert_eq!(service.get_tag(&alice, work.id).unwrap().name, "office");
}

#[test]
fn add_and_remove_link_show_up_on_the_note() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let note = create_note(&conn, &alice, "Quarterly report");
    let tags = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());
    let notes = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    let work = tags.create_tag(&alice, "work").unwrap();

    conn.execute(
        "UPDATE notes SET updated_at = '2000-01-01 00:00:00' WHERE id = ?1;",
        [note.id],
    )
    .unwrap();
    tags.add_tag_to_note(&alice, note.id, work.id).unwrap();

    let tagged = notes.get_note(&alice, note.id).unwrap();
    assert_eq!(tagged.tags, vec![work.clone()]);
    assert_ne!(tagged.updated_at, "2000-01-01 00:00:00");

    tags.remove_tag_from_note(&alice, note.id, work.id).unwrap();
    assert!(notes.get_note(&alice, note.id).unwrap().tags.is_empty());
    assert_eq!(link_count(&conn), 0);
}

#[test]
fn duplicate_link_is_rejected_without_changes() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let note = create_note(&conn, &alice, "n");
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());
    let tag = service.create_tag(&alice, "work").unwrap();

    service.add_tag_to_note(&alice, note.id, tag.id).unwrap();
    let err = service.add_tag_to_note(&alice, note.id, tag.id).unwrap_err();

    assert!(matches!(
        err,
        ServiceError::AlreadyAssociated { note_id, tag_id } if note_id == note.id && tag_id == tag.id
    ));
    assert_eq!(link_count(&conn), 1);
}

#[test]
fn removing_missing_link_is_not_associated() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let note = create_note(&conn, &alice, "n");
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());
    let tag = service.create_tag(&alice, "work").unwrap();

    let err = service
        .remove_tag_from_note(&alice, note.id, tag.id)
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotAssociated { .. }));
    assert!(err.is_conflict());
}

#[test]
fn cross_user_links_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let bob = register(&conn, "bob");
    let alice_note = create_note(&conn, &alice, "alice note");
    let bob_note = create_note(&conn, &bob, "bob note");
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());
    let alice_tag = service.create_tag(&alice, "work").unwrap();
    let bob_tag = service.create_tag(&bob, "work").unwrap();

    assert!(matches!(
        service
            .add_tag_to_note(&alice, alice_note.id, bob_tag.id)
            .unwrap_err(),
        ServiceError::NotFoundOrForbidden {
            resource: ResourceKind::Tag,
            ..
        }
    ));
    assert!(matches!(
        service
            .add_tag_to_note(&alice, bob_note.id, alice_tag.id)
            .unwrap_err(),
        ServiceError::NotFoundOrForbidden {
            resource: ResourceKind::Note,
            ..
        }
    ));
    assert!(matches!(
        service.get_tag(&bob, alice_tag.id).unwrap_err(),
        ServiceError::NotFoundOrForbidden { .. }
    ));
    assert!(matches!(
        service.delete_tag(&bob, alice_tag.id).unwrap_err(),
        ServiceError::NotFoundOrForbidden { .. }
    ));
    assert!(matches!(
        service
            .update_tag_name(&bob, alice_tag.id, "stolen")
            .unwrap_err(),
        ServiceError::NotFoundOrForbidden { .. }
    ));
    assert_eq!(link_count(&conn), 0);
    assert_eq!(service.get_tag(&alice, alice_tag.id).unwrap().name, "work");
}

#[test]
fn deleted_notes_cannot_be_tagged() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let note = create_note(&conn, &alice, "gone");
    let notes = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    let tags = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());
    let tag = tags.create_tag(&alice, "work").unwrap();
    notes.delete_note(&alice, note.id).unwrap();

    assert!(matches!(
        tags.add_tag_to_note(&alice, note.id, tag.id).unwrap_err(),
        ServiceError::NotFoundOrForbidden {
            resource: ResourceKind::Note,
            ..
        }
    ));
}

#[test]
fn deleting_tag_removes_its_links_only() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let first = create_note(&conn, &alice, "first");
    let second = create_note(&conn, &alice, "second");
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());
    let work = service.create_tag(&alice, "work").unwrap();
    let home = service.create_tag(&alice, "home").unwrap();
    service.add_tag_to_note(&alice, first.id, work.id).unwrap();
    service.add_tag_to_note(&alice, second.id, work.id).unwrap();
    service.add_tag_to_note(&alice, second.id, home.id).unwrap();

    service.delete_tag(&alice, work.id).unwrap();

    assert_eq!(note_link_count(&conn, first.id), 0);
    assert_eq!(note_link_count(&conn, second.id), 1);
    assert!(matches!(
        service.get_tag(&alice, work.id).unwrap_err(),
        ServiceError::NotFoundOrForbidden { .. }
    ));

    let notes = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    assert_eq!(notes.get_note(&alice, second.id).unwrap().tags, vec![home]);
}

#[test]
fn tags_survive_soft_delete_and_restore() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let note = create_note(&conn, &alice, "tagged");
    let notes = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    let tags = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());
    let tag = tags.create_tag(&alice, "keep").unwrap();
    tags.add_tag_to_note(&alice, note.id, tag.id).unwrap();

    notes.delete_note(&alice, note.id).unwrap();
    let restored = notes.restore_note(&alice, note.id).unwrap();
    assert_eq!(restored.tags, vec![tag]);
}

#[test]
fn link_primary_key_blocks_raw_duplicates() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let note = create_note(&conn, &alice, "n");
    let tags = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());
    let tag = tags.create_tag(&alice, "work").unwrap();
    tags.add_tag_to_note(&alice, note.id, tag.id).unwrap();

    let raw = conn.execute(
        "INSERT INTO note_tags (note_id, tag_id) VALUES (?1, ?2);",
        params![note.id, tag.id],
    );
    assert!(raw.is_err());
}

#[test]
fn unregistered_user_cannot_create_tags() {
    let conn = open_db_in_memory().unwrap();
    let service = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());
    let ghost = AuthContext::new(2);

    let err = service.create_tag(&ghost, "work").unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFoundOrForbidden {
            resource: ResourceKind::User,
            id: 2
        }
    ));
    assert_eq!(err.class(), notekeep_core::ErrorClass::NotFound);
    assert!(service.list_tags(&ghost).unwrap().is_empty());
}
