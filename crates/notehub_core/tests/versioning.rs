use notehub_core::db::{open_db, open_db_in_memory};
use notehub_core::repo::version_repo::{NewVersion, SqliteVersionRepository, VersionRepository};
use notehub_core::{
    AuditAction, CollaboratorRole, CoreError, ErrorKind, Missing, NoteChanges, NoteService,
    RepoError, User, UserService, VersionEngine,
};
use rusqlite::Connection;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn register(conn: &Connection, email: &str) -> User {
    UserService::try_new(conn).unwrap().register(email).unwrap()
}

#[test]
fn each_update_adds_one_version_numbered_from_one() {
    let conn = setup();
    let owner = register(&conn, "owner@example.com");
    let service = NoteService::try_new(&conn).unwrap();
    let note = service.create(owner.id, "t1", "c0").unwrap();

    assert!(service
        .versions()
        .list_versions(note.id, owner.id)
        .unwrap()
        .is_empty());

    for step in 1..=4 {
        service
            .update(note.id, owner.id, NoteChanges::content(format!("c{step}")))
            .unwrap();
    }

    let versions = service.versions().list_versions(note.id, owner.id).unwrap();
    let numbers: Vec<u32> = versions.iter().map(|v| v.version_number).collect();
    assert_eq!(numbers, vec![4, 3, 2, 1]);
    assert!(versions.iter().all(|v| v.editor_id == owner.id));
}

#[test]
fn versions_hold_state_before_each_change() {
    let conn = setup();
    let owner = register(&conn, "owner@example.com");
    let service = NoteService::try_new(&conn).unwrap();
    let note = service.create(owner.id, "t1", "c1").unwrap();

    service
        .update(
            note.id,
            owner.id,
            NoteChanges {
                title: Some("t2".to_string()),
                content: Some("c2".to_string()),
            },
        )
        .unwrap();

    let v1 = service.versions().get_version(note.id, 1, owner.id).unwrap();
    assert_eq!(v1.title_snapshot, "t1");
    assert_eq!(v1.content_snapshot, "c1");
}

#[test]
fn restore_scenario_snapshots_current_state_first() {
    let conn = setup();
    let owner = register(&conn, "owner@example.com");
    let service = NoteService::try_new(&conn).unwrap();
    let note = service.create(owner.id, "t1", "c1").unwrap();

    service
        .update(note.id, owner.id, NoteChanges::content("c2"))
        .unwrap();
    service
        .update(note.id, owner.id, NoteChanges::content("c3"))
        .unwrap();

    let engine = service.versions();
    assert_eq!(engine.list_versions(note.id, owner.id).unwrap().len(), 2);
    assert_eq!(
        engine.get_version(note.id, 1, owner.id).unwrap().content_snapshot,
        "c1"
    );

    let restored = engine.restore(note.id, 1, owner.id).unwrap();
    assert_eq!(restored.title, "t1");
    assert_eq!(restored.content, "c1");

    let versions = engine.list_versions(note.id, owner.id).unwrap();
    assert_eq!(versions.len(), 3);
    assert_eq!(versions[0].version_number, 3);
    assert_eq!(versions[0].content_snapshot, "c3");

    // Restoring the pre-restore snapshot undoes the restore.
    let undone = engine.restore(note.id, 3, owner.id).unwrap();
    assert_eq!(undone.content, "c3");
    assert_eq!(engine.list_versions(note.id, owner.id).unwrap().len(), 4);
}

#[test]
fn restore_is_audited_with_target_version() {
    let conn = setup();
    let owner = register(&conn, "owner@example.com");
    let service = NoteService::try_new(&conn).unwrap();
    let note = service.create(owner.id, "t1", "c1").unwrap();
    service
        .update(note.id, owner.id, NoteChanges::content("c2"))
        .unwrap();

    service.versions().restore(note.id, 1, owner.id).unwrap();

    let activity = service.note_activity(note.id, owner.id).unwrap();
    let latest = &activity[0].entry;
    assert_eq!(latest.action, AuditAction::Restore);
    assert_eq!(latest.details.as_deref(), Some("Restored to version 1"));
}

#[test]
fn version_numbers_are_independent_per_note() {
    let conn = setup();
    let owner = register(&conn, "owner@example.com");
    let service = NoteService::try_new(&conn).unwrap();
    let first = service.create(owner.id, "first", "a").unwrap();
    let second = service.create(owner.id, "second", "b").unwrap();

    service
        .update(first.id, owner.id, NoteChanges::content("a2"))
        .unwrap();
    service
        .update(first.id, owner.id, NoteChanges::content("a3"))
        .unwrap();
    service
        .update(second.id, owner.id, NoteChanges::content("b2"))
        .unwrap();

    let second_versions = service.versions().list_versions(second.id, owner.id).unwrap();
    assert_eq!(second_versions.len(), 1);
    assert_eq!(second_versions[0].version_number, 1);
}

#[test]
fn viewer_lists_versions_but_cannot_restore() {
    let conn = setup();
    let owner = register(&conn, "owner@example.com");
    let viewer = register(&conn, "viewer@example.com");
    let service = NoteService::try_new(&conn).unwrap();
    let note = service.create(owner.id, "t1", "c1").unwrap();
    service
        .update(note.id, owner.id, NoteChanges::content("c2"))
        .unwrap();
    service
        .share(note.id, owner.id, "viewer@example.com", CollaboratorRole::Viewer)
        .unwrap();

    let engine = VersionEngine::new(&conn);
    assert_eq!(engine.list_versions(note.id, viewer.id).unwrap().len(), 1);

    let err = engine.restore(note.id, 1, viewer.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(engine.list_versions(note.id, owner.id).unwrap().len(), 1);
}

#[test]
fn missing_version_is_not_found_and_changes_nothing() {
    let conn = setup();
    let owner = register(&conn, "owner@example.com");
    let service = NoteService::try_new(&conn).unwrap();
    let note = service.create(owner.id, "t1", "c1").unwrap();

    let err = service.versions().get_version(note.id, 7, owner.id).unwrap_err();
    assert!(matches!(
        err,
        CoreError::NotFound(Missing::Version {
            version_number: 7,
            ..
        })
    ));

    let err = service.versions().restore(note.id, 7, owner.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(service
        .versions()
        .list_versions(note.id, owner.id)
        .unwrap()
        .is_empty());
    assert_eq!(service.view(note.id, owner.id).unwrap().content, "c1");
}

#[test]
fn storage_rejects_duplicate_version_numbers() {
    let conn = setup();
    let owner = register(&conn, "owner@example.com");
    let service = NoteService::try_new(&conn).unwrap();
    let note = service.create(owner.id, "t1", "c1").unwrap();

    let repo = SqliteVersionRepository::new(&conn);
    let snapshot = NewVersion {
        note_id: note.id,
        version_number: 1,
        title_snapshot: "t1",
        content_snapshot: "c1",
        editor_id: owner.id,
    };
    repo.insert_version(&snapshot).unwrap();

    let err = repo.insert_version(&snapshot).unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)));
    assert_eq!(repo.max_version_number(note.id).unwrap(), 1);
}

#[test]
fn snapshot_uses_next_number_after_existing_rows() {
    let conn = setup();
    let owner = register(&conn, "owner@example.com");
    let service = NoteService::try_new(&conn).unwrap();
    let note = service.create(owner.id, "t1", "c1").unwrap();

    SqliteVersionRepository::new(&conn)
        .insert_version(&NewVersion {
            note_id: note.id,
            version_number: 5,
            title_snapshot: "old",
            content_snapshot: "old",
            editor_id: owner.id,
        })
        .unwrap();

    let version = VersionEngine::new(&conn)
        .snapshot_before_change(&note, owner.id)
        .unwrap();
    assert_eq!(version.version_number, 6);
    assert_eq!(version.content_snapshot, "c1");
}

#[test]
fn concurrent_writers_get_gapless_version_numbers() {
    const WRITERS: usize = 4;
    const UPDATES_PER_WRITER: usize = 10;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("concurrent.db");
    let (owner_id, note_id) = {
        let conn = open_db(&path).unwrap();
        let owner = register(&conn, "owner@example.com");
        let note = NoteService::try_new(&conn)
            .unwrap()
            .create(owner.id, "shared", "c0")
            .unwrap();
        (owner.id, note.id)
    };

    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let path = path.clone();
            std::thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let service = NoteService::try_new(&conn).unwrap();
                for step in 0..UPDATES_PER_WRITER {
                    service
                        .update(
                            note_id,
                            owner_id,
                            NoteChanges::content(format!("w{writer}-{step}")),
                        )
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let conn = open_db(&path).unwrap();
    let service = NoteService::try_new(&conn).unwrap();
    let versions = service.versions().list_versions(note_id, owner_id).unwrap();

    let mut numbers: Vec<u32> = versions.iter().map(|v| v.version_number).collect();
    numbers.sort_unstable();
    let total = (WRITERS * UPDATES_PER_WRITER) as u32;
    assert_eq!(numbers, (1..=total).collect::<Vec<u32>>());

    // Serialized writes form one chain: every written state is either a
    // snapshot or the current content, exactly once.
    let mut states: Vec<String> = versions
        .into_iter()
        .map(|v| v.content_snapshot)
        .collect();
    states.push(service.view(note_id, owner_id).unwrap().content);
    states.sort();
    let mut expected: Vec<String> = (0..WRITERS)
        .flat_map(|writer| (0..UPDATES_PER_WRITER).map(move |step| format!("w{writer}-{step}")))
        .collect();
    expected.push("c0".to_string());
    expected.sort();
    assert_eq!(states, expected);
}

#[test]
fn persistent_number_clash_is_conflict_and_rolls_back() {
    let conn = setup();
    let owner = register(&conn, "owner@example.com");
    let service = NoteService::try_new(&conn).unwrap();
    let note = service.create(owner.id, "t1", "c1").unwrap();

    // Another writer claims whichever number the engine computes.
    conn.execute_batch(
        "CREATE TRIGGER claim_version_number
         BEFORE INSERT ON note_versions
         BEGIN
             INSERT INTO note_versions
                 (note_uuid, version_number, title_snapshot, content_snapshot, editor_uuid)
             VALUES
                 (NEW.note_uuid, NEW.version_number, 'other', 'other', NEW.editor_uuid);
         END;",
    )
    .unwrap();

    let err = service
        .update(note.id, owner.id, NoteChanges::content("c2"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    conn.execute_batch("DROP TRIGGER claim_version_number;")
        .unwrap();
    assert!(service
        .versions()
        .list_versions(note.id, owner.id)
        .unwrap()
        .is_empty());
    assert_eq!(service.view(note.id, owner.id).unwrap().content, "c1");
    let actions: Vec<AuditAction> = service
        .note_activity(note.id, owner.id)
        .unwrap()
        .iter()
        .map(|record| record.entry.action)
        .collect();
    assert_eq!(actions, vec![AuditAction::View, AuditAction::Create]);
}
