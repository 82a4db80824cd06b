use cumple_core::db::open_db_in_memory;
use cumple_core::ids::trust_code;
use cumple_core::{ErrorKind, GroupDraft, GroupService, SqliteRecordStore};
use std::cell::RefCell;

fn draft(name: &str) -> GroupDraft {
    GroupDraft {
        name: name.to_string(),
        categories: vec!["friends".to_string()],
    }
}

/// Code source replaying a fixed script.
fn scripted(codes: &[&str]) -> impl Fn() -> String {
    let queue = RefCell::new(codes.iter().rev().map(|c| c.to_string()).collect::<Vec<_>>());
    move || queue.borrow_mut().pop().unwrap_or_else(|| "ZZZZZZ".to_string())
}

#[test]
fn create_group_makes_owner_the_first_member() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let groups = GroupService::new(&store);

    let id = groups.create_group(&draft("Familia García"), "u1").unwrap();
    let group = groups.get_group(&id).unwrap();

    assert_eq!(id, "familia-garca");
    assert_eq!(group.user_id, "u1");
    assert_eq!(group.members, vec!["u1"]);
    assert!(trust_code::is_valid(&group.trust_code));
    assert_eq!(group.categories, vec!["friends"]);
}

#[test]
fn repeated_group_name_gets_numbered_id() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let groups = GroupService::new(&store);

    assert_eq!(groups.create_group(&draft("Amigos"), "u1").unwrap(), "amigos");
    assert_eq!(groups.create_group(&draft("Amigos"), "u1").unwrap(), "amigos-1");
}

#[test]
fn another_owner_reusing_a_group_name_gets_suffix() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let groups = GroupService::new(&store);

    assert_eq!(groups.create_group(&draft("Familia"), "u1").unwrap(), "familia");
    let id = groups.create_group(&draft("Familia"), "u2").unwrap();

    assert_eq!(id, "familia-1");
    let group = groups.get_group(&id).unwrap();
    assert_eq!(group.user_id, "u2");
    assert_eq!(group.members, vec!["u2"]);
    assert_eq!(groups.groups_for_member("u2").unwrap().len(), 1);
}

#[test]
fn colliding_trust_code_is_redrawn() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let groups = GroupService::with_code_source(&store, scripted(&["AAA111", "AAA111", "BBB222"]));

    let first = groups.create_group(&draft("Uno"), "u1").unwrap();
    let second = groups.create_group(&draft("Dos"), "u1").unwrap();

    assert_eq!(groups.get_group(&first).unwrap().trust_code, "AAA111");
    assert_eq!(groups.get_group(&second).unwrap().trust_code, "BBB222");
}

#[test]
fn exhausted_code_source_is_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let groups = GroupService::with_code_source(&store, || "AAA111".to_string());

    groups.create_group(&draft("Uno"), "u1").unwrap();
    let err = groups.create_group(&draft("Dos"), "u1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn join_by_trust_code_accepts_display_form() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let groups = GroupService::with_code_source(&store, scripted(&["ABC123"]));
    let id = groups.create_group(&draft("Clase"), "owner").unwrap();

    let joined = groups.join_group_by_trust_code("abc-123", "guest").unwrap();
    assert_eq!(joined.id, id);
    assert_eq!(joined.members, vec!["owner", "guest"]);

    let listed = groups.groups_for_member("guest").unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);

    let again = groups.join_group_by_trust_code("ABC123", "guest").unwrap_err();
    assert_eq!(again.kind(), ErrorKind::Conflict);
}

#[test]
fn trust_code_lookup_errors() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let groups = GroupService::new(&store);

    assert_eq!(
        groups.find_group_by_trust_code("ab!").unwrap_err().kind(),
        ErrorKind::Validation
    );
    assert!(groups.find_group_by_trust_code("QQQ999").unwrap().is_none());
    assert_eq!(
        groups.join_group_by_trust_code("QQQ999", "u2").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn only_owner_rotates_code_and_old_code_stops_working() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let groups = GroupService::with_code_source(&store, scripted(&["OLD111", "NEW222"]));
    let id = groups.create_group(&draft("Clase"), "owner").unwrap();

    let err = groups.regenerate_trust_code(&id, "guest").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    assert_eq!(groups.regenerate_trust_code(&id, "owner").unwrap(), "NEW222");
    assert!(groups.find_group_by_trust_code("OLD111").unwrap().is_none());
    assert_eq!(
        groups.find_group_by_trust_code("new-222").unwrap().unwrap().id,
        id
    );
}

#[test]
fn members_leave_but_owner_cannot() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let groups = GroupService::with_code_source(&store, scripted(&["JOIN01"]));
    let id = groups.create_group(&draft("Clase"), "owner").unwrap();
    groups.join_group_by_trust_code("JOIN01", "guest").unwrap();

    assert_eq!(
        groups.leave_group(&id, "owner").unwrap_err().kind(),
        ErrorKind::Forbidden
    );
    groups.leave_group(&id, "guest").unwrap();
    groups.leave_group(&id, "guest").unwrap();

    assert_eq!(groups.get_group(&id).unwrap().members, vec!["owner"]);
    assert!(groups.groups_for_member("guest").unwrap().is_empty());
}

#[test]
fn update_and_delete_group() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let groups = GroupService::new(&store);
    let id = groups.create_group(&draft("Clase"), "owner").unwrap();

    groups
        .update_group(
            &id,
            &GroupDraft {
                name: "Clase B".to_string(),
                categories: vec!["school".to_string()],
            },
        )
        .unwrap();
    let updated = groups.get_group(&id).unwrap();
    assert_eq!(updated.id, "clase");
    assert_eq!(updated.name, "Clase B");
    assert_eq!(updated.categories, vec!["school"]);

    groups.delete_group(&id).unwrap();
    assert_eq!(groups.get_group(&id).unwrap_err().kind(), ErrorKind::NotFound);
}
