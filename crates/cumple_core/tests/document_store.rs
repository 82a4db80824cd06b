use cumple_core::db::open_db_in_memory;
use cumple_core::{Collection, Document, RecordStore, SqliteRecordStore, StoreError};
use serde_json::{json, Value};

fn body(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("test body must be an object, got {other}"),
    }
}

#[test]
fn create_with_id_then_get() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    store
        .create_with_id(Collection::Schools, "brains", &body(json!({ "name": "Brains" })))
        .unwrap();

    let loaded = store.get(Collection::Schools, "brains").unwrap().unwrap();
    assert_eq!(loaded.id, "brains");
    assert_eq!(loaded.str_field("name"), Some("Brains"));
    assert!(!loaded.data.contains_key("id"));
    assert!(store.get(Collection::Classes, "brains").unwrap().is_none());
}

#[test]
fn duplicate_id_is_a_conflict_and_keeps_the_original() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    store
        .create_with_id(Collection::Groups, "familia", &body(json!({ "name": "A" })))
        .unwrap();
    let err = store
        .create_with_id(Collection::Groups, "familia", &body(json!({ "name": "B" })))
        .unwrap_err();

    assert!(matches!(err, StoreError::Conflict { collection: Collection::Groups, .. }));
    let kept = store.get(Collection::Groups, "familia").unwrap().unwrap();
    assert_eq!(kept.str_field("name"), Some("A"));
}

#[test]
fn same_id_in_different_collections_is_allowed() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    store
        .create_with_id(Collection::Schools, "patos", &body(json!({ "name": "Patos" })))
        .unwrap();
    store
        .create_with_id(Collection::Classes, "patos", &body(json!({ "name": "Patos" })))
        .unwrap();
}

#[test]
fn create_generates_distinct_ids() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    let first = store
        .create(Collection::Events, &body(json!({ "name": "A" })))
        .unwrap();
    let second = store
        .create(Collection::Events, &body(json!({ "name": "B" })))
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(first.len(), 32);
}

#[test]
fn update_merges_shallowly_and_requires_existing_document() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    store
        .create_with_id(
            Collection::Birthdays,
            "b1",
            &body(json!({ "name": "Leo", "birthDate": "2019-04-02" })),
        )
        .unwrap();
    store
        .update(
            Collection::Birthdays,
            "b1",
            &body(json!({ "classId": "patos", "name": "Leo M." })),
        )
        .unwrap();

    let loaded = store.get(Collection::Birthdays, "b1").unwrap().unwrap();
    assert_eq!(loaded.str_field("name"), Some("Leo M."));
    assert_eq!(loaded.str_field("birthDate"), Some("2019-04-02"));
    assert_eq!(loaded.str_field("classId"), Some("patos"));

    let err = store
        .update(Collection::Birthdays, "missing", &body(json!({ "classId": "x" })))
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[test]
fn delete_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    store
        .create_with_id(Collection::Classes, "ranas", &body(json!({ "name": "Ranas" })))
        .unwrap();
    store.delete(Collection::Classes, "ranas").unwrap();
    store.delete(Collection::Classes, "ranas").unwrap();
    assert!(store.get(Collection::Classes, "ranas").unwrap().is_none());
}

#[test]
fn queries_filter_by_field_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    for (id, school) in [("c", "brains"), ("a", "otro"), ("b", "brains")] {
        store
            .create_with_id(
                Collection::Classes,
                id,
                &body(json!({ "name": id, "schoolId": school })),
            )
            .unwrap();
    }

    let all: Vec<String> = store
        .query_all(Collection::Classes)
        .unwrap()
        .into_iter()
        .map(|doc| doc.id)
        .collect();
    assert_eq!(all, vec!["c", "a", "b"]);

    let brains: Vec<String> = store
        .query_by_field(Collection::Classes, "schoolId", &json!("brains"))
        .unwrap()
        .into_iter()
        .map(|doc| doc.id)
        .collect();
    assert_eq!(brains, vec!["c", "b"]);
}

#[test]
fn non_object_body_is_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO documents (collection, id, data) VALUES ('schools', 'bad', '[1,2]');",
        [],
    )
    .unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    let err = store.get(Collection::Schools, "bad").unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}
