use cumple_core::db::open_db_in_memory;
use cumple_core::{DirectoryService, ErrorKind, SqliteRecordStore};

#[test]
fn schools_get_unique_slug_ids() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let directory = DirectoryService::new(&store);

    assert_eq!(directory.add_school("Brains - Las Palmas").unwrap(), "brains-las-palmas");
    assert_eq!(directory.add_school("Brains").unwrap(), "brains");
    assert_eq!(directory.add_school("  brains ").unwrap(), "brains-1");

    let names: Vec<String> = directory
        .list_schools()
        .unwrap()
        .into_iter()
        .map(|school| school.name)
        .collect();
    assert_eq!(names, vec!["Brains", "brains", "Brains - Las Palmas"]);
}

#[test]
fn repeated_class_name_gets_numbered_id() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let directory = DirectoryService::new(&store);
    let school = directory.add_school("Brains").unwrap();

    assert_eq!(directory.add_class("Patos", &school).unwrap(), "patos");
    assert_eq!(directory.add_class("Patos", &school).unwrap(), "patos-1");

    let classes = directory.list_classes(&school).unwrap();
    assert_eq!(classes.len(), 2);
    assert!(classes.iter().all(|class| class.school_id == school));
    assert!(directory.list_classes("otro").unwrap().is_empty());
}

#[test]
fn same_class_name_under_another_school_gets_suffix() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let directory = DirectoryService::new(&store);
    let first = directory.add_school("Uno").unwrap();
    let second = directory.add_school("Dos").unwrap();

    assert_eq!(directory.add_class("Infantil", &first).unwrap(), "infantil");
    assert_eq!(directory.add_class("Infantil", &second).unwrap(), "infantil-1");

    let classes = directory.list_classes(&second).unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].id, "infantil-1");
    assert_eq!(classes[0].school_id, second);
}

#[test]
fn invalid_input_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let directory = DirectoryService::new(&store);

    assert_eq!(directory.add_school("¿¡!?").unwrap_err().kind(), ErrorKind::Validation);
    assert_eq!(
        directory.add_class("Patos", "missing").unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        directory.rename_school("missing", "Nuevo").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn rename_keeps_id_and_delete_removes() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let directory = DirectoryService::new(&store);
    let school = directory.add_school("Brains").unwrap();
    let class = directory.add_class("Patos", &school).unwrap();

    directory.rename_school(&school, "Brains Norte").unwrap();
    directory.rename_class(&class, "Patitos").unwrap();
    let schools = directory.list_schools().unwrap();
    assert_eq!(schools[0].id, "brains");
    assert_eq!(schools[0].name, "Brains Norte");
    assert_eq!(directory.list_classes(&school).unwrap()[0].name, "Patitos");

    directory.delete_class(&class).unwrap();
    directory.delete_school(&school).unwrap();
    assert!(directory.list_schools().unwrap().is_empty());
    assert!(directory.list_classes(&school).unwrap().is_empty());
}
