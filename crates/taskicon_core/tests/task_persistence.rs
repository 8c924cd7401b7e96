use std::fs;
use taskicon_core::{JsonFileStorage, TaskKind, TaskStorage, TaskStore};
use tempfile::tempdir;

#[test]
fn reopening_restores_identical_ordered_tasks() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("TaskiferTasks").join("tasks.json");

    let expected = {
        let mut store = TaskStore::open(JsonFileStorage::new(&path));
        let a = store.add("Buy milk", TaskKind::OneTime).unwrap();
        store.add("Stretch", TaskKind::RepeatDaily).unwrap();
        let c = store.add("Buy milk", TaskKind::OneTime).unwrap();
        store.toggle(a);
        store.toggle(c);
        store.tasks().to_vec()
    };

    let reopened = TaskStore::open(JsonFileStorage::new(&path));
    assert_eq!(reopened.tasks(), expected.as_slice());
}

#[test]
fn missing_file_opens_empty() {
    let dir = tempdir().unwrap();
    let storage = JsonFileStorage::new(dir.path().join("tasks.json"));

    let store = TaskStore::open(storage.clone());

    assert!(store.is_empty());
    assert!(!storage.path().exists());
}

#[test]
fn corrupted_file_opens_empty_and_is_replaced_on_next_mutation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    fs::write(&path, "not json at all").unwrap();

    let mut store = TaskStore::open(JsonFileStorage::new(&path));
    assert!(store.is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap(), "not json at all");

    store.add("fresh start", TaskKind::OneTime).unwrap();

    let reloaded = JsonFileStorage::new(&path).load().unwrap().unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(
        fs::read_to_string(dir.path().join("tasks.json.corrupt")).unwrap(),
        "not json at all"
    );
}

#[test]
fn non_utf8_file_is_preserved_before_being_replaced() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    let raw: &[u8] = b"[{\"title\": \"caf\xe9\"}]";
    fs::write(&path, raw).unwrap();

    let mut store = TaskStore::open(JsonFileStorage::new(&path));
    assert!(store.is_empty());
    assert_eq!(fs::read(&path).unwrap(), raw);

    store.add("fresh start", TaskKind::OneTime).unwrap();

    let reloaded = JsonFileStorage::new(&path).load().unwrap().unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(fs::read(dir.path().join("tasks.json.corrupt")).unwrap(), raw);
}

#[test]
fn startup_rewrites_file_in_normalized_form() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    fs::write(
        &path,
        r#"[{"id":"11111111-2222-4333-8444-555555555555","title":"Stretch","type":"repeat_daily","is_completed":true,"created_at":"2025-06-01T09:30:00+09:00"}]"#,
    )
    .unwrap();

    let store = TaskStore::open(JsonFileStorage::new(&path));

    assert_eq!(store.len(), 1);
    let rewritten = fs::read_to_string(&path).unwrap();
    assert!(rewritten.contains('\n'));
    assert!(rewritten.contains("\"created_at\": \"2025-06-01T00:30:00Z\""));
}

#[test]
fn unwritable_location_keeps_session_state() {
    let dir = tempdir().unwrap();
    let mut store = TaskStore::open(JsonFileStorage::new(dir.path()));

    let id = store.add("in memory only", TaskKind::OneTime).unwrap();
    store.toggle(id);

    assert_eq!(store.len(), 1);
    assert_eq!(store.progress(), 1.0);
}
