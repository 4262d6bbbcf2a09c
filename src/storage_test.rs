use super::*;

// =============================================================================
// MemoryStorage
// =============================================================================

#[test]
fn memory_storage_starts_empty() {
    let storage = MemoryStorage::new();
    assert!(storage.get("token").is_none());
}

#[test]
fn memory_storage_set_get_remove() {
    let mut storage = MemoryStorage::new();
    storage.set("token", "abc").unwrap();
    assert_eq!(storage.get("token").as_deref(), Some("abc"));

    storage.remove("token").unwrap();
    assert!(storage.get("token").is_none());
}

#[test]
fn memory_storage_batch_applies_in_order() {
    let mut storage = MemoryStorage::new();
    storage
        .write(&[StorageWrite::Set("a", "1"), StorageWrite::Set("b", "2"), StorageWrite::Remove("a")])
        .unwrap();
    assert!(storage.get("a").is_none());
    assert_eq!(storage.get("b").as_deref(), Some("2"));
}

#[test]
fn memory_storage_clear_is_idempotent() {
    let mut storage = MemoryStorage::new();
    storage.set("token", "abc").unwrap();
    storage.clear().unwrap();
    storage.clear().unwrap();
    assert!(storage.get("token").is_none());
}

// =============================================================================
// FileStorage
// =============================================================================

#[test]
fn file_storage_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path().join("session.json")).unwrap();
    assert!(storage.get("token").is_none());
    assert!(!storage.path().exists());
}

#[test]
fn file_storage_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");

    let mut storage = FileStorage::open(&path).unwrap();
    storage
        .write(&[StorageWrite::Set("token", "abc123"), StorageWrite::Set("identity", "a@b.com")])
        .unwrap();
    drop(storage);

    let reopened = FileStorage::open(&path).unwrap();
    assert_eq!(reopened.get("token").as_deref(), Some("abc123"));
    assert_eq!(reopened.get("identity").as_deref(), Some("a@b.com"));
}

#[test]
fn file_storage_clear_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let mut storage = FileStorage::open(&path).unwrap();
    storage.set("token", "abc").unwrap();
    storage.clear().unwrap();

    let reopened = FileStorage::open(&path).unwrap();
    assert!(reopened.get("token").is_none());
}

#[test]
fn file_storage_writes_json_object() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let mut storage = FileStorage::open(&path).unwrap();
    storage.set("token", "abc").unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["token"], "abc");
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn file_storage_empty_file_is_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "  \n").unwrap();

    let storage = FileStorage::open(&path).unwrap();
    assert!(storage.get("token").is_none());
}

#[test]
fn file_storage_corrupt_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let err = FileStorage::open(&path).unwrap_err();
    assert!(matches!(err, StorageError::Corrupt { .. }));
}

#[test]
fn file_storage_failed_write_keeps_previous_state() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be makes the rename fail.
    let path = dir.path().join("session.json");
    std::fs::create_dir(&path).unwrap();

    let mut storage = FileStorage { path, entries: BTreeMap::new() };
    assert!(storage.set("token", "abc").is_err());
    assert!(storage.get("token").is_none());
}
