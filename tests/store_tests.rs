use resmon::error::Error;
use resmon::store::SampleStore;
use tempfile::tempdir;

mod common;
use common::sample_with_cpu;

#[test]
fn test_create_store() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let store = SampleStore::open(&db_path).unwrap();
    assert!(db_path.exists());
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_schema_creation_is_idempotent() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test.db");

    let store = SampleStore::open(&db_path).unwrap();
    store.append(&sample_with_cpu(12.5)).unwrap();
    store.close().unwrap();

    // Reopening runs the schema again; existing rows must survive.
    let store = SampleStore::open(&db_path).unwrap();
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_append_round_trip() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let store = SampleStore::open(&db_path).unwrap();

    let sample = sample_with_cpu(55.5);
    store.append(&sample).unwrap();

    let rows = store.get_samples(10).unwrap();
    assert_eq!(rows.len(), 1);
    // Field-for-field: integer MB/GB exact, cpu_load to f64 precision,
    // timestamp to the second.
    assert_eq!(rows[0], sample);
}

#[test]
fn test_appends_preserve_call_order() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let store = SampleStore::open(&db_path).unwrap();

    for cpu in [10.0, 55.5, 99.9] {
        store.append(&sample_with_cpu(cpu)).unwrap();
    }

    let cpus: Vec<f64> = store
        .get_samples(10)
        .unwrap()
        .iter()
        .map(|s| s.cpu_load_percent)
        .collect();
    assert_eq!(cpus, vec![10.0, 55.5, 99.9]);
}

#[test]
fn test_open_fails_when_path_is_unusable() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    // Parent "directory" is a plain file; opening must fail cleanly.
    let result = SampleStore::open(&blocker.join("test.db"));
    assert!(matches!(result, Err(Error::StorageUnavailable { .. })));
}
