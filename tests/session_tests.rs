use resmon::error::Error;
use resmon::session::{RecordingSession, SessionState};
use resmon::store::SampleStore;
use tempfile::tempdir;

mod common;
use common::sample_with_cpu;

fn open_session(db_path: &std::path::Path, interval_seconds: u64) -> RecordingSession {
    let store = SampleStore::open(db_path).unwrap();
    RecordingSession::new(store, interval_seconds).unwrap()
}

#[test]
fn test_idle_ticks_persist_nothing() {
    let dir = tempdir().unwrap();
    let mut session = open_session(&dir.path().join("test.db"), 1);

    for _ in 0..5 {
        session.on_tick(&sample_with_cpu(50.0)).unwrap();
    }

    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.store().count().unwrap(), 0);
    assert_eq!(session.elapsed_seconds(), None);
}

#[test]
fn test_recording_ticks_persist_in_order() {
    let dir = tempdir().unwrap();
    let mut session = open_session(&dir.path().join("test.db"), 1);

    session.start();
    for cpu in [10.0, 55.5, 99.9] {
        session.on_tick(&sample_with_cpu(cpu)).unwrap();
    }
    let summary = session.stop();

    assert_eq!(summary.samples_recorded, 3);
    let cpus: Vec<f64> = session
        .store()
        .get_samples(10)
        .unwrap()
        .iter()
        .map(|s| s.cpu_load_percent)
        .collect();
    assert_eq!(cpus, vec![10.0, 55.5, 99.9]);
}

#[test]
fn test_rejects_interval_below_one() {
    let dir = tempdir().unwrap();
    let store = SampleStore::open(&dir.path().join("test.db")).unwrap();
    assert!(matches!(
        RecordingSession::new(store, 0),
        Err(Error::InvalidConfig(_))
    ));

    let mut session = open_session(&dir.path().join("test2.db"), 3);
    assert!(matches!(
        session.configure(0),
        Err(Error::InvalidConfig(_))
    ));
    // Prior valid value survives the rejection.
    assert_eq!(session.interval_seconds(), 3);
}

#[test]
fn test_configure_rejected_while_recording() {
    let dir = tempdir().unwrap();
    let mut session = open_session(&dir.path().join("test.db"), 2);

    session.start();
    assert!(matches!(
        session.configure(5),
        Err(Error::InvalidConfig(_))
    ));
    assert_eq!(session.interval_seconds(), 2);
    assert!(session.is_recording());

    session.stop();
    session.configure(5).unwrap();
    assert_eq!(session.interval_seconds(), 5);
}

#[test]
fn test_start_while_recording_is_noop() {
    let dir = tempdir().unwrap();
    let mut session = open_session(&dir.path().join("test.db"), 1);

    session.start();
    session.on_tick(&sample_with_cpu(10.0)).unwrap();

    // A second start must not reset the running session.
    session.start();
    assert_eq!(session.samples_recorded(), 1);
    assert!(session.is_recording());
}

#[test]
fn test_stop_twice_is_idempotent() {
    let dir = tempdir().unwrap();
    let mut session = open_session(&dir.path().join("test.db"), 1);

    session.start();
    session.on_tick(&sample_with_cpu(10.0)).unwrap();
    let first = session.stop();
    assert_eq!(first.samples_recorded, 1);

    let second = session.stop();
    assert_eq!(second.samples_recorded, 0);
    assert_eq!(second.elapsed_seconds, 0);
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn test_each_start_begins_a_fresh_count() {
    let dir = tempdir().unwrap();
    let mut session = open_session(&dir.path().join("test.db"), 1);

    session.start();
    session.on_tick(&sample_with_cpu(10.0)).unwrap();
    session.on_tick(&sample_with_cpu(20.0)).unwrap();
    session.stop();

    session.start();
    session.on_tick(&sample_with_cpu(30.0)).unwrap();
    let summary = session.stop();

    // The second session counts only its own ticks; the store keeps all.
    assert_eq!(summary.samples_recorded, 1);
    assert_eq!(session.store().count().unwrap(), 3);
}

#[test]
fn test_failed_append_keeps_session_recording() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let mut session = open_session(&db_path, 1);

    session.start();
    session.on_tick(&sample_with_cpu(10.0)).unwrap();

    // Break the write path out from under the session.
    let saboteur = rusqlite::Connection::open(&db_path).unwrap();
    saboteur.execute("DROP TABLE monitoring", []).unwrap();

    let result = session.on_tick(&sample_with_cpu(20.0));
    assert!(matches!(result, Err(Error::WriteFailed(_))));
    // Non-fatal: still recording, the row is simply lost.
    assert!(session.is_recording());
    assert_eq!(session.samples_recorded(), 1);

    // Restore the table; the next tick lands again.
    saboteur
        .execute_batch(include_str!("../schema.sql"))
        .unwrap();
    session.on_tick(&sample_with_cpu(30.0)).unwrap();

    let summary = session.stop();
    assert_eq!(summary.samples_recorded, 2);
}
