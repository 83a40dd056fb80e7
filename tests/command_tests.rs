use drillboard::commands::*;
use drillboard::error::BoardError;
use drillboard::models::{MeasureUnit, TaskPatch, TaskStatus};
use drillboard::storage::TaskStore;
use std::fs;

fn with_test_store<F>(f: F)
where
    F: FnOnce(&TaskStore),
{
    let dir = tempfile::tempdir().unwrap();
    let store = TaskStore::new(dir.path().join("tasks.json"));
    f(&store);
}

#[test]
fn test_add_and_load() {
    with_test_store(|store| {
        let id = cmd_add(store, "DDH-001".into(), "perf_pq".into(), 42.5, Some("tramo 1".into()), true).unwrap();

        let tasks = store.load().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, id);
        assert_eq!(tasks[0].category, "Perforación PQ");
        assert_eq!(tasks[0].unit, MeasureUnit::Meters);
        assert_eq!(tasks[0].status, TaskStatus::Pending);
        assert_eq!(tasks[0].description.as_deref(), Some("tramo 1"));
    });
}

#[test]
fn test_add_unknown_category_saves_nothing() {
    with_test_store(|store| {
        let err = cmd_add(store, "Voladura".into(), "blasting".into(), 1.0, None, true).unwrap_err();
        assert!(matches!(err, BoardError::InvalidCategory(_)));
        assert!(!store.path().exists());
    });
}

#[test]
fn test_full_lifecycle() {
    with_test_store(|store| {
        let id = cmd_add(store, "Muestras".into(), "sampling".into(), 4.0, None, true).unwrap();

        cmd_move(store, id, TaskStatus::InProgress, true).unwrap();
        let t = store.load().unwrap().remove(0);
        assert!(t.started_at.is_some());
        assert!(t.completed_at.is_none());
        let started = t.started_at;

        cmd_move(store, id, TaskStatus::Done, true).unwrap();
        let t = store.load().unwrap().remove(0);
        assert_eq!(t.started_at, started);
        assert!(t.completed_at.is_some());
        assert!(t.created_at <= t.started_at.unwrap());
        assert!(t.started_at.unwrap() <= t.completed_at.unwrap());

        cmd_move(store, id, TaskStatus::InProgress, true).unwrap();
        let t = store.load().unwrap().remove(0);
        assert_eq!(t.started_at, started);
        assert!(t.completed_at.is_none());

        cmd_move(store, id, TaskStatus::Pending, true).unwrap();
        let t = store.load().unwrap().remove(0);
        assert!(t.started_at.is_none());
        assert!(t.completed_at.is_none());
    });
}

#[test]
fn test_done_from_pending_backfills_start() {
    with_test_store(|store| {
        let id = cmd_add(store, "Charla".into(), "safety_mtg".into(), 0.5, None, true).unwrap();
        cmd_move(store, id, TaskStatus::Done, true).unwrap();
        let t = store.load().unwrap().remove(0);
        assert_eq!(t.started_at, t.completed_at);
        assert!(t.completed_at.is_some());
    });
}

#[test]
fn test_edit_task() {
    with_test_store(|store| {
        let id = cmd_add(store, "Mapeo".into(), "mapeo_geo".into(), 10.0, None, true).unwrap();
        let patch = TaskPatch {
            title: Some("Mapeo DDH-002".into()),
            category: Some("Logueo Geotécnico".into()),
            quantity: Some(12.0),
            ..Default::default()
        };
        cmd_edit(store, id, patch, true).unwrap();

        let t = store.load().unwrap().remove(0);
        assert_eq!(t.title, "Mapeo DDH-002");
        assert_eq!(t.category, "Logueo Geotécnico");
        assert_eq!(t.quantity, 12.0);
        assert!(t.updated_at >= t.created_at);
    });
}

#[test]
fn test_missing_id_is_not_found() {
    with_test_store(|store| {
        cmd_add(store, "Mantenimiento".into(), "maintenance".into(), 2.0, None, true).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        assert!(matches!(cmd_move(store, 42, TaskStatus::Done, true), Err(BoardError::NotFound(42))));
        assert!(matches!(cmd_remove(store, 42, true), Err(BoardError::NotFound(42))));
        assert!(matches!(cmd_edit(store, 42, TaskPatch::default(), true), Err(BoardError::NotFound(42))));

        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    });
}

#[test]
fn test_remove_task() {
    with_test_store(|store| {
        let a = cmd_add(store, "A".into(), "rig_move".into(), 3.0, None, true).unwrap();
        let b = cmd_add(store, "B".into(), "rig_move".into(), 1.0, None, true).unwrap();
        cmd_remove(store, a, true).unwrap();

        let tasks = store.load().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, b);
    });
}

#[test]
fn test_corrupt_store_starts_empty() {
    with_test_store(|store| {
        fs::write(store.path(), "[{\"id\": ").unwrap();
        let id = cmd_add(store, "Piezómetro".into(), "install_piezo".into(), 1.0, None, true).unwrap();
        assert_eq!(id, 1);
        assert_eq!(store.load().unwrap().len(), 1);
    });
}

#[test]
fn test_report_rejects_bad_dates() {
    with_test_store(|store| {
        let err = cmd_report(store, Some("2025/03/01".into()), None).unwrap_err();
        assert!(matches!(err, BoardError::InvalidDate(_)));
    });
}
