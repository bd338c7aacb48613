//! Persistence workflows: restarts, seeded files, legacy migration.

use std::fs;

use screenmarks::{PointGeometry, PointOptions, RectGeometry, RectOptions};

use crate::helpers::{TestManager, drag_gesture, timeout, wait_for};

#[test]
fn test_geometry_survives_a_restart() {
    let tm = TestManager::new();
    tm.manager.register_rect("box", RectOptions::default()).unwrap();
    let surface = tm.sole_surface();

    drag_gesture(&tm.handle, surface, (5, 5), (125, 125), (625, 425));
    let moved = RectGeometry::new(620, 420, 240, 160);
    assert!(wait_for(
        || tm.manager.get_rect("box").unwrap() == Some(moved),
        timeout()
    ));

    // "Restart": tear the manager down, rebuild over the same directory
    let TestManager { manager, dir, .. } = tm;
    manager.destroy();
    drop(manager);

    let tm = TestManager::in_dir(dir);
    // The record answers queries before the marker is even registered
    assert_eq!(tm.manager.get_rect("box").unwrap(), Some(moved));
    // Registering without options seeds from the record
    let geometry = tm.manager.register_rect("box", RectOptions::default()).unwrap();
    assert_eq!(geometry, moved);

    tm.manager.destroy();
}

#[test]
fn test_undersized_persisted_rect_is_clamped_label_kept() {
    let tm = TestManager::new();
    fs::write(
        tm.config_path(),
        r#"{"rects": {"tiny": {"x": 30, "y": 40, "width": 10, "height": 10, "label": "Tiny"}}}"#,
    )
    .unwrap();

    let geometry = tm.manager.register_rect("tiny", RectOptions::default()).unwrap();
    assert_eq!(geometry, RectGeometry::new(30, 40, 50, 50));

    let snapshot = tm.handle.sole_surface().unwrap();
    assert_eq!((snapshot.width, snapshot.height), (50, 50));
    // Label came from the record, not the id
    assert!(snapshot.shapes.iter().any(|shape| {
        matches!(shape, screenmarks::windowing::Shape::Label { text, .. } if text == "Tiny")
    }));

    tm.manager.destroy();
}

#[test]
fn test_legacy_files_migrate_once() {
    let tm = TestManager::new();
    fs::write(
        tm.dir.path().join("rects.json"),
        r#"{"old-box": {"x": 15, "y": 25, "width": 120, "height": 90, "label": "Old"}}"#,
    )
    .unwrap();
    fs::write(
        tm.dir.path().join("points.json"),
        r#"{"old-dot": {"x": 640, "y": 480}}"#,
    )
    .unwrap();

    // First call starts the worker, which loads and migrates
    assert_eq!(
        tm.manager.get_rect("old-box").unwrap(),
        Some(RectGeometry::new(15, 25, 120, 90))
    );
    assert_eq!(
        tm.manager.get_point("old-dot").unwrap(),
        Some(PointGeometry::new(640, 480))
    );
    assert!(tm.config_path().exists());

    // Restart: legacy files are stale now and must be ignored
    fs::write(
        tm.dir.path().join("rects.json"),
        r#"{"sneaky": {"x": 0, "y": 0, "width": 50, "height": 50}}"#,
    )
    .unwrap();
    let TestManager { manager, dir, .. } = tm;
    manager.destroy();
    drop(manager);

    let tm = TestManager::in_dir(dir);
    assert!(tm.manager.get_rect("old-box").unwrap().is_some());
    assert!(tm.manager.get_rect("sneaky").unwrap().is_none());

    tm.manager.destroy();
}

#[test]
fn test_corrupt_config_starts_empty() {
    let tm = TestManager::new();
    fs::write(tm.config_path(), "{definitely not json").unwrap();

    assert_eq!(tm.manager.get_rect("anything").unwrap(), None);
    let geometry = tm.manager.register_rect("fresh", RectOptions::default()).unwrap();
    assert_eq!(geometry, RectGeometry::new(120, 120, 240, 160));

    tm.manager.destroy();
}

#[test]
fn test_point_release_persists_both_namespaces() {
    let tm = TestManager::new();
    tm.manager.register_rect("box", RectOptions::default()).unwrap();
    tm.manager
        .register_point("dot", PointOptions { x: Some(500), y: Some(500), ..PointOptions::default() })
        .unwrap();

    let point_surface = tm
        .handle
        .surfaces()
        .into_iter()
        .find(|s| s.width == s.height)
        .expect("point surface is square")
        .id;
    drag_gesture(&tm.handle, point_surface, (75, 75), (500, 500), (550, 450));

    assert!(wait_for(
        || tm.manager.get_point("dot").unwrap() == Some(PointGeometry::new(550, 450)),
        timeout()
    ));

    let content = fs::read_to_string(tm.config_path()).unwrap();
    let document: screenmarks::ConfigDocument = serde_json::from_str(&content).unwrap();
    // Only the released marker has a record; registration alone writes nothing
    assert!(document.rects.is_empty());
    assert_eq!(document.points["dot"].geometry(), PointGeometry::new(550, 450));
    assert_eq!(document.points["dot"].label, "dot");

    tm.manager.destroy();
}
