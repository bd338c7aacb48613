//! Unit tests for the config store, through the public API.

use std::fs;

use screenmarks::{ConfigDocument, ConfigStore, RectGeometry, RectRecord};
use tempfile::tempdir;

#[test]
fn test_new_creates_missing_directories() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("deeply").join("nested");
    let store = ConfigStore::new(&nested).unwrap();
    assert!(nested.is_dir());
    assert_eq!(store.path(), nested.join("overlays.json"));
}

#[test]
fn test_unknown_top_level_keys_are_dropped_on_save() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path()).unwrap();
    fs::write(
        store.path(),
        r#"{"rects": {}, "points": {}, "future_namespace": {"x": 1}}"#,
    )
    .unwrap();

    let document = store.load();
    store.save(&document).unwrap();

    let content = fs::read_to_string(store.path()).unwrap();
    assert!(!content.contains("future_namespace"));
}

#[test]
fn test_overwrite_replaces_previous_document() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path()).unwrap();

    let mut document = ConfigDocument::default();
    document.rects.insert(
        "a".into(),
        RectRecord::from_geometry(RectGeometry::new(0, 0, 100, 100), String::new()),
    );
    store.save(&document).unwrap();

    document.rects.clear();
    document.rects.insert(
        "b".into(),
        RectRecord::from_geometry(RectGeometry::new(1, 1, 100, 100), String::new()),
    );
    store.save(&document).unwrap();

    let reloaded = store.load();
    assert!(!reloaded.rects.contains_key("a"));
    assert!(reloaded.rects.contains_key("b"));
}

#[test]
fn test_empty_document_round_trips() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path()).unwrap();
    store.save(&ConfigDocument::default()).unwrap();

    let reloaded = store.load();
    assert!(reloaded.rects.is_empty());
    assert!(reloaded.points.is_empty());
}

#[test]
fn test_legacy_rects_only_migrates() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("rects.json"),
        r#"{"solo": {"x": 1, "y": 2, "width": 100, "height": 80}}"#,
    )
    .unwrap();

    let store = ConfigStore::new(dir.path()).unwrap();
    let document = store.load();
    assert_eq!(document.rects["solo"].geometry(), RectGeometry::new(1, 2, 100, 80));
    assert!(document.points.is_empty());
    assert!(store.path().exists());
}
