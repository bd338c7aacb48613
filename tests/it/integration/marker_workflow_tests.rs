//! End-to-end marker workflows over the headless backend.

use std::sync::Arc;
use std::thread;

use screenmarks::{
    DispatchError, PointGeometry, PointOptions, PointStyle, RectGeometry, RectOptions,
};

use crate::helpers::{TestManager, drag_gesture, resize_gesture, timeout, wait_for};

#[test]
fn test_register_drag_and_query_rect() {
    let tm = TestManager::new();

    // Fresh directory: defaults apply
    let geometry = tm.manager.register_rect("box", RectOptions::default()).unwrap();
    assert_eq!(geometry, RectGeometry::new(120, 120, 240, 160));
    let surface = tm.sole_surface();

    // Drag the body 50 right, 20 down
    drag_gesture(&tm.handle, surface, (5, 5), (125, 125), (175, 145));
    let moved = RectGeometry::new(170, 140, 240, 160);
    assert!(wait_for(
        || tm.manager.get_rect("box").unwrap() == Some(moved),
        timeout()
    ));

    // The release also landed on disk
    assert!(tm.config_path().exists());
    let content = std::fs::read_to_string(tm.config_path()).unwrap();
    assert!(content.contains("\"x\": 170"));

    tm.manager.destroy();
}

#[test]
fn test_resize_from_the_corner_handle() {
    let tm = TestManager::new();
    tm.manager.register_rect("box", RectOptions::default()).unwrap();
    let surface = tm.sole_surface();

    // Grow by (100, 50) from the bottom-right handle
    resize_gesture(&tm.handle, surface, (240, 160), (359, 279), (459, 329));
    let resized = RectGeometry::new(120, 120, 340, 210);
    assert!(wait_for(
        || tm.manager.get_rect("box").unwrap() == Some(resized),
        timeout()
    ));

    tm.manager.destroy();
}

#[test]
fn test_register_drag_and_query_point() {
    let tm = TestManager::new();

    let position = tm.manager.register_point("dot", PointOptions::default()).unwrap();
    assert_eq!(position, PointGeometry::new(160, 160));
    let surface = tm.sole_surface();

    // The point sits at the surface center; drag it to (400, 300)
    drag_gesture(&tm.handle, surface, (75, 75), (160, 160), (400, 300));
    assert!(wait_for(
        || tm.manager.get_point("dot").unwrap() == Some(PointGeometry::new(400, 300)),
        timeout()
    ));

    tm.manager.destroy();
}

#[test]
fn test_drag_never_leaves_the_screen() {
    let tm = TestManager::new();
    tm.manager.register_rect("box", RectOptions::default()).unwrap();
    let surface = tm.sole_surface();

    drag_gesture(&tm.handle, surface, (5, 5), (125, 125), (-10_000, -10_000));
    assert!(wait_for(
        || tm.manager.get_rect("box").unwrap() == Some(RectGeometry::new(0, 0, 240, 160)),
        timeout()
    ));

    tm.manager.destroy();
}

#[test]
fn test_oversized_point_style_survives_dragging() {
    let tm = TestManager::new();
    // A disc taller than the screen: the clamp floor exceeds its cap
    let style = PointStyle { point_size: 600, ..PointStyle::default() };
    tm.manager
        .register_point("big", PointOptions { x: Some(960), y: Some(540), style, label: None })
        .unwrap();
    let surface = tm.sole_surface();

    drag_gesture(&tm.handle, surface, (1200, 1200), (960, 540), (30, 20));
    // The worker survived the gesture and reports the pinned position
    assert!(wait_for(
        || tm.manager.get_point("big").unwrap() == Some(PointGeometry::new(1200, 600)),
        timeout()
    ));
    assert!(tm.config_path().exists());

    tm.manager.destroy();
}

#[test]
fn test_reregistration_reuses_the_surface() {
    let tm = TestManager::new();
    tm.manager.register_rect("box", RectOptions::default()).unwrap();

    let updated = tm
        .manager
        .register_rect(
            "box",
            RectOptions { x: Some(300), y: Some(400), ..RectOptions::default() },
        )
        .unwrap();

    assert_eq!((updated.x, updated.y), (300, 400));
    assert_eq!(tm.handle.surface_count(), 1);
    // Re-registration is silent: nothing was persisted
    assert!(!tm.config_path().exists());

    tm.manager.destroy();
}

#[test]
fn test_hide_all_and_show_all() {
    let tm = TestManager::new();
    tm.manager.register_rect("box", RectOptions::default()).unwrap();
    tm.manager.register_point("dot", PointOptions::default()).unwrap();
    assert_eq!(tm.handle.surface_count(), 2);

    tm.manager.hide_all().unwrap();
    assert_eq!(tm.handle.surface_count(), 0);
    // Hidden markers still answer queries
    assert!(tm.manager.get_rect("box").unwrap().is_some());

    tm.manager.show_all().unwrap();
    assert_eq!(tm.handle.surface_count(), 2);
    // Both are idempotent
    tm.manager.show_all().unwrap();
    assert_eq!(tm.handle.surface_count(), 2);

    tm.manager.destroy();
}

#[test]
fn test_destroy_tears_down_surfaces_and_rejects_later_calls() {
    let tm = TestManager::new();
    tm.manager.register_rect("box", RectOptions::default()).unwrap();
    tm.manager.register_point("dot", PointOptions::default()).unwrap();

    tm.manager.destroy();
    assert_eq!(tm.handle.surface_count(), 0);

    assert!(matches!(
        tm.manager.get_rect("box"),
        Err(DispatchError::Stopped)
    ));
    assert!(matches!(
        tm.manager.register_rect("box", RectOptions::default()),
        Err(DispatchError::Stopped)
    ));
    // Destroy twice is fine
    tm.manager.destroy();
}

#[test]
fn test_queries_from_many_threads_see_registered_state() {
    let tm = Arc::new(TestManager::new());
    tm.manager.register_rect("box", RectOptions::default()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let tm = Arc::clone(&tm);
            thread::spawn(move || tm.manager.get_rect("box").unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some(RectGeometry::new(120, 120, 240, 160)));
    }

    tm.manager.destroy();
}
