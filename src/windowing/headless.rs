//! In-memory windowing backend.
//!
//! Deterministic stand-in for a real toolkit: surfaces are plain structs,
//! pointer events are injected through a cloneable [`HeadlessHandle`], and
//! tests can inspect every surface's geometry and shape list. This is the
//! backend the integration tests drive; hosts without a native toolkit can
//! use it as a reference implementation.

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{OverlaySurface, PointerEvent, Shape, SurfaceEvent, SurfaceId, SurfaceParams, WindowingSystem};

#[derive(Clone, Debug)]
pub struct SurfaceSnapshot {
    pub id: SurfaceId,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub alpha: f32,
    pub shapes: Vec<Shape>,
}

#[derive(Default)]
struct Shared {
    next_id: u64,
    surfaces: BTreeMap<SurfaceId, SurfaceSnapshot>,
    events: VecDeque<SurfaceEvent>,
}

/// Test-side handle onto a headless windowing system.
///
/// Cloneable and thread-safe, so a test can keep it while the windowing
/// system itself lives on the dispatcher's worker thread.
#[derive(Clone)]
pub struct HeadlessHandle {
    screen: (i32, i32),
    shared: Arc<Mutex<Shared>>,
}

impl HeadlessHandle {
    pub fn new(screen_width: i32, screen_height: i32) -> Self {
        Self {
            screen: (screen_width, screen_height),
            shared: Arc::new(Mutex::new(Shared::default())),
        }
    }

    /// Build the windowing system backed by this handle. Call once per
    /// dispatcher start; the handle stays usable afterwards.
    pub fn windowing(&self) -> HeadlessWindowing {
        HeadlessWindowing {
            screen: self.screen,
            shared: Arc::clone(&self.shared),
        }
    }

    /// Queue a pointer event for the next `process_events` iteration.
    pub fn push_pointer(&self, surface: SurfaceId, pointer: PointerEvent) {
        self.shared.lock().events.push_back(SurfaceEvent { surface, pointer });
    }

    /// Snapshot of every live surface, ordered by creation.
    pub fn surfaces(&self) -> Vec<SurfaceSnapshot> {
        self.shared.lock().surfaces.values().cloned().collect()
    }

    pub fn surface_count(&self) -> usize {
        self.shared.lock().surfaces.len()
    }

    /// The only live surface, if exactly one exists.
    pub fn sole_surface(&self) -> Option<SurfaceSnapshot> {
        let guard = self.shared.lock();
        if guard.surfaces.len() == 1 {
            guard.surfaces.values().next().cloned()
        } else {
            None
        }
    }
}

/// The worker-thread half. Implements [`WindowingSystem`] against the shared
/// state owned jointly with the handle.
pub struct HeadlessWindowing {
    screen: (i32, i32),
    shared: Arc<Mutex<Shared>>,
}

impl WindowingSystem for HeadlessWindowing {
    fn screen_size(&self) -> (i32, i32) {
        self.screen
    }

    fn create_surface(&mut self, params: SurfaceParams) -> anyhow::Result<Box<dyn OverlaySurface>> {
        let mut guard = self.shared.lock();
        let id = SurfaceId(guard.next_id);
        guard.next_id += 1;
        guard.surfaces.insert(
            id,
            SurfaceSnapshot {
                id,
                x: params.x,
                y: params.y,
                width: params.width,
                height: params.height,
                alpha: params.alpha,
                shapes: Vec::new(),
            },
        );
        Ok(Box::new(HeadlessSurface {
            id,
            shared: Arc::clone(&self.shared),
        }))
    }

    fn process_events(&mut self) -> Vec<SurfaceEvent> {
        let mut guard = self.shared.lock();
        let Shared { surfaces, events, .. } = &mut *guard;
        events
            .drain(..)
            .filter(|event| surfaces.contains_key(&event.surface))
            .collect()
    }
}

struct HeadlessSurface {
    id: SurfaceId,
    shared: Arc<Mutex<Shared>>,
}

impl OverlaySurface for HeadlessSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn set_geometry(&mut self, x: i32, y: i32, width: i32, height: i32) {
        if let Some(surface) = self.shared.lock().surfaces.get_mut(&self.id) {
            surface.x = x;
            surface.y = y;
            surface.width = width;
            surface.height = height;
        }
    }

    fn redraw(&mut self, shapes: &[Shape]) {
        if let Some(surface) = self.shared.lock().surfaces.get_mut(&self.id) {
            surface.shapes = shapes.to_vec();
        }
    }
}

impl Drop for HeadlessSurface {
    fn drop(&mut self) {
        self.shared.lock().surfaces.remove(&self.id);
    }
}
