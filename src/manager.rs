//! Marker registry and public entry point.
//!
//! [`OverlayManager`] is the only type most hosts touch. It owns a
//! [`Dispatcher`] whose worker thread holds the windowing system, every
//! live marker, the in-memory config document and the [`ConfigStore`];
//! each public call round-trips synchronously through the dispatcher, so
//! callers on any thread observe marker state in strict submission order.
//!
//! The worker's per-tick pump routes pointer events to the owning marker
//! and persists the final geometry a marker reports on pointer release.
//! Registering a marker never writes the config file; only releases do.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

use crate::config::{ConfigDocument, ConfigStore, default_config_dir};
use crate::constants::{DEFAULT_POINT, DEFAULT_RECT, DEFAULT_TICK_MS, JOIN_TIMEOUT_MS};
use crate::dispatch::{DispatchError, Dispatcher};
use crate::marker::{PointMarker, RectMarker};
use crate::types::{
    PointGeometry, PointRecord, PointStyle, RectGeometry, RectRecord, RectStyle,
};
use crate::windowing::{SurfaceEvent, WindowingSystem};

/// Registration options for a rectangle marker. Unset fields fall back to
/// the persisted record for that id, then to the built-in defaults.
#[derive(Clone, Debug, Default)]
pub struct RectOptions {
    pub label: Option<String>,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub style: RectStyle,
}

/// Registration options for a point marker.
#[derive(Clone, Debug, Default)]
pub struct PointOptions {
    pub label: Option<String>,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub style: PointStyle,
}

/// Thread-safe facade over the worker-thread marker registry.
pub struct OverlayManager {
    dispatcher: Dispatcher<OverlayRuntime>,
}

impl OverlayManager {
    /// Build a manager persisting under `config_dir` (the per-user default
    /// directory when `None`) and creating surfaces through `windowing`.
    ///
    /// The factory runs on the worker thread the first time a public call
    /// starts it, so the windowing system itself never crosses threads.
    pub fn new<F>(config_dir: Option<PathBuf>, windowing: F) -> Self
    where
        F: Fn() -> anyhow::Result<Box<dyn WindowingSystem>> + Send + Sync + 'static,
    {
        Self::with_tick(config_dir, windowing, Duration::from_millis(DEFAULT_TICK_MS))
    }

    /// As [`new`](OverlayManager::new) with an explicit pump interval.
    pub fn with_tick<F>(config_dir: Option<PathBuf>, windowing: F, tick: Duration) -> Self
    where
        F: Fn() -> anyhow::Result<Box<dyn WindowingSystem>> + Send + Sync + 'static,
    {
        let init = move || -> anyhow::Result<OverlayRuntime> {
            let dir = match &config_dir {
                Some(dir) => dir.clone(),
                None => default_config_dir().context("cannot determine home directory")?,
            };
            let store = ConfigStore::new(dir)?;
            let document = store.load();
            tracing::debug!(
                rects = document.rects.len(),
                points = document.points.len(),
                "overlay runtime initialized"
            );
            Ok(OverlayRuntime {
                windowing: windowing()?,
                rects: BTreeMap::new(),
                points: BTreeMap::new(),
                store,
                document,
            })
        };
        Self {
            dispatcher: Dispatcher::new(init, OverlayRuntime::pump_events, tick),
        }
    }

    /// Register (or re-register) a rectangle marker and show it.
    ///
    /// Returns the effective geometry after the merge with persisted state
    /// and the minimum-size floor.
    pub fn register_rect(
        &self,
        id: impl Into<String>,
        options: RectOptions,
    ) -> Result<RectGeometry, DispatchError> {
        let id = id.into();
        self.dispatcher.start()?;
        self.dispatcher
            .submit(move |runtime| runtime.register_rect(&id, options))
    }

    /// Register (or re-register) a point marker and show it.
    pub fn register_point(
        &self,
        id: impl Into<String>,
        options: PointOptions,
    ) -> Result<PointGeometry, DispatchError> {
        let id = id.into();
        self.dispatcher.start()?;
        self.dispatcher
            .submit(move |runtime| runtime.register_point(&id, options))
    }

    /// Current geometry of a rectangle: live marker first, then the
    /// persisted record, then `None`.
    pub fn get_rect(&self, id: impl Into<String>) -> Result<Option<RectGeometry>, DispatchError> {
        let id = id.into();
        self.dispatcher.start()?;
        self.dispatcher.submit(move |runtime| Ok(runtime.get_rect(&id)))
    }

    /// Current position of a point, same lookup order as [`get_rect`].
    ///
    /// [`get_rect`]: OverlayManager::get_rect
    pub fn get_point(&self, id: impl Into<String>) -> Result<Option<PointGeometry>, DispatchError> {
        let id = id.into();
        self.dispatcher.start()?;
        self.dispatcher.submit(move |runtime| Ok(runtime.get_point(&id)))
    }

    /// Hide every live marker. Registrations and persisted records survive.
    pub fn hide_all(&self) -> Result<(), DispatchError> {
        self.dispatcher.start()?;
        self.dispatcher.submit(|runtime| {
            runtime.hide_all();
            Ok(())
        })
    }

    /// Show every live marker hidden by [`hide_all`](OverlayManager::hide_all).
    pub fn show_all(&self) -> Result<(), DispatchError> {
        self.dispatcher.start()?;
        self.dispatcher.submit(|runtime| runtime.show_all())
    }

    /// Tear down every marker and stop the worker thread.
    ///
    /// Permanent: later calls on this manager fail with
    /// [`DispatchError::Stopped`]. Safe to call more than once.
    pub fn destroy(&self) {
        if !self.dispatcher.is_stopped() {
            let _ = self.dispatcher.submit(|runtime| {
                runtime.clear();
                Ok(())
            });
        }
        self.dispatcher.stop(Duration::from_millis(JOIN_TIMEOUT_MS));
    }
}

impl Drop for OverlayManager {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Worker-thread state: everything only the UI thread may touch.
struct OverlayRuntime {
    windowing: Box<dyn WindowingSystem>,
    rects: BTreeMap<String, RectMarker>,
    points: BTreeMap<String, PointMarker>,
    store: ConfigStore,
    document: ConfigDocument,
}

impl OverlayRuntime {
    /// One pump iteration: collect pending pointer events and feed each to
    /// the marker owning its surface, persisting any released geometry.
    ///
    /// A panic while routing one event is contained here; it must never
    /// take the worker thread (and every marker with it) down.
    fn pump_events(&mut self) {
        let screen = self.windowing.screen_size();
        for event in self.windowing.process_events() {
            let routed = panic::catch_unwind(AssertUnwindSafe(|| self.route_event(event, screen)));
            if routed.is_err() {
                tracing::error!(surface = event.surface.0, "pointer event handler panicked");
            }
        }
    }

    fn route_event(&mut self, event: SurfaceEvent, screen: (i32, i32)) {
        let rect_release = self
            .rects
            .iter_mut()
            .find(|(_, marker)| marker.surface_id() == Some(event.surface))
            .map(|(id, marker)| {
                let released = marker.handle_pointer(event.pointer, screen);
                (id.clone(), marker.label().to_string(), released)
            });
        if let Some((id, label, released)) = rect_release {
            if let Some(geometry) = released {
                self.commit_rect(&id, geometry, label);
            }
            return;
        }

        let point_release = self
            .points
            .iter_mut()
            .find(|(_, marker)| marker.surface_id() == Some(event.surface))
            .map(|(id, marker)| {
                let released = marker.handle_pointer(event.pointer, screen);
                (id.clone(), marker.label().to_string(), released)
            });
        if let Some((id, label, released)) = point_release {
            if let Some(position) = released {
                self.commit_point(&id, position, label);
            }
        }
    }

    fn register_rect(&mut self, id: &str, options: RectOptions) -> anyhow::Result<RectGeometry> {
        let persisted = self.document.rects.get(id);
        let geometry = RectGeometry::new(
            options.x.or(persisted.map(|r| r.x)).unwrap_or(DEFAULT_RECT.0),
            options.y.or(persisted.map(|r| r.y)).unwrap_or(DEFAULT_RECT.1),
            options.width.or(persisted.map(|r| r.width)).unwrap_or(DEFAULT_RECT.2),
            options.height.or(persisted.map(|r| r.height)).unwrap_or(DEFAULT_RECT.3),
        );
        let label = options
            .label
            .or_else(|| persisted.map(|r| r.label.clone()).filter(|l| !l.is_empty()))
            .unwrap_or_else(|| id.to_string());

        if let Some(marker) = self.rects.get_mut(id) {
            // Silent updates: re-registration must not trigger a write
            marker.update_position(geometry.x, geometry.y, false);
            marker.update_size(geometry.width, geometry.height, false);
            marker.update_label(label);
            marker.show(self.windowing.as_mut())?;
            Ok(marker.geometry())
        } else {
            let mut marker = RectMarker::new(geometry, label, options.style);
            marker.show(self.windowing.as_mut())?;
            let effective = marker.geometry();
            self.rects.insert(id.to_string(), marker);
            Ok(effective)
        }
    }

    fn register_point(&mut self, id: &str, options: PointOptions) -> anyhow::Result<PointGeometry> {
        let persisted = self.document.points.get(id);
        let position = PointGeometry::new(
            options.x.or(persisted.map(|p| p.x)).unwrap_or(DEFAULT_POINT.0),
            options.y.or(persisted.map(|p| p.y)).unwrap_or(DEFAULT_POINT.1),
        );
        let label = options
            .label
            .or_else(|| persisted.map(|p| p.label.clone()).filter(|l| !l.is_empty()))
            .unwrap_or_else(|| id.to_string());

        if let Some(marker) = self.points.get_mut(id) {
            marker.update_position(position.x, position.y, false);
            marker.update_label(label);
            marker.show(self.windowing.as_mut())?;
            Ok(marker.position())
        } else {
            let mut marker = PointMarker::new(position, label, options.style);
            marker.show(self.windowing.as_mut())?;
            let effective = marker.position();
            self.points.insert(id.to_string(), marker);
            Ok(effective)
        }
    }

    fn get_rect(&self, id: &str) -> Option<RectGeometry> {
        self.rects
            .get(id)
            .map(RectMarker::geometry)
            .or_else(|| self.document.rects.get(id).map(RectRecord::geometry))
    }

    fn get_point(&self, id: &str) -> Option<PointGeometry> {
        self.points
            .get(id)
            .map(PointMarker::position)
            .or_else(|| self.document.points.get(id).map(PointRecord::geometry))
    }

    fn hide_all(&mut self) {
        for marker in self.rects.values_mut() {
            marker.hide();
        }
        for marker in self.points.values_mut() {
            marker.hide();
        }
    }

    fn show_all(&mut self) -> anyhow::Result<()> {
        for marker in self.rects.values_mut() {
            marker.show(self.windowing.as_mut())?;
        }
        for marker in self.points.values_mut() {
            marker.show(self.windowing.as_mut())?;
        }
        Ok(())
    }

    /// Drop every marker; their surfaces tear down with them.
    fn clear(&mut self) {
        self.rects.clear();
        self.points.clear();
    }

    fn commit_rect(&mut self, id: &str, geometry: RectGeometry, label: String) {
        self.document
            .rects
            .insert(id.to_string(), RectRecord::from_geometry(geometry, label));
        self.persist();
    }

    fn commit_point(&mut self, id: &str, position: PointGeometry, label: String) {
        self.document
            .points
            .insert(id.to_string(), PointRecord::from_geometry(position, label));
        self.persist();
    }

    /// The marker keeps its new geometry even if the write fails; the next
    /// release retries naturally.
    fn persist(&self) {
        if let Err(e) = self.store.save(&self.document) {
            tracing::error!("failed to persist marker geometry: {e:#}");
        }
    }
}
