//! Draggable point marker.
//!
//! The point is a disc drawn at the center of a square surface sized to
//! fit both the disc and the label at its configured offset. Dragging
//! moves the whole surface; the anchor coordinate reported to callers is
//! always the surface center, clamped so the disc stays on screen.

use crate::constants::{MIN_POINT_WINDOW, POINT_LABEL_MARGIN};
use crate::input::InputState;
use crate::types::{PointGeometry, PointStyle};
use crate::windowing::{OverlaySurface, PointerEvent, Shape, SurfaceId, SurfaceParams, WindowingSystem};

pub struct PointMarker {
    point: PointGeometry,
    label: String,
    style: PointStyle,
    state: InputState,
    surface: Option<Box<dyn OverlaySurface>>,
    /// Square surface edge, fixed at construction from the style.
    window_size: i32,
}

impl PointMarker {
    pub fn new(point: PointGeometry, label: impl Into<String>, style: PointStyle) -> Self {
        let window_size = window_size_for(&style);
        Self {
            point,
            label: label.into(),
            style,
            state: InputState::default(),
            surface: None,
            window_size,
        }
    }

    pub fn position(&self) -> PointGeometry {
        self.point
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_visible(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface_id(&self) -> Option<SurfaceId> {
        self.surface.as_ref().map(|s| s.id())
    }

    /// Create the overlay surface centered on the point. No-op when visible.
    pub fn show(&mut self, windowing: &mut dyn WindowingSystem) -> anyhow::Result<()> {
        if self.surface.is_some() {
            return Ok(());
        }
        let origin = self.window_origin();
        let mut surface = windowing.create_surface(SurfaceParams {
            x: origin.0,
            y: origin.1,
            width: self.window_size,
            height: self.window_size,
            alpha: self.style.alpha,
            transparent_fill: true,
        })?;
        surface.redraw(&self.shapes());
        self.surface = Some(surface);
        Ok(())
    }

    /// Destroy the overlay surface. No-op when already hidden.
    pub fn hide(&mut self) {
        self.surface = None;
        self.state.reset();
    }

    /// Programmatic move. Returns the new position when `notify` is set and
    /// the marker is visible, mirroring pointer-release notification.
    pub fn update_position(&mut self, x: i32, y: i32, notify: bool) -> Option<PointGeometry> {
        self.point = PointGeometry::new(x, y);
        if self.is_visible() {
            self.apply_geometry();
            if notify {
                return Some(self.point);
            }
        }
        None
    }

    pub fn update_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
        self.redraw();
    }

    /// Feed one pointer event through the interaction state machine.
    ///
    /// Returns the final position exactly once, when a release ends a drag.
    pub fn handle_pointer(&mut self, pointer: PointerEvent, screen: (i32, i32)) -> Option<PointGeometry> {
        match pointer {
            PointerEvent::Press { x_root, y_root, .. } => {
                if self.style.draggable {
                    self.state.start_dragging((x_root, y_root), self.window_origin());
                }
                None
            }
            PointerEvent::Move { x_root, y_root } => {
                if let InputState::Dragging { press, origin } = self.state {
                    self.drag_to(press, origin, x_root, y_root, screen);
                }
                None
            }
            PointerEvent::Release => {
                if self.state.is_idle() {
                    return None;
                }
                self.state.reset();
                Some(self.point)
            }
        }
    }

    fn drag_to(&mut self, press: (i32, i32), origin: (i32, i32), x_root: i32, y_root: i32, screen: (i32, i32)) {
        let half = self.window_size / 2;
        // The surface stays fully on screen, then the anchor is clamped so
        // the disc itself never crosses an edge. Cap first, floor second:
        // the floor wins when the disc outsizes the screen.
        let window_x = (origin.0 + (x_root - press.0)).clamp(0, (screen.0 - self.window_size).max(0));
        let window_y = (origin.1 + (y_root - press.1)).clamp(0, (screen.1 - self.window_size).max(0));
        let radius = self.style.point_size;
        self.point.x = (window_x + half).min(screen.0 - radius).max(radius);
        self.point.y = (window_y + half).min(screen.1 - radius).max(radius);
        self.apply_geometry();
    }

    fn window_origin(&self) -> (i32, i32) {
        let half = self.window_size / 2;
        (self.point.x - half, self.point.y - half)
    }

    fn apply_geometry(&mut self) {
        let origin = self.window_origin();
        let size = self.window_size;
        if let Some(surface) = self.surface.as_mut() {
            surface.set_geometry(origin.0, origin.1, size, size);
        }
        self.redraw();
    }

    fn redraw(&mut self) {
        let shapes = self.shapes();
        if let Some(surface) = self.surface.as_mut() {
            surface.redraw(&shapes);
        }
    }

    fn shapes(&self) -> Vec<Shape> {
        let center = self.window_size / 2;
        let mut shapes = vec![Shape::Disc {
            cx: center,
            cy: center,
            radius: self.style.point_size,
            color: self.style.point_color.clone(),
        }];
        if !self.label.is_empty() {
            shapes.push(Shape::Label {
                x: center + self.style.label_offset_x,
                y: center + self.style.label_offset_y,
                text: self.label.clone(),
                bg: self.style.label_bg.clone(),
                fg: self.style.label_fg.clone(),
                font: self.style.label_font.clone(),
            });
        }
        shapes
    }
}

/// Square surface edge large enough for the disc and an offset label.
fn window_size_for(style: &PointStyle) -> i32 {
    let disc_fit = MIN_POINT_WINDOW.max(style.point_size * 4);
    let label_reach = style.label_offset_x.abs().max(style.label_offset_y.abs()) + POINT_LABEL_MARGIN;
    disc_fit.max(label_reach * 2)
}
