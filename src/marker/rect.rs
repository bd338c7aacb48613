//! Draggable, resizable rectangle marker.
//!
//! The pointer press location picks the interaction: inside the square
//! handle at the bottom-right corner it starts a resize, anywhere else a
//! drag. Geometry follows the pointer immediately; the final geometry is
//! reported exactly once, on release, so persistence is not flooded with
//! intermediate frames.

use crate::constants::{MIN_RECT_HEIGHT, MIN_RECT_WIDTH};
use crate::input::InputState;
use crate::types::{RectGeometry, RectStyle};
use crate::windowing::{OverlaySurface, PointerEvent, Shape, SurfaceId, SurfaceParams, WindowingSystem};

pub struct RectMarker {
    geometry: RectGeometry,
    label: String,
    style: RectStyle,
    state: InputState,
    surface: Option<Box<dyn OverlaySurface>>,
}

impl RectMarker {
    /// Create a hidden marker. Width and height are floored at the minimum
    /// so undersized persisted values can never produce a degenerate window.
    pub fn new(geometry: RectGeometry, label: impl Into<String>, style: RectStyle) -> Self {
        Self {
            geometry: geometry.with_min_size(),
            label: label.into(),
            style,
            state: InputState::default(),
            surface: None,
        }
    }

    pub fn geometry(&self) -> RectGeometry {
        self.geometry
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

    /// Create the overlay surface. No-op when already visible.
    pub fn show(&mut self, windowing: &mut dyn WindowingSystem) -> anyhow::Result<()> {
        if self.surface.is_some() {
            return Ok(());
        }
        let mut surface = windowing.create_surface(SurfaceParams {
            x: self.geometry.x,
            y: self.geometry.y,
            width: self.geometry.width,
            height: self.geometry.height,
            alpha: self.style.alpha,
            transparent_fill: false,
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

    /// Programmatic move. Returns the new geometry when `notify` is set and
    /// the marker is visible, mirroring pointer-release notification.
    pub fn update_position(&mut self, x: i32, y: i32, notify: bool) -> Option<RectGeometry> {
        self.geometry.x = x;
        self.geometry.y = y;
        if self.is_visible() {
            self.apply_geometry();
            if notify {
                return Some(self.geometry);
            }
        }
        None
    }

    /// Programmatic resize, floored at the minimum size.
    pub fn update_size(&mut self, width: i32, height: i32, notify: bool) -> Option<RectGeometry> {
        self.geometry.width = width.max(MIN_RECT_WIDTH);
        self.geometry.height = height.max(MIN_RECT_HEIGHT);
        if self.is_visible() {
            self.apply_geometry();
            if notify {
                return Some(self.geometry);
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
    /// Returns the final geometry exactly once, when a release ends a drag
    /// or a resize.
    pub fn handle_pointer(&mut self, pointer: PointerEvent, screen: (i32, i32)) -> Option<RectGeometry> {
        match pointer {
            PointerEvent::Press { x, y, x_root, y_root } => {
                if self.style.resizable && self.in_resize_handle(x, y) {
                    self.state.start_resizing(
                        (x_root, y_root),
                        (self.geometry.width, self.geometry.height),
                    );
                } else if self.style.draggable {
                    self.state
                        .start_dragging((x_root, y_root), (self.geometry.x, self.geometry.y));
                }
                None
            }
            PointerEvent::Move { x_root, y_root } => {
                match self.state {
                    InputState::Dragging { press, origin } => {
                        self.drag_to(press, origin, x_root, y_root, screen);
                    }
                    InputState::Resizing { press, start_size } => {
                        self.resize_to(press, start_size, x_root, y_root, screen);
                    }
                    InputState::Idle => {}
                }
                None
            }
            PointerEvent::Release => {
                if self.state.is_idle() {
                    return None;
                }
                self.state.reset();
                // Resize leaves the handle at the old corner; settle it.
                self.redraw();
                Some(self.geometry)
            }
        }
    }

    fn in_resize_handle(&self, x: i32, y: i32) -> bool {
        let handle = self.style.resize_handle_size;
        x >= self.geometry.width - handle && y >= self.geometry.height - handle
    }

    fn drag_to(&mut self, press: (i32, i32), origin: (i32, i32), x_root: i32, y_root: i32, screen: (i32, i32)) {
        let new_x = origin.0 + (x_root - press.0);
        let new_y = origin.1 + (y_root - press.1);
        self.geometry.x = new_x.clamp(0, (screen.0 - self.geometry.width).max(0));
        self.geometry.y = new_y.clamp(0, (screen.1 - self.geometry.height).max(0));
        if let Some(surface) = self.surface.as_mut() {
            surface.set_geometry(
                self.geometry.x,
                self.geometry.y,
                self.geometry.width,
                self.geometry.height,
            );
        }
    }

    fn resize_to(&mut self, press: (i32, i32), start_size: (i32, i32), x_root: i32, y_root: i32, screen: (i32, i32)) {
        let mut width = start_size.0 + (x_root - press.0);
        let mut height = start_size.1 + (y_root - press.1);
        width = width.max(MIN_RECT_WIDTH);
        height = height.max(MIN_RECT_HEIGHT);
        // Bottom-right stays on screen relative to the fixed top-left.
        width = width.min(screen.0 - self.geometry.x);
        height = height.min(screen.1 - self.geometry.y);
        self.geometry.width = width;
        self.geometry.height = height;
        self.apply_geometry();
    }

    fn apply_geometry(&mut self) {
        let g = self.geometry;
        if let Some(surface) = self.surface.as_mut() {
            surface.set_geometry(g.x, g.y, g.width, g.height);
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
        let g = self.geometry;
        let mut shapes = vec![Shape::Outline {
            x: 0,
            y: 0,
            width: g.width,
            height: g.height,
            color: self.style.border_color.clone(),
            stroke: self.style.border_width,
        }];
        if self.style.resizable {
            let handle = self.style.resize_handle_size;
            shapes.push(Shape::Fill {
                x: g.width - handle,
                y: g.height - handle,
                width: handle,
                height: handle,
                color: self.style.border_color.clone(),
            });
        }
        if !self.label.is_empty() {
            shapes.push(Shape::Label {
                x: 0,
                y: 0,
                text: self.label.clone(),
                bg: self.style.label_bg.clone(),
                fg: self.style.label_fg.clone(),
                font: self.style.label_font.clone(),
            });
        }
        shapes
    }
}
