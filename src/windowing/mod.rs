//! Windowing collaborator surface.
//!
//! The crate never talks to a toolkit directly. A host supplies an
//! implementation of [`WindowingSystem`] able to create borderless,
//! always-on-top, alpha-blended surfaces, draw a handful of shape
//! primitives, and deliver pointer events with both surface-local and
//! absolute screen coordinates. Everything here is only ever touched from
//! the dispatcher's worker thread.

mod headless;

pub use headless::{HeadlessHandle, HeadlessWindowing, SurfaceSnapshot};

use crate::types::FontSpec;

/// Identifier of one overlay surface, unique within a windowing system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// Creation parameters for an overlay surface.
///
/// Surfaces are implicitly borderless and always-on-top; `alpha` controls
/// whole-window opacity and `transparent_fill` asks the toolkit to make the
/// background color itself invisible where supported.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceParams {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub alpha: f32,
    pub transparent_fill: bool,
}

/// Drawing primitives a marker can place on its surface.
///
/// Coordinates are surface-local.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Outline {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: String,
        stroke: i32,
    },
    Fill {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: String,
    },
    Disc {
        cx: i32,
        cy: i32,
        radius: i32,
        color: String,
    },
    Label {
        x: i32,
        y: i32,
        text: String,
        bg: String,
        fg: String,
        font: FontSpec,
    },
}

/// Pointer input delivered by the toolkit.
///
/// `x`/`y` are surface-local, `x_root`/`y_root` absolute screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEvent {
    Press { x: i32, y: i32, x_root: i32, y_root: i32 },
    Move { x_root: i32, y_root: i32 },
    Release,
}

/// One pending input event, tagged with the surface it targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceEvent {
    pub surface: SurfaceId,
    pub pointer: PointerEvent,
}

/// A live overlay window. Dropping the handle destroys the surface;
/// teardown is best-effort and must not fail during shutdown.
pub trait OverlaySurface {
    fn id(&self) -> SurfaceId;

    /// Move and resize the surface in one call.
    fn set_geometry(&mut self, x: i32, y: i32, width: i32, height: i32);

    /// Replace the surface's entire shape list.
    fn redraw(&mut self, shapes: &[Shape]);
}

/// The toolkit seam. Owned exclusively by the dispatcher's worker thread.
pub trait WindowingSystem {
    /// Current screen dimensions as (width, height).
    fn screen_size(&self) -> (i32, i32);

    fn create_surface(&mut self, params: SurfaceParams) -> anyhow::Result<Box<dyn OverlaySurface>>;

    /// Process one iteration of pending toolkit events, returning pointer
    /// events for live surfaces. Safe to call repeatedly.
    fn process_events(&mut self) -> Vec<SurfaceEvent>;
}
