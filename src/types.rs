//! Core types for the marker system.
//!
//! Defines the geometry values exchanged with callers, the records persisted
//! to disk and the typed style structures for both marker kinds.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_POINT_SIZE, DEFAULT_RESIZE_HANDLE_SIZE, MIN_RECT_HEIGHT, MIN_RECT_WIDTH,
};

// ============================================================================
// Geometry
// ============================================================================

/// Position and extent of a rectangle marker in screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RectGeometry {
    /// Top-left corner x
    pub x: i32,
    /// Top-left corner y
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl RectGeometry {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Returns a copy with width/height floored at the minimum rectangle size.
    pub fn with_min_size(mut self) -> Self {
        self.width = self.width.max(MIN_RECT_WIDTH);
        self.height = self.height.max(MIN_RECT_HEIGHT);
        self
    }
}

/// Screen coordinates of a point marker's logical anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointGeometry {
    pub x: i32,
    pub y: i32,
}

impl PointGeometry {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// ============================================================================
// Persisted Records
// ============================================================================

/// Rectangle record as stored in the `rects` namespace of the config document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RectRecord {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub label: String,
}

impl RectRecord {
    pub fn from_geometry(geometry: RectGeometry, label: String) -> Self {
        Self {
            x: geometry.x,
            y: geometry.y,
            width: geometry.width,
            height: geometry.height,
            label,
        }
    }

    pub fn geometry(&self) -> RectGeometry {
        RectGeometry::new(self.x, self.y, self.width, self.height)
    }
}

/// Point record as stored in the `points` namespace of the config document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub label: String,
}

impl PointRecord {
    pub fn from_geometry(geometry: PointGeometry, label: String) -> Self {
        Self {
            x: geometry.x,
            y: geometry.y,
            label,
        }
    }

    pub fn geometry(&self) -> PointGeometry {
        PointGeometry::new(self.x, self.y)
    }
}

// ============================================================================
// Styles
// ============================================================================

/// Font description handed to the windowing collaborator when drawing labels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub size: i32,
    pub weight: FontWeight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Arial".to_string(),
            size: 10,
            weight: FontWeight::Bold,
        }
    }
}

/// Visual and behavioral options for a rectangle marker.
///
/// Every field has a documented default; callers override only what they
/// need via struct update syntax.
#[derive(Clone, Debug, PartialEq)]
pub struct RectStyle {
    pub border_color: String,
    pub border_width: i32,
    /// Window background; combined with `alpha` for a see-through fill
    pub bg_color: String,
    pub label_bg: String,
    pub label_fg: String,
    pub label_font: FontSpec,
    /// Whole-window opacity in `0.0..=1.0`
    pub alpha: f32,
    pub draggable: bool,
    pub resizable: bool,
    /// Edge length of the bottom-right resize hit region
    pub resize_handle_size: i32,
}

impl Default for RectStyle {
    fn default() -> Self {
        Self {
            border_color: "#FF0000".to_string(),
            border_width: 2,
            bg_color: "white".to_string(),
            label_bg: "#FF0000".to_string(),
            label_fg: "#FFFFFF".to_string(),
            label_font: FontSpec::default(),
            alpha: 0.3,
            draggable: true,
            resizable: true,
            resize_handle_size: DEFAULT_RESIZE_HANDLE_SIZE,
        }
    }
}

/// Visual and behavioral options for a point marker.
#[derive(Clone, Debug, PartialEq)]
pub struct PointStyle {
    pub point_color: String,
    /// Disc radius in pixels
    pub point_size: i32,
    pub label_bg: String,
    pub label_fg: String,
    pub label_font: FontSpec,
    pub alpha: f32,
    /// Label offset from the point, positive x extends right
    pub label_offset_x: i32,
    /// Label offset from the point, negative y extends above
    pub label_offset_y: i32,
    pub draggable: bool,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            point_color: "#FF0000".to_string(),
            point_size: DEFAULT_POINT_SIZE,
            label_bg: "#FF0000".to_string(),
            label_fg: "#FFFFFF".to_string(),
            label_font: FontSpec::default(),
            alpha: 0.9,
            label_offset_x: 10,
            label_offset_y: -25,
            draggable: true,
        }
    }
}
