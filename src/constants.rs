//! Crate-wide constants.
//!
//! Centralizes geometry floors, default seeds and file names so the
//! persistence and interaction layers agree on them.

// ============================================================================
// Marker Geometry
// ============================================================================

/// Minimum rectangle width enforced on creation and resize
pub const MIN_RECT_WIDTH: i32 = 50;

/// Minimum rectangle height enforced on creation and resize
pub const MIN_RECT_HEIGHT: i32 = 50;

/// Edge length of the resize handle square at the bottom-right corner
pub const DEFAULT_RESIZE_HANDLE_SIZE: i32 = 10;

/// Default point disc radius in pixels
pub const DEFAULT_POINT_SIZE: i32 = 8;

/// Extra margin reserved around a point label so it is never clipped
pub const POINT_LABEL_MARGIN: i32 = 50;

/// Smallest window a point marker will ever occupy
pub const MIN_POINT_WINDOW: i32 = 100;

// ============================================================================
// Default Seeds
// ============================================================================

/// Geometry used for a rectangle with no explicit and no persisted values
pub const DEFAULT_RECT: (i32, i32, i32, i32) = (120, 120, 240, 160);

/// Coordinates used for a point with no explicit and no persisted values
pub const DEFAULT_POINT: (i32, i32) = (160, 160);

// ============================================================================
// Dispatch Loop
// ============================================================================

/// Sleep interval between worker loop ticks in milliseconds
pub const DEFAULT_TICK_MS: u64 = 10;

/// Upper bound on waiting for the worker thread to exit during shutdown
pub const JOIN_TIMEOUT_MS: u64 = 2_000;

// ============================================================================
// Persistence
// ============================================================================

/// Unified config document file name
pub const CONFIG_FILENAME: &str = "overlays.json";

/// Legacy single-namespace rectangle file, consumed once by migration
pub const LEGACY_RECTS_FILENAME: &str = "rects.json";

/// Legacy single-namespace point file, consumed once by migration
pub const LEGACY_POINTS_FILENAME: &str = "points.json";

/// Directory under the user's home used when no config dir is supplied
pub const DEFAULT_CONFIG_DIR: &str = ".screenmarks";
