//! Pointer interaction state machine shared by both marker kinds.
//!
//! A single explicit state machine per live marker makes impossible states
//! unrepresentable: a marker is never dragging and resizing at once.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Dragging     (pointer press outside the resize handle, draggable)
//! Idle -> Resizing     (pointer press inside the resize handle, resizable)
//! Any  -> Idle         (pointer release - finalizes the interaction)
//! ```

/// Screen-absolute pointer coordinates captured at press time.
pub type Anchor = (i32, i32);

/// Interaction state of one live marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputState {
    /// No active pointer interaction
    #[default]
    Idle,

    /// Pointer is moving the marker
    Dragging {
        /// Absolute pointer position at press
        press: Anchor,
        /// Marker top-left at press
        origin: (i32, i32),
    },

    /// Pointer is resizing the marker from its bottom-right handle
    Resizing {
        /// Absolute pointer position at press
        press: Anchor,
        /// Marker width/height at press
        start_size: (i32, i32),
    },
}

impl InputState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self, Self::Resizing { .. })
    }

    /// Reset to Idle
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }

    /// Begin a drag, recording the pointer press position and the marker's
    /// current top-left corner.
    pub fn start_dragging(&mut self, press: Anchor, origin: (i32, i32)) {
        *self = Self::Dragging { press, origin };
    }

    /// Begin a resize, recording the pointer press position and the marker's
    /// current size.
    pub fn start_resizing(&mut self, press: Anchor, start_size: (i32, i32)) {
        *self = Self::Resizing { press, start_size };
    }
}
