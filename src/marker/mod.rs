//! Live marker implementations.
//!
//! One instance per shown marker; both kinds run the [`InputState`]
//! machine from [`crate::input`] and own their overlay surface while
//! visible.
//!
//! [`InputState`]: crate::input::InputState

mod point;
mod rect;

pub use point::PointMarker;
pub use rect::RectMarker;
