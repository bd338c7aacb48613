//! Screen-anchored overlay markers with durable positions.
//!
//! `screenmarks` lets an application register named rectangle and point
//! markers that float above everything else on screen. The user drags
//! (and, for rectangles, resizes) them with the pointer; the final
//! geometry of every interaction is written atomically to a JSON config
//! file and seeds the marker the next time it is registered.
//!
//! All toolkit-facing state lives on one dedicated worker thread behind
//! [`OverlayManager`]; callers on any thread issue blocking commands that
//! execute there in strict FIFO order. The toolkit itself is a
//! collaborator supplied through the [`windowing::WindowingSystem`]
//! trait; a deterministic [`windowing::HeadlessHandle`] backend ships for
//! tests and toolkit-less hosts.
//!
//! ```no_run
//! use screenmarks::{OverlayManager, RectOptions};
//! # fn windowing() -> anyhow::Result<Box<dyn screenmarks::windowing::WindowingSystem>> {
//! #     unimplemented!()
//! # }
//!
//! let manager = OverlayManager::new(None, windowing);
//! let geometry = manager.register_rect("price-box", RectOptions::default())?;
//! // ... user drags the marker around ...
//! manager.destroy();
//! # Ok::<(), screenmarks::DispatchError>(())
//! ```

pub mod config;
pub mod constants;
pub mod dispatch;
pub mod input;
pub mod logging;
pub mod manager;
pub mod marker;
pub mod types;
pub mod windowing;

pub use config::{ConfigDocument, ConfigStore, default_config_dir};
pub use dispatch::{DispatchError, Dispatcher};
pub use manager::{OverlayManager, PointOptions, RectOptions};
pub use types::{
    FontSpec, FontWeight, PointGeometry, PointRecord, PointStyle, RectGeometry, RectRecord,
    RectStyle,
};
