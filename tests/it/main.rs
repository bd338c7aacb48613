//! Single test binary entry point.
//!
//! This consolidates all tests into a single binary following matklad's best practices,
//! reducing linking overhead.
//!
//! Structure:
//! - helpers: Shared fixtures (headless managers, pointer gestures, polling)
//! - integration: Multi-component workflow tests driving OverlayManager
//! - unit: Single-component tests (dispatch, config, serialization)

mod integration;
mod unit;
