//! Integration tests driving the full manager stack.
//!
//! These tests verify the interaction between the dispatcher, the markers,
//! the headless windowing backend and the config store end-to-end.

mod marker_workflow_tests;
mod persistence_tests;
