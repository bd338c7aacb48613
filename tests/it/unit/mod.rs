//! Single-component unit tests.

mod config_tests;
