//! Integration test suite for vtpl
//!
//! End-to-end tests that drive the public API and the `vtpl` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **rendering**: directives, interpolation and filters through `Engine`
//! - **components**: `<include>` with props, required props, isolation
//! - **layouts**: front matter and layout wrapping
//! - **diagnostics**: error categories, locations and inclusion chains
//! - **concurrency**: one engine shared by many threads
//! - **cli**: the `vtpl` binary

mod cli;
mod components;
mod concurrency;
mod diagnostics;
mod layouts;
mod rendering;
