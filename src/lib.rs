//! vtpl - HTML templates with v-* directives
//!
//! vtpl renders HTML templates annotated with attribute directives against a
//! data context. Templates are parsed into a markup tree once; rendering
//! walks that tree and produces a new one, so a parsed template can be
//! rendered any number of times, from any number of threads.
//!
//! # Architecture Overview
//!
//! - A **scope stack** resolves variable names, innermost frame first
//! - An **expression evaluator** handles paths, literals, comparisons and
//!   `|` filter pipes
//! - The **directive processor** applies `v-if`/`v-else-if`/`v-else`,
//!   `v-for`, `v-show`, `:attr`/`v-bind:attr`, `v-html`, `{{ }}` and
//!   `<template>` wrappers
//! - The **component resolver** renders `<include>` elements with props in
//!   an isolated scope, and wraps pages in layouts chosen by front matter
//! - Every failure is a [`render::RenderError`] naming the directive, the
//!   expression and the chain of templates that led to it
//!
//! # Core Modules
//!
//! ## Rendering
//! - [`render`] - [`render::Engine`], directives, components, layouts and diagnostics
//! - [`expr`] - Expression lexer, parser and evaluator
//! - [`filters`] - Filter registry, typed signatures and built-in filters
//! - [`scope`] - Variable scope stack
//! - [`value`] - Truthiness, type names and stringification of values
//!
//! ## Templates
//! - [`dom`] - HTML markup tree: parsing and serialization
//! - [`template`] - Parsed templates with YAML front matter
//! - [`loader`] - Template providers (filesystem and in-memory) with caching
//!
//! ## Supporting Modules
//! - [`config`] - `vtpl.toml` render configuration
//! - [`core`] - Front-end error type and user-friendly error display
//! - [`cli`] - Command-line interface
//!
//! # Template Example
//!
//! ```html
//! ---
//! title: Posts
//! ---
//! <ul>
//!   <li v-for="post, i in posts" :class="post.tags">
//!     <include src="card" :post="post"></include>
//!   </li>
//! </ul>
//! <p v-if="posts | length == 0">Nothing yet.</p>
//! ```
//!
//! # Quick Start
//!
//! ```
//! use serde_json::json;
//! use vtpl::loader::MemoryLoader;
//! use vtpl::render::Engine;
//!
//! let loader = MemoryLoader::new()
//!     .with_template("hello", r#"<p :class="kind">Hello, {{ name | capitalize }}!</p>"#);
//! let engine = Engine::new(loader);
//!
//! let html = engine.render_template("hello", &json!({"name": "ada", "kind": "greeting"})).unwrap();
//! assert_eq!(html, r#"<p class="greeting">Hello, Ada!</p>"#);
//! ```

// Rendering
pub mod expr;
pub mod filters;
pub mod render;
pub mod scope;
pub mod value;

// Templates
pub mod dom;
pub mod loader;
pub mod template;

// Supporting modules
pub mod cli;
pub mod config;
pub mod core;

// Test utilities (only compiled in test mode or with test-utils feature)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
