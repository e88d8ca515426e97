//! Template rendering.
//!
//! [`Engine`] ties together the filter registry, a [`TemplateProvider`] and
//! the [`RenderConfig`]. Each render call creates its own private render
//! context (scope stack, inclusion chain, loop budget), walks the template
//! tree applying directives, and returns either a new tree or a fully
//! contextualized [`RenderError`].
//!
//! # Directives
//!
//! | Syntax | Effect |
//! |---|---|
//! | `v-if` / `v-else-if` / `v-else` | keep at most one branch of a chain |
//! | `v-for="item, index in items"` | repeat the element per item |
//! | `v-show="expr"` | append `display: none` to `style` when falsey |
//! | `:attr="expr"` / `v-bind:attr` | bind an attribute; `false`/null removes it |
//! | `v-html="expr"` | replace children with unescaped HTML |
//! | `{{ expr }}` | escaped interpolation in text |
//! | `<template>` | renders its children only |
//! | `<include src="name">` | render another template with props |
//!
//! # Phases
//!
//! Filters are registered through `&mut Engine` and rendering borrows
//! `&Engine`, so registration can never overlap an in-flight render. An
//! `Engine` is `Send + Sync`; share it by reference across threads.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use vtpl::loader::MemoryLoader;
//! use vtpl::render::Engine;
//!
//! let loader = MemoryLoader::new()
//!     .with_template("list", r#"<ul><li v-for="item in items">{{ item.title }}</li></ul>"#);
//! let engine = Engine::new(loader);
//!
//! let html = engine
//!     .render_template("list", &json!({"items": [{"title": "A"}, {"title": "B"}]}))
//!     .unwrap();
//! assert_eq!(html, "<ul><li>A</li><li>B</li></ul>");
//! ```

mod components;
mod context;
mod directives;
mod error;
mod layout;

pub use error::{ErrorCategory, RenderError, RenderErrorKind};

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::RenderConfig;
use crate::dom::Document;
use crate::filters::{FilterRegistry, Signature};
use crate::loader::TemplateProvider;
use crate::scope::Frame;
use crate::template::Template;
use crate::value::type_name;
use context::RenderContext;

pub struct Engine {
    filters: Arc<FilterRegistry>,
    provider: Arc<dyn TemplateProvider>,
    config: RenderConfig,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("filters", &self.filters)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// An engine with the built-in filters and default configuration.
    pub fn new(provider: impl TemplateProvider + 'static) -> Self {
        Self::with_provider(Arc::new(provider))
    }

    /// Like [`new`](Self::new) for an already shared provider.
    pub fn with_provider(provider: Arc<dyn TemplateProvider>) -> Self {
        Self {
            filters: Arc::new(FilterRegistry::with_builtins()),
            provider,
            config: RenderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the whole filter registry.
    pub fn with_filters(mut self, filters: FilterRegistry) -> Self {
        self.filters = Arc::new(filters);
        self
    }

    /// Register a filter for all subsequent renders.
    pub fn register_filter<F>(&mut self, name: impl Into<String>, signature: Signature, func: F)
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.filters).register(name, signature, func);
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    pub fn provider(&self) -> &dyn TemplateProvider {
        self.provider.as_ref()
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render a parsed tree against `data`. No layout is applied.
    ///
    /// `name` identifies the tree in diagnostics. The input tree is not
    /// modified.
    pub fn render(&self, document: &Document, data: &Value, name: &str) -> Result<Document, RenderError> {
        debug!("Rendering document '{}'", name);
        let mut ctx = RenderContext::new(self, name, data_frame(data, name)?);
        ctx.render_nodes(&document.nodes, false).map(Document::new)
    }

    /// Render a parsed template, applying its front matter and layout.
    pub fn render_parsed(&self, template: &Template, data: &Value) -> Result<Document, RenderError> {
        debug!("Rendering template '{}'", template.name());
        let mut ctx = RenderContext::new(self, template.name(), data_frame(data, template.name())?);
        ctx.render_page(template)
    }

    /// Load template `name` through the provider and render it to markup.
    pub fn render_template(&self, name: &str, data: &Value) -> Result<String, RenderError> {
        let template = self
            .provider
            .load(name)
            .map_err(|err| RenderError::new(RenderErrorKind::Load(err), name))?;
        Ok(self.render_parsed(&template, data)?.to_html())
    }

    /// Parse `source` as template `name` and render it to markup.
    pub fn render_source(&self, name: &str, source: &str, data: &Value) -> Result<String, RenderError> {
        let template = Template::parse(name, source).map_err(|source| {
            RenderError::new(
                RenderErrorKind::Load(crate::loader::LoadError::Parse {
                    name: name.to_string(),
                    source,
                }),
                name,
            )
        })?;
        Ok(self.render_parsed(&template, data)?.to_html())
    }
}

/// The data context becomes the base scope frame; it must be a mapping.
fn data_frame(data: &Value, name: &str) -> Result<Frame, RenderError> {
    match data {
        Value::Object(map) => Ok(map.clone()),
        Value::Null => Ok(Frame::new()),
        other => Err(RenderError::new(
            RenderErrorKind::InvalidContext {
                found: type_name(other),
            },
            name,
        )),
    }
}
