//! A parsed template unit: optional front matter plus a markup tree.
//!
//! Front matter is a YAML block delimited by `---` lines at the very start
//! of the source, extracted with `gray_matter`:
//!
//! ```text
//! ---
//! layout: base
//! title: Welcome
//! ---
//! <h1>{{ title }}</h1>
//! ```
//!
//! The `layout` key selects the layout template; every other key becomes a
//! variable visible to the body and its layout.

use gray_matter::Matter;
use gray_matter::engine::YAML;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::dom::{Document, DomError, Node};

/// Error extracting a template's parts. Wrapped by the loader with the
/// template name.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("invalid front matter: {0}")]
    FrontMatter(String),

    #[error(transparent)]
    Markup(#[from] DomError),
}

/// Layout selection from front matter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LayoutHint {
    /// `layout: false` disables the layout; `layout: true` uses the default.
    Enabled(bool),
    /// `layout: <name>`.
    Named(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FrontMatter {
    #[serde(default)]
    pub layout: Option<LayoutHint>,

    /// Remaining keys, exposed as variables.
    #[serde(flatten)]
    pub vars: Map<String, Value>,
}

impl FrontMatter {
    /// Resolve the layout name against `default_layout`.
    pub fn layout_name<'a>(&'a self, default_layout: &'a str) -> Option<&'a str> {
        match &self.layout {
            None | Some(LayoutHint::Enabled(true)) => Some(default_layout),
            Some(LayoutHint::Enabled(false)) => None,
            Some(LayoutHint::Named(name)) => Some(name.as_str()),
        }
    }
}

/// An immutable parsed template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    name: String,
    front_matter: Option<FrontMatter>,
    document: Document,
}

impl Template {
    /// Parse template source: front matter first, then the markup body.
    pub fn parse(name: impl Into<String>, source: &str) -> Result<Self, TemplateError> {
        let matter = Matter::<YAML>::new();
        let parsed = matter
            .parse::<serde_yaml::Value>(source)
            .map_err(|e| TemplateError::FrontMatter(e.to_string()))?;

        let front_matter = match parsed.data {
            None => None,
            Some(serde_yaml::Value::Null) => Some(FrontMatter::default()),
            Some(data) => Some(
                serde_yaml::from_value::<FrontMatter>(data)
                    .map_err(|e| TemplateError::FrontMatter(e.to_string()))?,
            ),
        };

        // The line break closing the front matter is not part of the body.
        let body = match front_matter {
            Some(_) => {
                let content = parsed.content.as_str();
                content
                    .strip_prefix("\r\n")
                    .or_else(|| content.strip_prefix('\n'))
                    .unwrap_or(content)
            }
            None => parsed.content.as_str(),
        };

        Ok(Self {
            name: name.into(),
            front_matter,
            document: Document::parse(body)?,
        })
    }

    /// Wrap an already parsed document.
    pub fn from_document(name: impl Into<String>, document: Document) -> Self {
        Self {
            name: name.into(),
            front_matter: None,
            document,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn front_matter(&self) -> Option<&FrontMatter> {
        self.front_matter.as_ref()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Prop names the template requires from every include site.
    ///
    /// Declared as a comma-separated `required` (or `:required`) attribute on
    /// a top-level `<template>` that is the first element of the document.
    pub fn required_props(&self) -> Vec<String> {
        let root = self
            .document
            .nodes
            .iter()
            .find(|node| !node.is_insignificant());

        let Some(Node::Element(root)) = root else {
            return Vec::new();
        };
        if root.name != "template" {
            return Vec::new();
        }

        root.attr("required")
            .or_else(|| root.attr(":required"))
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
