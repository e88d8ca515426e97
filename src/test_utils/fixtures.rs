//! Template fixtures.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::loader::MemoryLoader;

/// A named template source.
#[derive(Clone, Debug)]
pub struct TemplateFixture {
    pub name: String,
    pub content: String,
}

impl TemplateFixture {
    pub fn simple(name: &str, content: &str) -> Self {
        Self {
            name: name.to_string(),
            content: content.to_string(),
        }
    }

    /// Default layout: binds `title` and injects `content` unescaped.
    pub fn layout() -> Self {
        Self::simple(
            "layout",
            r#"<html><head><title>{{ title }}</title></head><body><main v-html="content"></main></body></html>"#,
        )
    }

    /// Component requiring a `title` prop, with an optional `body`.
    pub fn card() -> Self {
        Self::simple(
            "card",
            r#"<template required="title"><div class="card"><h2>{{ title }}</h2><p v-if="body">{{ body }}</p></div></template>"#,
        )
    }

    /// Page with front matter listing `posts` through the card component.
    pub fn index() -> Self {
        Self::simple(
            "index",
            r#"---
title: Blog
---
<section><include v-for="post in posts" src="card" :title="post.title" :body="post.body"></include><p v-if="posts | length == 0">No posts</p></section>"#,
        )
    }

    /// Write to `<dir>/<name>.html`, creating parent directories.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let file_path = dir.join(format!("{}.html", self.name));
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file_path, &self.content)
            .with_context(|| format!("Failed to write fixture {}", file_path.display()))?;
        Ok(file_path)
    }
}

/// A set of templates that render together.
#[derive(Clone, Debug, Default)]
pub struct SiteFixture {
    pub templates: Vec<TemplateFixture>,
}

impl SiteFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layout, card component and index page.
    pub fn blog() -> Self {
        Self::new()
            .with(TemplateFixture::layout())
            .with(TemplateFixture::card())
            .with(TemplateFixture::index())
    }

    pub fn with(mut self, template: TemplateFixture) -> Self {
        self.templates.retain(|t| t.name != template.name);
        self.templates.push(template);
        self
    }

    pub fn loader(&self) -> MemoryLoader {
        self.templates
            .iter()
            .fold(MemoryLoader::new(), |loader, t| loader.with_template(t.name.clone(), t.content.clone()))
    }

    pub fn write_to(&self, dir: &Path) -> Result<()> {
        for template in &self.templates {
            template.write_to(dir)?;
        }
        Ok(())
    }
}
