//! Template source providers.
//!
//! The renderer resolves include targets and layouts by name through a
//! [`TemplateProvider`]. Two providers ship with the crate:
//!
//! - [`FsLoader`] reads `<root>/<name>.<extension>` from disk
//! - [`MemoryLoader`] serves sources registered up front, mainly for tests
//!   and embedding
//!
//! Both parse each template once and cache the immutable result in a
//! [`TemplateCache`].
//!
//! # Security
//!
//! [`FsLoader`] only accepts relative names that stay inside its root:
//! absolute paths and `..` components that climb above the root are
//! rejected before any file system access.

mod cache;

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

pub use cache::TemplateCache;

use crate::template::{Template, TemplateError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("template '{name}' not found")]
    NotFound {
        name: String,
    },

    #[error("invalid template name '{name}': {reason}")]
    InvalidName {
        name: String,
        reason: &'static str,
    },

    #[error("failed to read template '{name}' from {}", .path.display())]
    Io {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse template '{name}'")]
    Parse {
        name: String,
        #[source]
        source: TemplateError,
    },
}

/// Resolves template names to parsed templates.
///
/// Implementations must be safe to share across concurrent renders and must
/// never hand out a template that a later call could mutate.
pub trait TemplateProvider: Send + Sync {
    fn load(&self, name: &str) -> Result<Arc<Template>, LoadError>;
}

/// Templates registered in memory by name.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    sources: HashMap<String, String>,
    cache: TemplateCache,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_template(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(name, source);
        self
    }

    /// Register or replace a template source.
    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        let name = name.into();
        self.cache.invalidate(&name);
        self.sources.insert(name, source.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }
}

impl TemplateProvider for MemoryLoader {
    fn load(&self, name: &str) -> Result<Arc<Template>, LoadError> {
        let source = self.sources.get(name).ok_or_else(|| LoadError::NotFound {
            name: name.to_string(),
        })?;
        self.cache.get_or_try_insert(name, || {
            debug!("Parsing in-memory template '{}'", name);
            Template::parse(name, source).map_err(|source| LoadError::Parse {
                name: name.to_string(),
                source,
            })
        })
    }
}

/// Templates read from a directory tree.
#[derive(Debug)]
pub struct FsLoader {
    root: PathBuf,
    extension: String,
    cache: TemplateCache,
}

impl FsLoader {
    /// Load `<root>/<name>` with `.html` appended to names without an
    /// extension.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: "html".to_string(),
            cache: TemplateCache::new(),
        }
    }

    /// Change the extension appended to bare names.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    /// Map a template name to a path under the root.
    pub fn resolve_path(&self, name: &str) -> Result<PathBuf, LoadError> {
        let relative = validate_template_name(name)?;
        let mut path = self.root.join(relative);
        if path.extension().is_none() && !self.extension.is_empty() {
            path.set_extension(&self.extension);
        }
        Ok(path)
    }
}

impl TemplateProvider for FsLoader {
    fn load(&self, name: &str) -> Result<Arc<Template>, LoadError> {
        self.cache.get_or_try_insert(name, || {
            let path = self.resolve_path(name)?;
            debug!("Loading template '{}' from {}", name, path.display());

            let source = std::fs::read_to_string(&path).map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    LoadError::NotFound {
                        name: name.to_string(),
                    }
                } else {
                    LoadError::Io {
                        name: name.to_string(),
                        path: path.clone(),
                        source,
                    }
                }
            })?;

            Template::parse(name, &source).map_err(|source| LoadError::Parse {
                name: name.to_string(),
                source,
            })
        })
    }
}

/// Check that `name` is a relative path that stays inside the template root.
fn validate_template_name(name: &str) -> Result<&Path, LoadError> {
    let invalid = |reason| LoadError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.trim().is_empty() {
        return Err(invalid("name is empty"));
    }

    let path = Path::new(name);
    if path.is_absolute() {
        return Err(invalid("absolute paths are not allowed"));
    }

    let mut depth: i32 = 0;
    for component in path.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return Err(invalid("path escapes the template directory"));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("only relative paths are allowed"));
            }
        }
    }
    Ok(path)
}
