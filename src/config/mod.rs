//! Renderer configuration.
//!
//! Settings live in an optional `vtpl.toml` next to the templates:
//!
//! ```toml
//! template_dir = "templates"
//! extension = "html"
//! default_layout = "layout"
//! content_var = "content"
//! max_depth = 32
//! max_loop_iterations = 100000
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above
//! (`template_dir` defaults to the current directory). Command-line flags
//! override file values.

mod parser;

pub use parser::{parse_config, parse_optional_config};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up when no explicit config path is given.
pub const CONFIG_FILE_NAME: &str = "vtpl.toml";

const fn default_max_depth() -> usize {
    32
}

const fn default_max_loop_iterations() -> usize {
    100_000
}

fn default_layout() -> String {
    "layout".to_string()
}

fn default_content_var() -> String {
    "content".to_string()
}

const fn default_layouts() -> bool {
    true
}

fn default_template_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_extension() -> String {
    "html".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Maximum include nesting before a render fails.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum `v-for` iterations across one render.
    #[serde(default = "default_max_loop_iterations")]
    pub max_loop_iterations: usize,

    /// Layout used when front matter does not name one.
    #[serde(default = "default_layout")]
    pub default_layout: String,

    /// Variable the layout receives the rendered page body in.
    #[serde(default = "default_content_var")]
    pub content_var: String,

    /// Apply layouts at all. Disabled by `--no-layout`.
    #[serde(default = "default_layouts")]
    pub layouts: bool,

    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,

    /// Appended by the file loader to names without an extension.
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_loop_iterations: default_max_loop_iterations(),
            default_layout: default_layout(),
            content_var: default_content_var(),
            layouts: default_layouts(),
            template_dir: default_template_dir(),
            extension: default_extension(),
        }
    }
}

impl RenderConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `vtpl.toml` in the
    /// current directory is used when present, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => parse_config(path),
            None => Ok(parse_optional_config(Path::new(CONFIG_FILE_NAME))?.unwrap_or_default()),
        }
    }
}
