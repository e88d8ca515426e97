//! The `render` command.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::RenderConfig;
use crate::core::VtplError;
use crate::loader::FsLoader;
use crate::render::Engine;

#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Template name, relative to the template directory
    name: String,

    /// Data context as a JSON or YAML file
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Template directory (overrides template_dir)
    #[arg(short, long)]
    templates: Option<PathBuf>,

    /// Do not wrap the page in a layout
    #[arg(long)]
    no_layout: bool,

    /// Write the result to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl RenderCommand {
    pub fn execute(self, mut config: RenderConfig) -> Result<()> {
        if let Some(dir) = self.templates {
            config.template_dir = dir;
        }
        if self.no_layout {
            config.layouts = false;
        }
        if !config.template_dir.is_dir() {
            return Err(VtplError::TemplateDirNotFound {
                path: config.template_dir.display().to_string(),
            }
            .into());
        }

        let data = match &self.data {
            Some(path) => load_data(path)?,
            None => Value::Null,
        };

        let loader = FsLoader::new(&config.template_dir).with_extension(config.extension.clone());
        let engine = Engine::new(loader).with_config(config);
        let html = engine.render_template(&self.name, &data).map_err(VtplError::from)?;

        match self.output {
            Some(path) => {
                std::fs::write(&path, &html)
                    .with_context(|| format!("Failed to write output to {}", path.display()))?;
                debug!("Wrote {} bytes to {}", html.len(), path.display());
            }
            None => println!("{html}"),
        }
        Ok(())
    }
}

/// Read a data context, choosing the format by file extension.
fn load_data(path: &Path) -> Result<Value> {
    let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
    let data_file_error = |reason: String| VtplError::DataFile {
        path: path.display().to_string(),
        reason,
    };

    let is_json = match extension.as_deref() {
        Some("json") => true,
        Some("yaml" | "yml") => false,
        _ => {
            return Err(VtplError::UnsupportedDataFormat {
                path: path.display().to_string(),
            }
            .into());
        }
    };

    let text = std::fs::read_to_string(path).map_err(|err| data_file_error(err.to_string()))?;
    let data: Value = if is_json {
        serde_json::from_str(&text).map_err(|err| data_file_error(err.to_string()))?
    } else {
        serde_yaml::from_str(&text).map_err(|err| data_file_error(err.to_string()))?
    };
    debug!("Loaded data context from {}", path.display());
    Ok(data)
}
