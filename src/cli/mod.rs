//! Command-line interface for vtpl.
//!
//! # Commands
//!
//! - `render` - Render a template from a template directory
//! - `filters` - List the registered filters and their signatures
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - Debug logging on stderr
//! - `--config` / `-c` - Path to a `vtpl.toml` (default: `./vtpl.toml` when present)
//!
//! # Examples
//!
//! ```bash
//! vtpl render index --templates site --data data.yaml --output index.html
//! vtpl render index --no-layout
//! vtpl filters
//! ```

mod filters;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::RenderConfig;

#[derive(Parser, Debug)]
#[command(
    name = "vtpl",
    about = "Render HTML templates with v-* directives",
    version,
    long_about = "vtpl renders HTML templates annotated with v-if, v-for, v-show, v-bind and \
                  {{ }} interpolation, with components, layouts and front matter."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a template to stdout or a file
    Render(render::RenderCommand),

    /// List available filters
    Filters(filters::FiltersCommand),
}

impl Cli {
    /// Whether `--verbose` was given.
    #[must_use]
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn execute(self) -> Result<()> {
        let config = RenderConfig::load(self.config.as_deref())?;
        match self.command {
            Commands::Render(cmd) => cmd.execute(config),
            Commands::Filters(cmd) => cmd.execute(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render_flags() {
        let cli = Cli::try_parse_from([
            "vtpl",
            "render",
            "index",
            "--data",
            "data.json",
            "--templates",
            "site",
            "--no-layout",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose());
        assert!(matches!(cli.command, Commands::Render(_)));
    }

    #[test]
    fn test_render_requires_name() {
        assert!(Cli::try_parse_from(["vtpl", "render"]).is_err());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["vtpl", "filters", "--config", "custom.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }
}
