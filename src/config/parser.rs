//! Generic TOML configuration parsing.
//!
//! ```rust,no_run
//! use vtpl::config::parse_config;
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Deserialize)]
//! struct SiteConfig {
//!     title: String,
//! }
//!
//! # fn example() -> anyhow::Result<()> {
//! let config: SiteConfig = parse_config(Path::new("site.toml"))?;
//! println!("Rendering {}", config.title);
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML file into `T`.
///
/// # Errors
///
/// Fails with the file path in context when the file cannot be read or its
/// contents do not deserialize into `T`.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Like [`parse_config`], but a missing file yields `None`.
pub fn parse_optional_config<T>(path: &Path) -> Result<Option<T>>
where
    T: serde::de::DeserializeOwned,
{
    if !path.is_file() {
        return Ok(None);
    }
    parse_config(path).map(Some)
}
