//! Error handling for the vtpl front end.
//!
//! Library operations return their own typed errors ([`RenderError`],
//! [`LoadError`](crate::loader::LoadError), ...). The command-line surface
//! works in `anyhow::Result` and converts whatever reaches the top into an
//! [`ErrorContext`] with [`user_friendly_error`], which adds details and an
//! actionable suggestion before printing in color.
//!
//! # Examples
//!
//! ```rust,no_run
//! use vtpl::core::{user_friendly_error, VtplError};
//!
//! let err = VtplError::TemplateDirNotFound {
//!     path: "site/templates".to_string(),
//! };
//! user_friendly_error(anyhow::Error::from(err)).display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::expr::EvalError;
use crate::render::{ErrorCategory, RenderError, RenderErrorKind};

/// Failures of the outer surfaces.
#[derive(Error, Debug)]
pub enum VtplError {
    /// A render failed; the error carries its own location context.
    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("Template directory not found: {path}")]
    TemplateDirNotFound {
        path: String,
    },

    #[error("Failed to load data file {path}: {reason}")]
    DataFile {
        path: String,
        reason: String,
    },

    #[error("Unsupported data file format: {path} (expected .json, .yaml or .yml)")]
    UnsupportedDataFormat {
        path: String,
    },

    #[error("Invalid configuration in {file}: {reason}")]
    ConfigParse {
        file: String,
        reason: String,
    },

    #[error("{message}")]
    Other {
        message: String,
    },
}

/// An error plus the hints shown to the user.
#[derive(Debug)]
pub struct ErrorContext {
    pub error: VtplError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: VtplError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print to stderr: error in red, details in yellow, suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error reaching the command line into an [`ErrorContext`].
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<VtplError>() {
        Ok(err) => return create_error_context(err),
        Err(error) => error,
    };
    let error = match error.downcast::<RenderError>() {
        Ok(err) => return create_error_context(VtplError::Render(err)),
        Err(error) => error,
    };

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        let outer = error.to_string();
        let file = outer
            .strip_prefix("Failed to parse config file: ")
            .unwrap_or(crate::config::CONFIG_FILE_NAME);
        return ErrorContext::new(VtplError::ConfigParse {
            file: file.to_string(),
            reason: toml_error.to_string(),
        })
        .with_suggestion(
            "Check the TOML syntax and key names; valid keys are max_depth, max_loop_iterations, \
             default_layout, content_var, layouts, template_dir and extension",
        );
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(VtplError::Other {
                    message: chain_message(&error),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(VtplError::Other {
                    message: chain_message(&error),
                })
                .with_suggestion("Check file ownership and permissions");
            }
            _ => {}
        }
    }

    ErrorContext::new(VtplError::Other {
        message: chain_message(&error),
    })
}

/// The error message followed by its numbered causes.
fn chain_message(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    message
}

fn create_error_context(error: VtplError) -> ErrorContext {
    match &error {
        VtplError::Render(render) => {
            let details = render.format_with_context();
            let suggestion = render_suggestion(render);
            ErrorContext::new(error).with_details(details).with_suggestion(suggestion)
        }
        VtplError::TemplateDirNotFound {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Pass the directory holding your templates with --templates or set template_dir in vtpl.toml",
        ),
        VtplError::DataFile {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check that the data file is valid JSON or YAML and that its top level is a mapping"),
        VtplError::UnsupportedDataFormat {
            ..
        } => ErrorContext::new(error).with_suggestion("Rename the data file with a .json, .yaml or .yml extension"),
        VtplError::ConfigParse {
            ..
        } => ErrorContext::new(error).with_suggestion("Check the TOML syntax in vtpl.toml"),
        VtplError::Other {
            ..
        } => ErrorContext::new(error),
    }
}

fn render_suggestion(error: &RenderError) -> String {
    match error.kind() {
        RenderErrorKind::Eval(EvalError::UnknownFilter {
            ..
        }) => "Run 'vtpl filters' to list the available filters".to_string(),
        RenderErrorKind::MissingProp {
            prop,
            ..
        } => format!(
            "Pass the prop on the <include> element, e.g. {prop}=\"text\" or :{prop}=\"expression\""
        ),
        RenderErrorKind::InvalidContext {
            ..
        } => "The data passed to a render must be a mapping of names to values".to_string(),
        _ => match error.category() {
            ErrorCategory::Parse => {
                "Check the expression syntax: paths use '.' and '[]', filters are applied with '|'"
                    .to_string()
            }
            ErrorCategory::Resolution => {
                "Check that the data context has the expected shape and that filter arguments have the right types"
                    .to_string()
            }
            ErrorCategory::Resource => {
                "Look for templates that include themselves, or raise max_depth / max_loop_iterations in vtpl.toml"
                    .to_string()
            }
            ErrorCategory::Load => {
                "Check that the template exists under the template directory (--templates)".to_string()
            }
            ErrorCategory::Directive => {
                "v-else-if and v-else must directly follow a v-if sibling, and an element takes at most one of v-if, v-else-if, v-else and v-for"
                    .to_string()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LoadError;

    fn missing_prop() -> RenderError {
        RenderError::new(
            RenderErrorKind::MissingProp {
                prop: "title".into(),
                component: "card".into(),
            },
            "list",
        )
        .with_directive("<include>")
        .with_expression("card")
        .included_from("page")
    }

    #[test]
    fn test_render_error_gets_tree_details() {
        let ctx = user_friendly_error(anyhow::Error::from(missing_prop()));
        assert!(matches!(ctx.error, VtplError::Render(_)));

        let details = ctx.details.as_deref().unwrap();
        assert!(details.contains("Inclusion chain:"));
        assert!(details.contains("└─ list"));
        assert!(ctx.suggestion.as_deref().unwrap().contains(":title="));
    }

    #[test]
    fn test_wrapped_render_error() {
        let err = anyhow::Error::from(VtplError::Render(RenderError::new(
            RenderErrorKind::Load(LoadError::NotFound {
                name: "missing".into(),
            }),
            "missing",
        )));
        let ctx = user_friendly_error(err);
        assert!(ctx.suggestion.as_deref().unwrap().contains("--templates"));
        assert!(ctx.to_string().starts_with("template 'missing': template 'missing' not found"));
    }

    #[test]
    fn test_toml_error() {
        let toml_err = toml::from_str::<crate::config::RenderConfig>("max_depth = [").unwrap_err();
        let ctx = user_friendly_error(anyhow::Error::from(toml_err));
        assert!(matches!(ctx.error, VtplError::ConfigParse { .. }));
    }

    #[test]
    fn test_generic_error_keeps_chain() {
        let err = anyhow::anyhow!("root cause").context("outer");
        let ctx = user_friendly_error(err);
        let text = ctx.to_string();
        assert!(text.starts_with("outer"));
        assert!(text.contains("1: root cause"));
        assert!(ctx.suggestion.is_none());
    }

    #[test]
    fn test_display_format() {
        let ctx = ErrorContext::new(VtplError::UnsupportedDataFormat {
            path: "data.txt".into(),
        })
        .with_details("d")
        .with_suggestion("s");
        assert_eq!(
            ctx.to_string(),
            "Unsupported data file format: data.txt (expected .json, .yaml or .yml)\nDetails: d\nSuggestion: s"
        );
    }
}
