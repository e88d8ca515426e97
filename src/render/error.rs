//! Render diagnostics.
//!
//! A [`RenderError`] carries the underlying failure together with where it
//! happened: the directive and expression being evaluated, the template
//! that contained them, and the trail of templates that included it. The
//! trail is accumulated while the error unwinds through include and layout
//! boundaries.

use std::fmt;

use thiserror::Error;

use crate::expr::{EvalError, ParseError};
use crate::loader::LoadError;

/// What went wrong, without location context.
#[derive(Debug, Error)]
pub enum RenderErrorKind {
    #[error("invalid expression: {0}")]
    Parse(ParseError),

    #[error("{0}")]
    Eval(EvalError),

    #[error("{0}")]
    Load(LoadError),

    #[error("missing required prop '{prop}' for component '{component}'")]
    MissingProp {
        prop: String,
        component: String,
    },

    #[error("{message}")]
    Directive {
        message: String,
    },

    #[error("maximum include depth of {limit} exceeded")]
    DepthExceeded {
        limit: usize,
    },

    #[error("loop iteration budget of {limit} exceeded")]
    LoopBudgetExceeded {
        limit: usize,
    },

    #[error("data context must be a mapping, found {found}")]
    InvalidContext {
        found: &'static str,
    },
}

/// Coarse classification of render failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed expression syntax.
    Parse,
    /// Unknown filter, bad argument, missing prop, type mismatch.
    Resolution,
    /// Include depth or loop budget exhausted.
    Resource,
    /// A template could not be loaded or parsed.
    Load,
    /// Misplaced or malformed directive.
    Directive,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorCategory::Parse => "parse error",
            ErrorCategory::Resolution => "resolution error",
            ErrorCategory::Resource => "resource error",
            ErrorCategory::Load => "load error",
            ErrorCategory::Directive => "directive error",
        })
    }
}

/// A render failure with its full location context.
#[derive(Debug)]
pub struct RenderError {
    kind: Box<RenderErrorKind>,
    directive: Option<String>,
    expression: Option<String>,
    template: String,
    /// Including templates, innermost first.
    included_from: Vec<String>,
}

impl RenderError {
    pub fn new(kind: RenderErrorKind, template: impl Into<String>) -> Self {
        Self {
            kind: Box::new(kind),
            directive: None,
            expression: None,
            template: template.into(),
            included_from: Vec::new(),
        }
    }

    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    /// Record that the failing template was reached from `parent`.
    pub fn included_from(mut self, parent: impl Into<String>) -> Self {
        self.included_from.push(parent.into());
        self
    }

    pub fn kind(&self) -> &RenderErrorKind {
        &self.kind
    }

    pub fn directive(&self) -> Option<&str> {
        self.directive.as_deref()
    }

    pub fn expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }

    /// The template in which the failure happened.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Template names from the outermost render call to the failing one.
    pub fn inclusion_chain(&self) -> Vec<&str> {
        self.included_from
            .iter()
            .rev()
            .map(String::as_str)
            .chain(std::iter::once(self.template.as_str()))
            .collect()
    }

    pub fn category(&self) -> ErrorCategory {
        match self.kind.as_ref() {
            RenderErrorKind::Parse(_) => ErrorCategory::Parse,
            RenderErrorKind::Eval(_)
            | RenderErrorKind::MissingProp {
                ..
            }
            | RenderErrorKind::InvalidContext {
                ..
            } => ErrorCategory::Resolution,
            RenderErrorKind::DepthExceeded {
                ..
            }
            | RenderErrorKind::LoopBudgetExceeded {
                ..
            } => ErrorCategory::Resource,
            RenderErrorKind::Load(_) => ErrorCategory::Load,
            RenderErrorKind::Directive {
                ..
            } => ErrorCategory::Directive,
        }
    }

    /// Multi-line report with the inclusion chain drawn as a tree.
    pub fn format_with_context(&self) -> String {
        let mut msg = String::new();

        msg.push_str(&format!("ERROR: Template Render Failed ({})\n\n", self.category()));
        msg.push_str(&format!("Template: {}\n", self.template));
        if let Some(directive) = &self.directive {
            msg.push_str(&format!("Directive: {}\n", directive));
        }
        if let Some(expression) = &self.expression {
            msg.push_str(&format!("Expression: {}\n", expression));
        }
        msg.push_str(&format!("Cause: {}\n", self.kind));

        if !self.included_from.is_empty() {
            msg.push_str("\nInclusion chain:\n");
            let chain = self.inclusion_chain();
            for (i, name) in chain.iter().enumerate() {
                let indent = "  ".repeat(i);
                let arrow = if i > 0 {
                    "└─ "
                } else {
                    ""
                };
                let marker = if i == chain.len() - 1 {
                    "  <- error occurred here"
                } else {
                    ""
                };
                msg.push_str(&format!("{}{}{}{}\n", indent, arrow, name, marker));
            }
        }

        msg
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "template '{}'", self.template)?;
        if let Some(directive) = &self.directive {
            write!(f, ", {}", directive)?;
        }
        if let Some(expression) = &self.expression {
            write!(f, " \"{}\"", expression)?;
        }
        write!(f, ": {}", self.kind)?;
        for parent in &self.included_from {
            write!(f, "\n  included from '{}'", parent)?;
        }
        Ok(())
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind.as_ref() {
            RenderErrorKind::Parse(err) => Some(err),
            RenderErrorKind::Eval(err) => Some(err),
            RenderErrorKind::Load(err) => Some(err),
            _ => None,
        }
    }
}
