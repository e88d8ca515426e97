//! The expression language embedded in directives and `{{ }}` interpolations.
//!
//! An expression is a primary term (literal, variable, or property path such
//! as `post.tags[0].name`) optionally piped through filters:
//!
//! ```text
//! post.title | truncate(40) | upper
//! ```
//!
//! Guards may also combine terms with `!`, `==`, `!=`, `<`, `<=`, `>`, `>=`,
//! `&&` and `||`. Parsing is pure and independent of any scope; evaluation
//! resolves variables through a [`ScopeStack`] and filters through a
//! [`FilterRegistry`].
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use vtpl::expr::Expression;
//! use vtpl::filters::FilterRegistry;
//! use vtpl::scope::ScopeStack;
//!
//! let mut scope = ScopeStack::new();
//! scope.set("user", json!({"name": "ada"}));
//!
//! let expr = Expression::parse("user.name | upper").unwrap();
//! let value = expr.evaluate(&scope, &FilterRegistry::with_builtins()).unwrap();
//! assert_eq!(value, json!("ADA"));
//! ```

mod eval;
mod lexer;
mod parser;

use serde_json::Value;
use thiserror::Error;

use crate::filters::{FilterRegistry, ParamType};
use crate::scope::ScopeStack;

pub use parser::{BinaryOp, Expr, FilterCall, Segment};

/// Malformed expression syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected {found} at position {position}")]
    Unexpected {
        found: String,
        position: usize,
    },

    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd {
        expected: String,
    },

    #[error("unterminated string literal starting at position {position}")]
    UnterminatedString {
        position: usize,
    },

    #[error("invalid number '{text}' at position {position}")]
    InvalidNumber {
        text: String,
        position: usize,
    },

    #[error("empty expression")]
    Empty,
}

/// Failure while evaluating a parsed expression.
///
/// Missing variables, keys and out-of-range indexes are not errors; they
/// evaluate to null.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("cannot access '{segment}' on a {found} value")]
    NotIndexable {
        segment: String,
        found: &'static str,
    },

    #[error("invalid index: expected number or string, found {found}")]
    InvalidIndex {
        found: &'static str,
    },

    #[error("unknown filter '{name}'{}", .suggestion.as_ref().map(|s| format!(" (did you mean '{s}'?)")).unwrap_or_default())]
    UnknownFilter {
        name: String,
        suggestion: Option<String>,
    },

    #[error("filter '{filter}': argument {index} cannot be converted from {found} to {expected}")]
    ArgumentType {
        filter: String,
        index: usize,
        found: &'static str,
        expected: ParamType,
    },

    #[error("filter '{filter}' expects {expected} argument(s), got {found}")]
    Arity {
        filter: String,
        expected: String,
        found: usize,
    },

    #[error("filter '{filter}' failed: {message}")]
    Filter {
        filter: String,
        message: String,
    },

    #[error("cannot compare {left} with {right} using '{op}'")]
    Incomparable {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("cannot iterate over a {found} value")]
    NotIterable {
        found: &'static str,
    },
}

/// A parsed expression together with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Expr,
}

impl Expression {
    /// Parse an expression. The same input always yields an equal result.
    ///
    /// Surrounding whitespace is dropped first, so error positions are
    /// offsets into [`source`](Self::source).
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let source = source.trim();
        Ok(Self {
            source: source.to_string(),
            root: parser::parse(source)?,
        })
    }

    /// The trimmed source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Expr {
        &self.root
    }

    /// Evaluate against `scope`, resolving filters through `filters`.
    pub fn evaluate(&self, scope: &ScopeStack, filters: &FilterRegistry) -> Result<Value, EvalError> {
        eval::Evaluator {
            scope,
            filters,
        }
        .eval(&self.root)
    }
}
