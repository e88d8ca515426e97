//! Per-render mutable state.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde_json::Value;

use super::Engine;
use super::error::{RenderError, RenderErrorKind};
use crate::expr::Expression;
use crate::scope::{Frame, ScopeStack};

/// State owned by one top-level render call.
///
/// Holds the scope stack, the name of the template being walked, the
/// templates that led to it, and the resource budgets. Never shared between
/// renders.
pub(crate) struct RenderContext<'e> {
    pub(crate) engine: &'e Engine,
    scope: ScopeStack,
    template: String,
    /// Outermost first; excludes `template`.
    chain: Vec<String>,
    iterations: usize,
    expressions: HashMap<String, Expression>,
}

impl<'e> RenderContext<'e> {
    pub(crate) fn new(engine: &'e Engine, template: impl Into<String>, base: Frame) -> Self {
        Self {
            engine,
            scope: ScopeStack::with_base(base),
            template: template.into(),
            chain: Vec::new(),
            iterations: 0,
            expressions: HashMap::new(),
        }
    }

    pub(crate) fn template(&self) -> &str {
        &self.template
    }

    /// Include nesting of the template currently being walked.
    pub(crate) fn depth(&self) -> usize {
        self.chain.len()
    }

    /// All visible bindings flattened, innermost winning.
    pub(crate) fn snapshot(&self) -> Frame {
        self.scope.env_snapshot()
    }

    /// Run `f` with `frame` pushed on the scope stack. The frame is popped
    /// on both the success and the error path.
    pub(crate) fn with_frame<T>(
        &mut self,
        frame: Frame,
        f: impl FnOnce(&mut Self) -> Result<T, RenderError>,
    ) -> Result<T, RenderError> {
        self.scope.push_frame(frame);
        let result = f(self);
        self.scope.pop();
        result
    }

    /// Run `f` as template `name` in an isolated scope whose base frame is
    /// `base`. Errors leaving `f` are tagged with the including template.
    pub(crate) fn with_template<T>(
        &mut self,
        name: &str,
        base: Frame,
        f: impl FnOnce(&mut Self) -> Result<T, RenderError>,
    ) -> Result<T, RenderError> {
        let outer_scope = std::mem::replace(&mut self.scope, ScopeStack::with_base(base));
        let parent = std::mem::replace(&mut self.template, name.to_string());
        self.chain.push(parent);

        let result = f(self);

        let parent = self.chain.pop().unwrap_or_default();
        self.template = parent;
        self.scope = outer_scope;
        result.map_err(|err| err.included_from(self.template.clone()))
    }

    /// Build an error located in the current template.
    pub(crate) fn error(&self, kind: RenderErrorKind) -> RenderError {
        RenderError::new(kind, self.template.clone())
    }

    pub(crate) fn directive_error(
        &self,
        directive: &str,
        expression: Option<&str>,
        message: impl Into<String>,
    ) -> RenderError {
        let err = self
            .error(RenderErrorKind::Directive {
                message: message.into(),
            })
            .with_directive(directive);
        match expression {
            Some(expression) => err.with_expression(expression),
            None => err,
        }
    }

    /// Parse (memoized) and evaluate `source` for `directive`.
    pub(crate) fn eval(&mut self, directive: &str, source: &str) -> Result<Value, RenderError> {
        let expression = match self.expressions.entry(source.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let parsed = Expression::parse(source).map_err(|err| {
                    RenderError::new(RenderErrorKind::Parse(err), self.template.clone())
                        .with_directive(directive)
                        .with_expression(source.trim())
                })?;
                entry.insert(parsed)
            }
        };

        expression.evaluate(&self.scope, self.engine.filters()).map_err(|err| {
            RenderError::new(RenderErrorKind::Eval(err), self.template.clone())
                .with_directive(directive)
                .with_expression(expression.source())
        })
    }

    /// Charge one loop iteration against the render's budget.
    pub(crate) fn charge_iteration(&mut self) -> Result<(), RenderError> {
        self.iterations += 1;
        let limit = self.engine.config().max_loop_iterations;
        if self.iterations > limit {
            return Err(self.error(RenderErrorKind::LoopBudgetExceeded {
                limit,
            }));
        }
        Ok(())
    }

    /// Fail up front when `count` more iterations cannot fit in the budget.
    pub(crate) fn ensure_iterations(&self, count: u64) -> Result<(), RenderError> {
        let limit = self.engine.config().max_loop_iterations;
        let remaining = limit.saturating_sub(self.iterations);
        if !usize::try_from(count).is_ok_and(|count| count <= remaining) {
            return Err(self.error(RenderErrorKind::LoopBudgetExceeded {
                limit,
            }));
        }
        Ok(())
    }
}
