//! Filter registry for the `|` pipe operator.
//!
//! A filter is a named function that receives the piped value as argument 0
//! followed by the explicit arguments of the call. Every filter declares a
//! [`Signature`]; arguments are coerced to the declared [`ParamType`]s before
//! the filter body runs, so bodies only ever see well-typed values.
//!
//! # Lifecycle
//!
//! Filters are registered before rendering starts. [`crate::render::Engine`]
//! keeps the registry behind an `Arc` and only hands out shared references
//! while rendering, so registration and rendering cannot overlap.
//!
//! # Examples
//!
//! ```
//! use serde_json::{Value, json};
//! use vtpl::filters::{FilterRegistry, ParamType, Signature};
//!
//! let mut filters = FilterRegistry::with_builtins();
//! filters.register("double", Signature::new([ParamType::Number]), |args| {
//!     Ok(vtpl::value::number(args[0].as_f64().unwrap_or_default() * 2.0))
//! });
//!
//! let doubled = filters.apply("double", json!("21"), vec![]).unwrap();
//! assert_eq!(doubled, json!(42));
//! ```

mod builtin;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use strsim::levenshtein;

use crate::expr::EvalError;
use crate::value::{number, type_name};

/// Maximum Levenshtein distance, as a percentage of the name length, for a
/// registered filter to be suggested in an unknown-filter error.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Declared type of a filter parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Any,
    String,
    Number,
    Integer,
    Bool,
    Sequence,
    Mapping,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamType::Any => "any",
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Integer => "integer",
            ParamType::Bool => "bool",
            ParamType::Sequence => "sequence",
            ParamType::Mapping => "mapping",
        })
    }
}

impl ParamType {
    /// Coerce `value` to this type using the target type's parse rules.
    ///
    /// Returns `None` when no lossless conversion exists; callers report
    /// that as a typed argument error rather than substituting a default.
    pub fn coerce(self, value: Value) -> Option<Value> {
        match (self, value) {
            (ParamType::Any, value) => Some(value),
            (ParamType::String, Value::String(s)) => Some(Value::String(s)),
            (ParamType::String, Value::Number(n)) => Some(Value::String(n.to_string())),
            (ParamType::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (ParamType::Number, Value::Number(n)) => Some(Value::Number(n)),
            (ParamType::Number, Value::String(s)) => s.trim().parse::<f64>().ok().map(number),
            (ParamType::Integer, Value::Number(n)) => {
                n.as_i64().map(Value::from).or_else(|| {
                    n.as_f64().filter(|f| f.fract() == 0.0).map(number)
                })
            }
            (ParamType::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
            (ParamType::Bool, Value::Bool(b)) => Some(Value::Bool(b)),
            (ParamType::Bool, Value::String(s)) => s.trim().parse::<bool>().ok().map(Value::Bool),
            (ParamType::Sequence, value @ Value::Array(_)) => Some(value),
            (ParamType::Mapping, value @ Value::Object(_)) => Some(value),
            _ => None,
        }
    }
}

/// Parameter list of a filter; `params[0]` is the piped value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    params: Vec<ParamType>,
    optional: usize,
    variadic: Option<ParamType>,
}

impl Signature {
    pub fn new(params: impl Into<Vec<ParamType>>) -> Self {
        Self {
            params: params.into(),
            optional: 0,
            variadic: None,
        }
    }

    /// Mark the last `count` parameters as optional.
    pub fn optional(mut self, count: usize) -> Self {
        self.optional = count.min(self.params.len().saturating_sub(1));
        self
    }

    /// Accept any number of trailing arguments of type `ty`.
    pub fn variadic(mut self, ty: ParamType) -> Self {
        self.variadic = Some(ty);
        self
    }

    fn required(&self) -> usize {
        self.params.len() - self.optional
    }

    fn accepts(&self, count: usize) -> bool {
        count >= self.required() && (self.variadic.is_some() || count <= self.params.len())
    }

    fn param_type(&self, index: usize) -> ParamType {
        self.params
            .get(index)
            .copied()
            .or(self.variadic)
            .unwrap_or(ParamType::Any)
    }

    /// Number of explicit (non-piped) arguments accepted, for diagnostics.
    fn describe_arity(&self) -> String {
        let min = self.required().saturating_sub(1);
        let max = self.params.len().saturating_sub(1);
        match (self.variadic, min == max) {
            (Some(_), _) => format!("at least {min}"),
            (None, true) => min.to_string(),
            (None, false) => format!("{min} to {max}"),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let required = self.required();
        let mut parts: Vec<String> = self
            .params
            .iter()
            .enumerate()
            .map(|(i, ty)| if i >= required { format!("{ty}?") } else { ty.to_string() })
            .collect();
        if let Some(ty) = self.variadic {
            parts.push(format!("{ty}..."));
        }
        write!(f, "({})", parts.join(", "))
    }
}

/// Body of a filter. Receives the coerced piped value and arguments.
pub type FilterFn = dyn Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync;

#[derive(Clone)]
pub struct Filter {
    name: String,
    signature: Signature,
    func: Arc<FilterFn>,
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

impl Filter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

/// Name → filter mapping. Cloning is cheap; filter bodies are shared.
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    filters: HashMap<String, Filter>,
}

impl FilterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in filters.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtin::register_builtins(&mut registry);
        registry
    }

    /// Register (or replace) a filter.
    pub fn register<F>(&mut self, name: impl Into<String>, signature: Signature, func: F)
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        self.filters.insert(
            name.clone(),
            Filter {
                name,
                signature,
                func: Arc::new(func),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&Filter> {
        self.filters.get(name)
    }

    /// Registered filters sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        let mut filters: Vec<&Filter> = self.filters.values().collect();
        filters.sort_by(|a, b| a.name.cmp(&b.name));
        filters.into_iter()
    }

    /// Apply filter `name` to `input` with explicit `args`.
    pub fn apply(&self, name: &str, input: Value, args: Vec<Value>) -> Result<Value, EvalError> {
        let filter = self.get(name).ok_or_else(|| EvalError::UnknownFilter {
            name: name.to_string(),
            suggestion: self.suggest(name),
        })?;
        let signature = &filter.signature;

        let mut values = Vec::with_capacity(args.len() + 1);
        values.push(input);
        values.extend(args);

        if !signature.accepts(values.len()) {
            return Err(EvalError::Arity {
                filter: filter.name.clone(),
                expected: signature.describe_arity(),
                found: values.len() - 1,
            });
        }

        let coerced = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                let expected = signature.param_type(index);
                let found = type_name(&value);
                expected.coerce(value).ok_or_else(|| EvalError::ArgumentType {
                    filter: filter.name.clone(),
                    index,
                    found,
                    expected,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        (filter.func)(&coerced).map_err(|err| EvalError::Filter {
            filter: filter.name.clone(),
            message: format!("{err:#}"),
        })
    }

    fn suggest(&self, name: &str) -> Option<String> {
        let max_distance = (name.len() * SIMILARITY_THRESHOLD_PERCENT / 100).max(1);
        self.filters
            .keys()
            .map(|candidate| (levenshtein(name, candidate), candidate))
            .filter(|(distance, _)| *distance <= max_distance)
            .min()
            .map(|(_, candidate)| candidate.clone())
    }
}
