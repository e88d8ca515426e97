//! Tree-walking evaluation of expressions.

use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::Value;

use super::EvalError;
use super::parser::{BinaryOp, Expr, FilterCall, Segment};
use crate::filters::FilterRegistry;
use crate::scope::ScopeStack;
use crate::value::{is_truthy, loose_eq, type_name};

static NULL: Value = Value::Null;

pub(super) struct Evaluator<'a> {
    pub(super) scope: &'a ScopeStack,
    pub(super) filters: &'a FilterRegistry,
}

/// Key used for a single traversal step.
enum Key<'k> {
    Name(Cow<'k, str>),
    Position(i64),
}

impl Key<'_> {
    fn describe(&self) -> String {
        match self {
            Key::Name(name) => name.to_string(),
            Key::Position(n) => n.to_string(),
        }
    }
}

impl<'a> Evaluator<'a> {
    pub(super) fn eval(&self, expr: &Expr) -> Result<Value, EvalError> {
        self.eval_ref(expr).map(Cow::into_owned)
    }

    /// Evaluate without cloning when the result lives in the scope.
    fn eval_ref(&self, expr: &Expr) -> Result<Cow<'a, Value>, EvalError> {
        match expr {
            Expr::Literal(value) => Ok(Cow::Owned(value.clone())),
            Expr::Variable(name) => {
                Ok(Cow::Borrowed(self.scope.resolve(name).unwrap_or(&NULL)))
            }
            Expr::Access {
                target,
                segments,
            } => {
                let mut current = self.eval_ref(target)?;
                for segment in segments {
                    let key = match segment {
                        Segment::Field(name) => Key::Name(Cow::Borrowed(name.as_str())),
                        Segment::Index(index) => to_key(self.eval(index)?)?,
                    };
                    current = step(current, &key)?;
                }
                Ok(current)
            }
            Expr::Not(inner) => Ok(Cow::Owned(Value::Bool(!is_truthy(&*self.eval_ref(inner)?)))),
            Expr::Binary {
                op,
                lhs,
                rhs,
            } => self.eval_binary(*op, lhs, rhs),
            Expr::Pipe {
                input,
                filters,
            } => {
                let mut value = self.eval(input)?;
                for call in filters {
                    value = self.apply(call, value)?;
                }
                Ok(Cow::Owned(value))
            }
        }
    }

    fn apply(&self, call: &FilterCall, input: Value) -> Result<Value, EvalError> {
        let args = call.args.iter().map(|arg| self.eval(arg)).collect::<Result<Vec<_>, _>>()?;
        self.filters.apply(&call.name, input, args)
    }

    fn eval_binary(&self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<Cow<'a, Value>, EvalError> {
        let left = self.eval_ref(lhs)?;
        match op {
            BinaryOp::And => {
                if is_truthy(&left) {
                    self.eval_ref(rhs)
                } else {
                    Ok(left)
                }
            }
            BinaryOp::Or => {
                if is_truthy(&left) {
                    Ok(left)
                } else {
                    self.eval_ref(rhs)
                }
            }
            BinaryOp::Eq => Ok(Cow::Owned(Value::Bool(loose_eq(&left, &*self.eval_ref(rhs)?)))),
            BinaryOp::Ne => Ok(Cow::Owned(Value::Bool(!loose_eq(&left, &*self.eval_ref(rhs)?)))),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let right = self.eval_ref(rhs)?;
                let ordering = compare(&left, &right).ok_or(EvalError::Incomparable {
                    op: op.symbol(),
                    left: type_name(&left),
                    right: type_name(&right),
                })?;
                let result = match op {
                    BinaryOp::Lt => ordering == Ordering::Less,
                    BinaryOp::Le => ordering != Ordering::Greater,
                    BinaryOp::Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                };
                Ok(Cow::Owned(Value::Bool(result)))
            }
        }
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn to_key(index: Value) -> Result<Key<'static>, EvalError> {
    match index {
        Value::String(s) => Ok(Key::Name(Cow::Owned(s))),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Key::Position(i)),
            None => Err(EvalError::InvalidIndex {
                found: "number",
            }),
        },
        other => Err(EvalError::InvalidIndex {
            found: type_name(&other),
        }),
    }
}

/// Take one traversal step. Missing keys, out-of-range positions and
/// traversal through null all yield null.
fn step<'a>(current: Cow<'a, Value>, key: &Key<'_>) -> Result<Cow<'a, Value>, EvalError> {
    match current {
        Cow::Borrowed(value) => Ok(Cow::Borrowed(lookup(value, key)?.unwrap_or(&NULL))),
        Cow::Owned(value) => {
            Ok(Cow::Owned(lookup(&value, key)?.cloned().unwrap_or(Value::Null)))
        }
    }
}

fn lookup<'v>(value: &'v Value, key: &Key<'_>) -> Result<Option<&'v Value>, EvalError> {
    match (value, key) {
        (Value::Null, _) => Ok(None),
        (Value::Object(map), Key::Name(name)) => Ok(map.get(&**name)),
        (Value::Object(map), Key::Position(n)) => Ok(map.get(&n.to_string())),
        (Value::Array(items), Key::Position(n)) => {
            Ok(usize::try_from(*n).ok().and_then(|i| items.get(i)))
        }
        (Value::Array(items), Key::Name(name)) => {
            Ok(name.parse::<usize>().ok().and_then(|i| items.get(i)))
        }
        (scalar, key) => Err(EvalError::NotIndexable {
            segment: key.describe(),
            found: type_name(scalar),
        }),
    }
}
