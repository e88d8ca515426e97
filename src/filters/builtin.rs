//! Built-in filters available in every [`FilterRegistry::with_builtins`].
//!
//! Bodies can assume their arguments already match the declared
//! [`Signature`]; the registry coerces before calling in.

use anyhow::{Context, Result, bail};
use serde_json::Value;

use super::{FilterRegistry, ParamType, Signature};
use crate::value::{is_truthy, number, to_display_string, type_name};

use ParamType::{Any, Bool, Integer, Mapping, Number, Sequence, String as Str};

pub(super) fn register_builtins(registry: &mut FilterRegistry) {
    registry.register("upper", Signature::new([Str]), |args| {
        Ok(Value::String(string(&args[0]).to_uppercase()))
    });
    registry.register("lower", Signature::new([Str]), |args| {
        Ok(Value::String(string(&args[0]).to_lowercase()))
    });
    registry.register("capitalize", Signature::new([Str]), |args| {
        Ok(Value::String(capitalize(string(&args[0]))))
    });
    registry.register("title", Signature::new([Str]), |args| {
        let words: Vec<String> = string(&args[0]).split(' ').map(capitalize).collect();
        Ok(Value::String(words.join(" ")))
    });
    registry.register("trim", Signature::new([Str]), |args| {
        Ok(Value::String(string(&args[0]).trim().to_string()))
    });
    registry.register("length", Signature::new([Any]), |args| length(&args[0]));
    registry.register("default", Signature::new([Any, Any]), |args| {
        Ok(if is_truthy(&args[0]) { args[0].clone() } else { args[1].clone() })
    });
    registry.register("join", Signature::new([Sequence, Str]).optional(1), |args| {
        let separator = args.get(1).map(string).unwrap_or("");
        let parts: Vec<String> = sequence(&args[0]).iter().map(to_display_string).collect();
        Ok(Value::String(parts.join(separator)))
    });
    registry.register("first", Signature::new([Any]), |args| edge(&args[0], true));
    registry.register("last", Signature::new([Any]), |args| edge(&args[0], false));
    registry.register("reverse", Signature::new([Any]), |args| match &args[0] {
        Value::Array(items) => Ok(Value::Array(items.iter().rev().cloned().collect())),
        Value::String(s) => Ok(Value::String(s.chars().rev().collect())),
        other => bail!("cannot reverse a {} value", type_name(other)),
    });
    registry.register("sort", Signature::new([Sequence]), |args| sort(sequence(&args[0])));
    registry.register("keys", Signature::new([Mapping]), |args| {
        Ok(Value::Array(mapping(&args[0]).map(|(key, _)| Value::String(key.clone())).collect()))
    });
    registry.register("values", Signature::new([Mapping]), |args| {
        Ok(Value::Array(mapping(&args[0]).map(|(_, value)| value.clone()).collect()))
    });
    registry.register("json", Signature::new([Any, Bool]).optional(1), |args| {
        let pretty = args.get(1).and_then(Value::as_bool).unwrap_or(false);
        let text = if pretty {
            serde_json::to_string_pretty(&args[0])
        } else {
            serde_json::to_string(&args[0])
        };
        Ok(Value::String(text.context("failed to serialize value")?))
    });
    registry.register(
        "truncate",
        Signature::new([Str, Integer, Str]).optional(1),
        |args| {
            let s = string(&args[0]);
            let width = args[1].as_i64().unwrap_or_default();
            let Ok(width) = usize::try_from(width) else {
                bail!("length must not be negative, got {width}");
            };
            let ellipsis = args.get(2).map(string).unwrap_or("...");
            if s.chars().count() <= width {
                return Ok(Value::String(s.to_string()));
            }
            let kept: String = s.chars().take(width).collect();
            Ok(Value::String(format!("{kept}{ellipsis}")))
        },
    );
    registry.register("replace", Signature::new([Str, Str, Str]), |args| {
        Ok(Value::String(string(&args[0]).replace(string(&args[1]), string(&args[2]))))
    });
    registry.register("split", Signature::new([Str, Str]), |args| {
        let separator = string(&args[1]);
        if separator.is_empty() {
            bail!("separator must not be empty");
        }
        Ok(Value::Array(
            string(&args[0]).split(separator).map(|part| Value::String(part.to_string())).collect(),
        ))
    });
    registry.register("int", Signature::new([Number]), |args| {
        Ok(Value::from(float(&args[0]).trunc() as i64))
    });
    registry.register("float", Signature::new([Number]), |args| {
        serde_json::Number::from_f64(float(&args[0]))
            .map(Value::Number)
            .context("number is not finite")
    });
    registry.register("string", Signature::new([Any]), |args| {
        Ok(Value::String(to_display_string(&args[0])))
    });
    registry.register("add", Signature::new([Number, Number]), |args| {
        Ok(number(float(&args[0]) + float(&args[1])))
    });
    registry.register("round", Signature::new([Number, Integer]).optional(1), |args| {
        let precision = args.get(1).and_then(Value::as_i64).unwrap_or(0).clamp(0, 15);
        let factor = 10f64.powi(precision as i32);
        Ok(number((float(&args[0]) * factor).round() / factor))
    });
    registry.register("abs", Signature::new([Number]), |args| Ok(number(float(&args[0]).abs())));
}

// Accessors for already-coerced arguments.

fn string(value: &Value) -> &str {
    value.as_str().unwrap_or_default()
}

fn float(value: &Value) -> f64 {
    value.as_f64().unwrap_or_default()
}

fn sequence(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or_default()
}

fn mapping(value: &Value) -> impl Iterator<Item = (&String, &Value)> {
    value.as_object().into_iter().flatten()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn length(value: &Value) -> Result<Value> {
    let len = match value {
        Value::Null => 0,
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => bail!("a {} value has no length", type_name(other)),
    };
    Ok(Value::from(len))
}

fn edge(value: &Value, front: bool) -> Result<Value> {
    match value {
        Value::Array(items) => {
            let item = if front { items.first() } else { items.last() };
            Ok(item.cloned().unwrap_or(Value::Null))
        }
        Value::String(s) => {
            let c = if front { s.chars().next() } else { s.chars().next_back() };
            Ok(c.map(|c| Value::String(c.to_string())).unwrap_or(Value::Null))
        }
        Value::Null => Ok(Value::Null),
        other => bail!("cannot take an element of a {} value", type_name(other)),
    }
}

fn sort(items: &[Value]) -> Result<Value> {
    let mut sorted = items.to_vec();
    if sorted.iter().all(Value::is_number) {
        sorted.sort_by(|a, b| float(a).total_cmp(&float(b)));
    } else if sorted.iter().all(Value::is_string) {
        sorted.sort_by(|a, b| string(a).cmp(string(b)));
    } else {
        bail!("can only sort a sequence of all numbers or all strings");
    }
    Ok(Value::Array(sorted))
}
