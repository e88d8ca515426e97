//! Directive processing over the markup tree.
//!
//! The walk is depth-first. Each element is first classified by its
//! structural directive (`v-if` / `v-else-if` / `v-else` / `v-for`), which
//! decides how many copies of the element survive. Surviving elements then
//! get their attribute bindings applied, then `v-show`, then either `v-html`
//! or a recursive walk of their children with `{{ }}` interpolation.
//!
//! Input trees are never modified; every surviving node is rebuilt as a new
//! owned node, so the same cached template can back concurrent renders.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::trace;

use super::components;
use super::context::RenderContext;
use super::error::{RenderError, RenderErrorKind};
use crate::dom::{Element, Node, is_raw_text_element};
use crate::expr::EvalError;
use crate::scope::Frame;
use crate::value::{is_truthy, to_display_string, type_name};

pub(crate) const V_IF: &str = "v-if";
pub(crate) const V_ELSE_IF: &str = "v-else-if";
pub(crate) const V_ELSE: &str = "v-else";
pub(crate) const V_FOR: &str = "v-for";
pub(crate) const V_SHOW: &str = "v-show";
pub(crate) const V_HTML: &str = "v-html";

const STRUCTURAL: [&str; 4] = [V_IF, V_ELSE_IF, V_ELSE, V_FOR];

static INTERPOLATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{(.*?)\}\}").expect("interpolation pattern is valid"));

static LOOP_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)^\s*(?:\(\s*([A-Za-z_$][\w$]*)\s*(?:,\s*([A-Za-z_$][\w$]*)\s*)?\)|([A-Za-z_$][\w$]*)\s*(?:,\s*([A-Za-z_$][\w$]*)\s*)?)\s+(?:in|of)\s+(.+?)\s*$",
    )
    .expect("loop header pattern is valid")
});

/// Name given to a bound attribute: `:name` or `v-bind:name`.
pub(crate) fn bound_name(attr: &str) -> Option<&str> {
    attr.strip_prefix("v-bind:").or_else(|| attr.strip_prefix(':')).filter(|name| !name.is_empty())
}

/// How the walk treats one attribute of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttrRole<'a> {
    Structural,
    Show,
    Html,
    /// `:name` / `v-bind:name`, carrying `name`.
    Bound(&'a str),
    /// A `v-` attribute that is not a directive.
    Unknown,
    Plain,
}

pub(crate) fn attr_role(name: &str) -> AttrRole<'_> {
    if STRUCTURAL.contains(&name) {
        AttrRole::Structural
    } else if name == V_SHOW {
        AttrRole::Show
    } else if name == V_HTML {
        AttrRole::Html
    } else if let Some(target) = bound_name(name) {
        AttrRole::Bound(target)
    } else if name.starts_with("v-") {
        AttrRole::Unknown
    } else {
        AttrRole::Plain
    }
}

/// Progress through a `v-if` / `v-else-if` / `v-else` chain.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Chain {
    /// Not inside a chain.
    None,
    /// Inside a chain whose branches so far were all false.
    Pending,
    /// Inside a chain where a branch was rendered.
    Taken,
}

impl<'e> RenderContext<'e> {
    /// Render a list of sibling nodes.
    pub(crate) fn render_nodes(
        &mut self,
        nodes: &[Node],
        raw_text: bool,
    ) -> Result<Vec<Node>, RenderError> {
        let mut out = Vec::with_capacity(nodes.len());
        let mut chain = Chain::None;

        for node in nodes {
            match node {
                Node::Element(element) => {
                    chain = self.render_structural(element, chain, &mut out)?;
                }
                Node::Text(text) => {
                    if !node.is_insignificant() {
                        chain = Chain::None;
                    }
                    if raw_text {
                        out.push(node.clone());
                    } else {
                        out.push(Node::Text(self.interpolate(text)?));
                    }
                }
                Node::Comment(_) => out.push(node.clone()),
                Node::Raw(_) | Node::Doctype(_) => {
                    chain = Chain::None;
                    out.push(node.clone());
                }
            }
        }

        Ok(out)
    }

    fn render_structural(
        &mut self,
        element: &Element,
        chain: Chain,
        out: &mut Vec<Node>,
    ) -> Result<Chain, RenderError> {
        let present: Vec<&str> =
            STRUCTURAL.iter().copied().filter(|name| element.has_attr(name)).collect();

        if present.len() > 1 {
            return Err(self.directive_error(
                present[1],
                None,
                format!("<{}> cannot combine {}", element.name, present.join(" and ")),
            ));
        }

        match present.first().copied() {
            None => {
                out.extend(self.render_element(element)?);
                Ok(Chain::None)
            }
            Some(V_IF) => {
                let guard = element.attr(V_IF).unwrap_or_default();
                if self.guard(V_IF, guard)? {
                    trace!("v-if \"{}\" is true in '{}'", guard, self.template());
                    out.extend(self.render_element(element)?);
                    Ok(Chain::Taken)
                } else {
                    Ok(Chain::Pending)
                }
            }
            Some(directive @ (V_ELSE_IF | V_ELSE)) => match chain {
                Chain::None => Err(self.directive_error(
                    directive,
                    element.attr(directive).filter(|source| !source.trim().is_empty()),
                    format!("{directive} without a preceding v-if or v-else-if"),
                )),
                Chain::Taken if directive == V_ELSE => Ok(Chain::None),
                Chain::Taken => Ok(Chain::Taken),
                Chain::Pending if directive == V_ELSE => {
                    out.extend(self.render_element(element)?);
                    Ok(Chain::None)
                }
                Chain::Pending => {
                    let guard = element.attr(V_ELSE_IF).unwrap_or_default();
                    if self.guard(V_ELSE_IF, guard)? {
                        out.extend(self.render_element(element)?);
                        Ok(Chain::Taken)
                    } else {
                        Ok(Chain::Pending)
                    }
                }
            },
            Some(_) => {
                self.render_loop(element, out)?;
                Ok(Chain::None)
            }
        }
    }

    fn guard(&mut self, directive: &str, source: &str) -> Result<bool, RenderError> {
        if source.trim().is_empty() {
            return Err(self.directive_error(directive, None, format!("{directive} needs an expression")));
        }
        Ok(is_truthy(&self.eval(directive, source)?))
    }

    fn render_loop(&mut self, element: &Element, out: &mut Vec<Node>) -> Result<(), RenderError> {
        let header = element.attr(V_FOR).unwrap_or_default();
        let Some(caps) = LOOP_HEADER.captures(header) else {
            return Err(self.directive_error(
                V_FOR,
                Some(header),
                "expected 'item in items', 'item, index in items' or '(item, index) in items'",
            ));
        };
        let item_var = caps.get(1).or_else(|| caps.get(3)).map(|m| m.as_str()).unwrap_or_default();
        let index_var = caps.get(2).or_else(|| caps.get(4)).map(|m| m.as_str());
        let source = caps.get(5).map(|m| m.as_str()).unwrap_or_default();

        let collection = self.eval(V_FOR, source)?;
        if let Some(count) = collection.as_u64() {
            self.ensure_iterations(count)
                .map_err(|err| err.with_directive(V_FOR).with_expression(source))?;
        }
        let items = iteration_items(collection).map_err(|err| {
            self.error(RenderErrorKind::Eval(err)).with_directive(V_FOR).with_expression(source)
        })?;
        trace!("v-for \"{}\" over {} item(s) in '{}'", header, items.len(), self.template());

        for (item, index) in items {
            self.charge_iteration()?;
            let mut frame = Frame::new();
            frame.insert(item_var.to_string(), item);
            if let Some(index_var) = index_var {
                frame.insert(index_var.to_string(), index);
            }
            let nodes = self.with_frame(frame, |ctx| ctx.render_element(element))?;
            out.extend(nodes);
        }
        Ok(())
    }

    /// Render an element whose structural directive (if any) has already
    /// been decided.
    pub(crate) fn render_element(&mut self, element: &Element) -> Result<Vec<Node>, RenderError> {
        match element.name.as_str() {
            components::INCLUDE_TAG => self.render_include(element),
            "template" => self.render_wrapper(element),
            _ => Ok(vec![Node::Element(self.render_plain(element)?)]),
        }
    }

    fn render_plain(&mut self, element: &Element) -> Result<Element, RenderError> {
        let mut rendered = Element::new(element.name.clone());
        let mut bindings = Vec::new();
        let mut show = None;
        let mut html = None;

        for (name, value) in &element.attrs {
            let name = name.as_str();
            match attr_role(name) {
                AttrRole::Structural => {}
                AttrRole::Show => show = Some(value.as_str()),
                AttrRole::Html => html = Some(value.as_str()),
                AttrRole::Bound(target) => bindings.push((name, target, value.as_str())),
                AttrRole::Unknown => return Err(self.unknown_directive(name, value)),
                AttrRole::Plain => rendered.attrs.push((name.to_string(), value.clone())),
            }
        }

        for (directive, target, source) in bindings {
            let value = self.eval(directive, source)?;
            apply_binding(&mut rendered, target, &value);
        }

        if let Some(source) = show {
            if !self.guard(V_SHOW, source)? {
                hide(&mut rendered);
            }
        }

        rendered.children = match html {
            Some(source) => {
                let value = self.eval(V_HTML, source)?;
                vec![Node::Raw(to_display_string(&value))]
            }
            None => self.render_nodes(&element.children, is_raw_text_element(&element.name))?,
        };

        Ok(rendered)
    }

    /// Render the children of a `<template>` wrapper. The wrapper is not
    /// emitted, so only structural directives and the `required` list apply
    /// to it.
    fn render_wrapper(&mut self, element: &Element) -> Result<Vec<Node>, RenderError> {
        for (name, value) in &element.attrs {
            match attr_role(name) {
                AttrRole::Structural | AttrRole::Plain | AttrRole::Bound("required") => {}
                AttrRole::Unknown => return Err(self.unknown_directive(name, value)),
                AttrRole::Show | AttrRole::Html | AttrRole::Bound(_) => {
                    return Err(self.directive_error(
                        name,
                        Some(value.as_str()),
                        format!("{name} is not supported on <template>"),
                    ));
                }
            }
        }
        self.render_nodes(&element.children, false)
    }

    pub(crate) fn unknown_directive(&self, name: &str, value: &str) -> RenderError {
        self.directive_error(name, Some(value), format!("unknown directive '{name}'"))
    }

    /// Substitute every `{{ expr }}` in `text`.
    fn interpolate(&mut self, text: &str) -> Result<String, RenderError> {
        if !text.contains("{{") {
            return Ok(text.to_string());
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in INTERPOLATION.captures_iter(text) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&text[last..whole.start()]);
            let value = self.eval("{{ }}", inner.as_str())?;
            out.push_str(&to_display_string(&value));
            last = whole.end();
        }
        out.push_str(&text[last..]);
        Ok(out)
    }
}

/// Expand a `v-for` collection into `(item, index)` pairs.
fn iteration_items(collection: Value) -> Result<Vec<(Value, Value)>, EvalError> {
    match collection {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .map(|(i, item)| (item, Value::from(i)))
            .collect()),
        Value::Object(map) => Ok(map.into_iter().map(|(key, value)| (value, Value::String(key))).collect()),
        Value::Number(n) => match n.as_u64() {
            Some(count) => {
                Ok((1..=count).enumerate().map(|(i, n)| (Value::from(n), Value::from(i))).collect())
            }
            None => Err(EvalError::NotIterable {
                found: "number",
            }),
        },
        other => Err(EvalError::NotIterable {
            found: type_name(&other),
        }),
    }
}

fn apply_binding(element: &mut Element, target: &str, value: &Value) {
    if target == "class" {
        let mut classes: Vec<String> = element
            .attr("class")
            .map(|existing| existing.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        for class in class_tokens(value) {
            if !classes.contains(&class) {
                classes.push(class);
            }
        }
        if classes.is_empty() {
            element.remove_attr("class");
        } else {
            element.set_attr("class", classes.join(" "));
        }
        return;
    }

    match value {
        Value::Null | Value::Bool(false) => {
            element.remove_attr(target);
        }
        Value::Bool(true) => element.set_attr(target, ""),
        other => element.set_attr(target, to_display_string(other)),
    }
}

/// Class names contributed by a bound `class` value.
fn class_tokens(value: &Value) -> Vec<String> {
    match value {
        Value::Null | Value::Bool(_) => Vec::new(),
        Value::Array(items) => items.iter().flat_map(class_tokens).collect(),
        Value::Object(map) => map
            .iter()
            .filter(|(_, enabled)| is_truthy(enabled))
            .map(|(name, _)| name.clone())
            .collect(),
        other => to_display_string(other).split_whitespace().map(str::to_string).collect(),
    }
}

/// Merge `display: none` into the element's style, replacing any existing
/// `display` declaration.
fn hide(element: &mut Element) {
    let mut declarations: Vec<String> = element
        .attr("style")
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| {
            let property = decl.split(':').next().unwrap_or_default();
            !property.trim().eq_ignore_ascii_case("display")
        })
        .map(str::to_string)
        .collect();
    declarations.push("display: none".to_string());
    element.set_attr("style", declarations.join("; "));
}
