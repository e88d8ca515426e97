//! Component includes.
//!
//! ```html
//! <include src="card" title="Static" :post="posts[0]"></include>
//! ```
//!
//! `src` (or `:src` for a computed name) names the target template. Plain
//! attributes are passed as string props and bound attributes are evaluated
//! in the including scope. The target renders in a scope holding exactly
//! those props; nothing else from the caller leaks in.
//!
//! A target may declare required props on a leading `<template>`:
//!
//! ```html
//! <template required="title, post">...</template>
//! ```
//!
//! Missing required props fail the include before the target is walked.

use tracing::debug;

use super::context::RenderContext;
use super::directives::{AttrRole, attr_role, bound_name};
use super::error::{RenderError, RenderErrorKind};
use crate::dom::{Element, Node};
use crate::scope::Frame;
use crate::value::to_display_string;

pub(crate) const INCLUDE_TAG: &str = "include";

const DIRECTIVE: &str = "<include>";

impl<'e> RenderContext<'e> {
    pub(crate) fn render_include(&mut self, element: &Element) -> Result<Vec<Node>, RenderError> {
        let name = self.include_target(element)?;
        let props = self.include_props(element)?;

        let limit = self.engine.config().max_depth;
        if self.depth() >= limit {
            return Err(self
                .error(RenderErrorKind::DepthExceeded {
                    limit,
                })
                .with_directive(DIRECTIVE)
                .with_expression(name));
        }

        let template = self.engine.provider().load(&name).map_err(|err| {
            self.error(RenderErrorKind::Load(err))
                .with_directive(DIRECTIVE)
                .with_expression(name.clone())
        })?;

        for prop in template.required_props() {
            if !props.contains_key(&prop) {
                return Err(self
                    .error(RenderErrorKind::MissingProp {
                        prop,
                        component: name.clone(),
                    })
                    .with_directive(DIRECTIVE)
                    .with_expression(name));
            }
        }

        debug!(
            "Including '{}' from '{}' with {} prop(s)",
            name,
            self.template(),
            props.len()
        );
        self.with_template(&name, props, |ctx| ctx.render_nodes(&template.document().nodes, false))
    }

    fn include_target(&mut self, element: &Element) -> Result<String, RenderError> {
        let name = match element.attr("src") {
            Some(src) => src.trim().to_string(),
            None => {
                let bound = element
                    .attrs
                    .iter()
                    .find(|(attr, _)| bound_name(attr) == Some("src"));
                match bound {
                    Some((attr, source)) => to_display_string(&self.eval(attr, source)?),
                    None => String::new(),
                }
            }
        };

        if name.is_empty() {
            return Err(self.directive_error(DIRECTIVE, None, "<include> needs a non-empty src"));
        }
        Ok(name)
    }

    fn include_props(&mut self, element: &Element) -> Result<Frame, RenderError> {
        let mut props = Frame::new();
        for (attr, value) in &element.attrs {
            match attr_role(attr) {
                // Resolved by the caller.
                AttrRole::Structural => {}
                AttrRole::Show | AttrRole::Html => {
                    return Err(self.directive_error(
                        attr,
                        Some(value.as_str()),
                        format!("{attr} is not supported on <include>"),
                    ));
                }
                AttrRole::Unknown => return Err(self.unknown_directive(attr, value)),
                AttrRole::Bound("src") => {}
                AttrRole::Bound(prop) => {
                    let value = self.eval(attr, value)?;
                    props.insert(prop.to_string(), value);
                }
                AttrRole::Plain if attr == "src" => {}
                AttrRole::Plain => {
                    props.insert(attr.clone(), serde_json::Value::String(value.clone()));
                }
            }
        }
        Ok(props)
    }
}
