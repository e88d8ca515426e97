//! Page rendering with front-matter variables and layout wrapping.

use serde_json::Value;
use tracing::debug;

use super::context::RenderContext;
use super::error::{RenderError, RenderErrorKind};
use crate::dom::Document;
use crate::template::Template;

const DIRECTIVE: &str = "layout";

impl<'e> RenderContext<'e> {
    /// Render a top-level template: its body with the front-matter variables
    /// in scope, then its layout (if any) around the result.
    ///
    /// Only the outermost template selects a layout; a layout's own front
    /// matter contributes variables but never a further layout.
    pub(crate) fn render_page(&mut self, template: &Template) -> Result<Document, RenderError> {
        let vars = template.front_matter().map(|fm| fm.vars.clone()).unwrap_or_default();
        let body = self.with_frame(vars.clone(), |ctx| {
            ctx.render_nodes(&template.document().nodes, false)
        })?;
        let body = Document::new(body);

        let engine = self.engine;
        let config = engine.config();
        let layout_name = match template.front_matter() {
            Some(fm) if config.layouts => fm.layout_name(&config.default_layout),
            _ => None,
        };
        let Some(layout_name) = layout_name else {
            return Ok(body);
        };

        let layout = engine.provider().load(layout_name).map_err(|err| {
            self.error(RenderErrorKind::Load(err))
                .with_directive(DIRECTIVE)
                .with_expression(layout_name)
        })?;
        debug!("Applying layout '{}' to '{}'", layout_name, template.name());

        let mut frame = vars;
        if let Some(fm) = layout.front_matter() {
            for (key, value) in &fm.vars {
                frame.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
        frame.insert(config.content_var.clone(), Value::String(body.to_html()));

        // The layout sees the data context below the page variables.
        let mut base = self.snapshot();
        base.extend(frame);

        let nodes = self.with_template(layout_name, base, |ctx| {
            ctx.render_nodes(&layout.document().nodes, false)
        })?;
        Ok(Document::new(nodes))
    }
}
