//! Front matter and layout wrapping.

use anyhow::Result;
use serde_json::json;
use vtpl::config::RenderConfig;
use vtpl::loader::MemoryLoader;
use vtpl::render::{Engine, ErrorCategory};
use vtpl::test_utils::{SiteFixture, TemplateFixture};

fn posts() -> serde_json::Value {
    json!({"posts": [{"title": "First"}]})
}

#[test]
fn test_default_layout_wraps_page() -> Result<()> {
    let engine = Engine::new(SiteFixture::blog().loader());
    let html = engine.render_template("index", &posts())?;

    assert!(html.starts_with("<html><head><title>Blog</title></head><body><main>"));
    assert!(html.contains(r#"<div class="card"><h2>First</h2></div>"#));
    assert!(html.ends_with("</main></body></html>"));
    Ok(())
}

#[test]
fn test_no_front_matter_means_no_layout() -> Result<()> {
    let site = SiteFixture::blog().with(TemplateFixture::simple("bare", "<p>{{ title }}</p>"));
    let engine = Engine::new(site.loader());

    assert_eq!(engine.render_template("bare", &json!({"title": "t"}))?, "<p>t</p>");
    Ok(())
}

#[test]
fn test_layout_disabled_in_front_matter() -> Result<()> {
    let site = SiteFixture::blog().with(TemplateFixture::simple(
        "plain",
        "---\nlayout: false\nheading: Hi\n---\n<h1>{{ heading }}</h1>",
    ));
    let engine = Engine::new(site.loader());

    assert_eq!(engine.render_template("plain", &json!({}))?.trim(), "<h1>Hi</h1>");
    Ok(())
}

#[test]
fn test_named_layout_and_custom_content_var() -> Result<()> {
    let site = SiteFixture::blog()
        .with(TemplateFixture::simple("narrow", r#"<article :data-user="user" v-html="body"></article>"#))
        .with(TemplateFixture::simple("post", "---\nlayout: narrow\n---\n<p>text</p>"));
    let engine = Engine::new(site.loader()).with_config(RenderConfig {
        content_var: "body".to_string(),
        ..RenderConfig::default()
    });

    let html = engine.render_template("post", &json!({"user": "ada"}))?;
    assert!(html.starts_with(r#"<article data-user="ada"><p>text</p>"#));
    Ok(())
}

#[test]
fn test_layouts_switched_off_by_config() -> Result<()> {
    let engine = Engine::new(SiteFixture::blog().loader()).with_config(RenderConfig {
        layouts: false,
        ..RenderConfig::default()
    });

    let html = engine.render_template("index", &posts())?;
    assert!(!html.contains("<html>"));
    assert!(html.contains("<section>"));
    Ok(())
}

#[test]
fn test_front_matter_vars_shadow_data() -> Result<()> {
    let loader = MemoryLoader::new()
        .with_template("page", "---\nlayout: false\ntitle: From page\n---\n<p>{{ title }}/{{ other }}</p>");
    let engine = Engine::new(loader);

    let html = engine.render_template("page", &json!({"title": "From data", "other": "o"}))?;
    assert_eq!(html.trim(), "<p>From page/o</p>");
    Ok(())
}

#[test]
fn test_missing_layout_is_a_load_error() {
    let loader = MemoryLoader::new().with_template("page", "---\nlayout: nowhere\n---\n<p></p>");
    let err = Engine::new(loader).render_template("page", &json!({})).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Load);
    assert_eq!(err.directive(), Some("layout"));
    assert_eq!(err.expression(), Some("nowhere"));
    assert_eq!(err.template(), "page");
}

#[test]
fn test_errors_inside_layout_carry_chain() {
    let site = SiteFixture::blog().with(TemplateFixture::simple("layout", r#"<main v-html="content | nope"></main>"#));
    let err = Engine::new(site.loader()).render_template("index", &posts()).unwrap_err();

    assert_eq!(err.inclusion_chain(), vec!["index", "layout"]);
    assert_eq!(err.category(), ErrorCategory::Resolution);
}
