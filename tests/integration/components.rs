//! `<include>` components: props, required props and scope isolation.

use anyhow::Result;
use serde_json::json;
use vtpl::loader::MemoryLoader;
use vtpl::render::{Engine, ErrorCategory, RenderErrorKind};
use vtpl::test_utils::{SiteFixture, TemplateFixture, init_test_logging};

#[test]
fn test_required_prop_satisfied() -> Result<()> {
    init_test_logging(None);
    let loader = MemoryLoader::new()
        .with_template("card", TemplateFixture::card().content)
        .with_template("page", r#"<include src="card" title="T"></include>"#);
    let engine = Engine::new(loader);

    let html = engine.render_template("page", &json!({}))?;
    assert_eq!(html, r#"<div class="card"><h2>T</h2></div>"#);
    Ok(())
}

#[test]
fn test_required_prop_missing() -> Result<()> {
    let loader = MemoryLoader::new()
        .with_template("card", TemplateFixture::card().content)
        .with_template("page", r#"<include src="card" body="B"></include>"#);
    let engine = Engine::new(loader);

    let err = engine.render_template("page", &json!({})).unwrap_err();
    match err.kind() {
        RenderErrorKind::MissingProp {
            prop,
            component,
        } => {
            assert_eq!(prop, "title");
            assert_eq!(component, "card");
        }
        other => panic!("expected MissingProp, got {other:?}"),
    }
    assert_eq!(err.category(), ErrorCategory::Resolution);
    assert_eq!(err.template(), "page");
    Ok(())
}

#[test]
fn test_bound_props_are_evaluated_in_caller_scope() -> Result<()> {
    let engine = Engine::new(SiteFixture::blog().loader());
    let html = engine.render_template(
        "index",
        &json!({"posts": [{"title": "First", "body": "Hello"}, {"title": "Second"}]}),
    )?;
    assert!(html.contains(
        r#"<section><div class="card"><h2>First</h2><p>Hello</p></div><div class="card"><h2>Second</h2></div></section>"#
    ));
    assert!(!html.contains("No posts"));
    Ok(())
}

#[test]
fn test_component_scope_is_isolated() -> Result<()> {
    let loader = MemoryLoader::new()
        .with_template("leaf", r#"<span>{{ label }}|{{ secret }}</span>"#)
        .with_template("page", r#"<include src="leaf" :label="name"></include>"#);
    let engine = Engine::new(loader);

    let html = engine.render_template("page", &json!({"name": "n", "secret": "s"}))?;
    assert_eq!(html, "<span>n|</span>");
    Ok(())
}

#[test]
fn test_computed_include_target() -> Result<()> {
    let loader = MemoryLoader::new()
        .with_template("icon-ok", "<i>ok</i>")
        .with_template("icon-fail", "<i>fail</i>")
        .with_template("page", r#"<include v-for="s in states" :src="s"></include>"#);
    let engine = Engine::new(loader);

    let html = engine.render_template("page", &json!({"states": ["icon-fail", "icon-ok"]}))?;
    assert_eq!(html, "<i>fail</i><i>ok</i>");
    Ok(())
}

#[test]
fn test_conditional_include() -> Result<()> {
    let loader = MemoryLoader::new()
        .with_template("banner", "<b>!</b>")
        .with_template("page", r#"<include v-if="show" src="banner"></include><p v-else>quiet</p>"#);
    let engine = Engine::new(loader);

    assert_eq!(engine.render_template("page", &json!({"show": true}))?, "<b>!</b>");
    assert_eq!(engine.render_template("page", &json!({"show": false}))?, "<p>quiet</p>");
    Ok(())
}

#[test]
fn test_nested_components() -> Result<()> {
    let loader = MemoryLoader::new()
        .with_template("inner", r#"<em>{{ text | upper }}</em>"#)
        .with_template("outer", r#"<p><include src="inner" :text="text"></include></p>"#)
        .with_template("page", r#"<include src="outer" text="deep"></include>"#);
    let engine = Engine::new(loader);

    assert_eq!(engine.render_template("page", &json!({}))?, "<p><em>DEEP</em></p>");
    Ok(())
}

#[test]
fn test_include_without_src() {
    let loader = MemoryLoader::new().with_template("page", "<include></include>");
    let err = Engine::new(loader).render_template("page", &json!({})).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Directive);
    assert_eq!(err.directive(), Some("<include>"));
}

#[test]
fn test_include_rejects_unknown_directive() {
    let loader = MemoryLoader::new()
        .with_template("page", r#"<include src="card" v-model="title"></include>"#)
        .with_template("card", "<p>card</p>");
    let err = Engine::new(loader).render_template("page", &json!({})).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Directive);
    assert_eq!(err.directive(), Some("v-model"));
    assert_eq!(err.template(), "page");
}
