//! Error categories, locations and inclusion chains.

use serde_json::json;
use vtpl::config::RenderConfig;
use vtpl::expr::EvalError;
use vtpl::filters::{ParamType, Signature};
use vtpl::loader::{LoadError, MemoryLoader};
use vtpl::render::{Engine, ErrorCategory, RenderErrorKind};

#[test]
fn test_filter_type_mismatch_is_reported_with_location() {
    let mut engine = Engine::new(MemoryLoader::new().with_template("list", "<p>{{ items | double }}</p>"));
    engine.register_filter("double", Signature::new([ParamType::Number]), |args| {
        Ok(vtpl::value::number(args[0].as_f64().unwrap_or_default() * 2.0))
    });

    let err = engine.render_template("list", &json!({"items": [1, 2]})).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Resolution);
    assert_eq!(err.template(), "list");
    assert_eq!(err.directive(), Some("{{ }}"));
    assert_eq!(err.expression(), Some("items | double"));
    assert!(matches!(
        err.kind(),
        RenderErrorKind::Eval(EvalError::ArgumentType { .. })
    ));
}

#[test]
fn test_unknown_filter_suggests_close_name() {
    let engine = Engine::new(MemoryLoader::new());
    let err = engine.render_source("page", "<p>{{ name | uper }}</p>", &json!({})).unwrap_err();
    assert!(err.to_string().contains("did you mean 'upper'?"), "{err}");
}

#[test]
fn test_parse_error_category() {
    let engine = Engine::new(MemoryLoader::new());
    let err = engine.render_source("page", r#"<p v-if="a &&">x</p>"#, &json!({})).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Parse);
    assert_eq!(err.directive(), Some("v-if"));
}

#[test]
fn test_not_iterable() {
    let engine = Engine::new(MemoryLoader::new());
    let err = engine.render_source("page", r#"<p v-for="x in flag">x</p>"#, &json!({"flag": true})).unwrap_err();
    assert!(matches!(
        err.kind(),
        RenderErrorKind::Eval(EvalError::NotIterable { found: "bool" })
    ));
    assert_eq!(err.directive(), Some("v-for"));
}

#[test]
fn test_malformed_loop_header() {
    let engine = Engine::new(MemoryLoader::new());
    let err = engine.render_source("page", r#"<p v-for="items">x</p>"#, &json!({})).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Directive);
}

#[test]
fn test_unknown_directive_is_rejected() {
    let engine = Engine::new(MemoryLoader::new());
    let err = engine.render_source("page", r#"<p v-model="x">x</p>"#, &json!({})).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Directive);
    assert_eq!(err.directive(), Some("v-model"));
}

#[test]
fn test_inclusion_chain_three_deep() {
    let loader = MemoryLoader::new()
        .with_template("page", r#"<include src="section"></include>"#)
        .with_template("section", r#"<div><include src="item"></include></div>"#)
        .with_template("item", r#"<p v-else>x</p>"#);
    let err = Engine::new(loader).render_template("page", &json!({})).unwrap_err();

    assert_eq!(err.inclusion_chain(), vec!["page", "section", "item"]);
    assert_eq!(err.template(), "item");
    assert_eq!(err.directive(), Some("v-else"));
    assert_eq!(
        err.to_string(),
        "template 'item', v-else: v-else without a preceding v-if or v-else-if\n  \
         included from 'section'\n  included from 'page'"
    );

    let report = err.format_with_context();
    assert!(report.contains("Inclusion chain:\npage\n  └─ section\n    └─ item  <- error occurred here\n"));
}

#[test]
fn test_recursive_include_hits_depth_limit() {
    let loader = MemoryLoader::new().with_template("loop", r#"<b><include src="loop"></include></b>"#);
    let engine = Engine::new(loader).with_config(RenderConfig {
        max_depth: 5,
        ..RenderConfig::default()
    });

    let err = engine.render_template("loop", &json!({})).unwrap_err();
    assert!(matches!(err.kind(), RenderErrorKind::DepthExceeded { limit: 5 }));
    assert_eq!(err.category(), ErrorCategory::Resource);
    assert_eq!(err.inclusion_chain().len(), 6);
}

#[test]
fn test_missing_include_target() {
    let loader = MemoryLoader::new().with_template("page", r#"<include src="ghost"></include>"#);
    let err = Engine::new(loader).render_template("page", &json!({})).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Load);
    assert!(matches!(
        err.kind(),
        RenderErrorKind::Load(LoadError::NotFound { name }) if name == "ghost"
    ));
}

#[test]
fn test_missing_top_level_template() {
    let err = Engine::new(MemoryLoader::new()).render_template("nope", &json!({})).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Load);
    assert_eq!(err.template(), "nope");
    assert!(err.inclusion_chain() == vec!["nope"]);
}
