//! Directive and interpolation behavior through the public `Engine` API.

use anyhow::Result;
use serde_json::{Value, json};
use vtpl::dom::Document;
use vtpl::filters::{ParamType, Signature};
use vtpl::loader::MemoryLoader;
use vtpl::render::Engine;

fn render(source: &str, data: Value) -> Result<String> {
    vtpl::test_utils::init_test_logging(None);
    Ok(Engine::new(MemoryLoader::new()).render_source("page", source, &data)?)
}

#[test]
fn test_list_rendering() -> Result<()> {
    let html = render(
        r#"<ul><li v-for="item in items">{{ item.title }}</li></ul>"#,
        json!({"items": [{"title": "A"}, {"title": "B"}]}),
    )?;
    assert_eq!(html, "<ul><li>A</li><li>B</li></ul>");
    Ok(())
}

#[test]
fn test_loop_with_index_and_nested_scope() -> Result<()> {
    let html = render(
        r#"<p v-for="(row, i) in rows"><b v-for="cell in row">{{ i }}:{{ cell }}</b></p>"#,
        json!({"rows": [["a", "b"], ["c"]]}),
    )?;
    assert_eq!(html, "<p><b>0:a</b><b>0:b</b></p><p><b>1:c</b></p>");
    Ok(())
}

#[test]
fn test_loop_variable_shadows_and_is_released() -> Result<()> {
    let html = render(
        r#"<i v-for="name in names">{{ name }}</i><b>{{ name }}</b>"#,
        json!({"name": "outer", "names": ["x", "y"]}),
    )?;
    assert_eq!(html, "<i>x</i><i>y</i><b>outer</b>");
    Ok(())
}

#[test]
fn test_mapping_iteration_keeps_insertion_order() -> Result<()> {
    let data: Value = serde_json::from_str(r#"{"env": {"zeta": 1, "alpha": 2, "mid": 3}}"#)?;
    let html = render(r#"<dt v-for="value, key in env">{{ key }}={{ value }}</dt>"#, data)?;
    assert_eq!(html, "<dt>zeta=1</dt><dt>alpha=2</dt><dt>mid=3</dt>");
    Ok(())
}

#[test]
fn test_v_if_prunes_and_v_show_hides() -> Result<()> {
    let html = render(
        r#"<div v-if="flag">A</div><div v-show="flag">B</div>"#,
        json!({"flag": false}),
    )?;
    assert_eq!(html, r#"<div style="display: none">B</div>"#);

    let html = render(
        r#"<div v-if="flag">A</div><div v-show="flag">B</div>"#,
        json!({"flag": true}),
    )?;
    assert_eq!(html, "<div>A</div><div>B</div>");
    Ok(())
}

#[test]
fn test_conditional_chain_picks_first_true_branch() -> Result<()> {
    let source = r#"<p v-if="score >= 90">A</p><p v-else-if="score >= 80">B</p><p v-else-if="score >= 70">C</p><p v-else>F</p>"#;
    for (score, expected) in [(95, "A"), (85, "B"), (70, "C"), (10, "F")] {
        let html = render(source, json!({"score": score}))?;
        assert_eq!(html, format!("<p>{expected}</p>"), "score {score}");
    }
    Ok(())
}

#[test]
fn test_boolean_attribute_binding() -> Result<()> {
    let source = r#"<button :disabled="busy">Go</button>"#;
    assert_eq!(render(source, json!({"busy": true}))?, r#"<button disabled>Go</button>"#);
    assert_eq!(render(source, json!({"busy": false}))?, "<button>Go</button>");
    Ok(())
}

#[test]
fn test_bound_attributes_are_escaped() -> Result<()> {
    let html = render(
        r#"<a v-bind:href="link" :title="tip">x</a>"#,
        json!({"link": "/q?a=1&b=2", "tip": "say \"hi\""}),
    )?;
    assert!(html.contains(r#"href="/q?a=1&amp;b=2""#));
    assert!(html.contains(r#"title="say &quot;hi&quot;""#));
    assert!(!html.contains("v-bind"));
    Ok(())
}

#[test]
fn test_class_binding_merges_with_static_class() -> Result<()> {
    let html = render(
        r#"<li class="item" :class="state">x</li>"#,
        json!({"state": {"active": true, "item": true, "hidden": false}}),
    )?;
    assert_eq!(html, r#"<li class="item active">x</li>"#);
    Ok(())
}

#[test]
fn test_interpolation_escapes_and_v_html_does_not() -> Result<()> {
    let html = render(
        r#"<p>{{ snippet }}</p><div v-html="snippet"></div>"#,
        json!({"snippet": "<em>hi</em>"}),
    )?;
    assert_eq!(html, "<p>&lt;em&gt;hi&lt;/em&gt;</p><div><em>hi</em></div>");
    Ok(())
}

#[test]
fn test_template_wrapper_with_loop() -> Result<()> {
    let html = render(
        r#"<dl><template v-for="term in terms"><dt>{{ term.name }}</dt><dd>{{ term.text }}</dd></template></dl>"#,
        json!({"terms": [{"name": "a", "text": "1"}, {"name": "b", "text": "2"}]}),
    )?;
    assert_eq!(html, "<dl><dt>a</dt><dd>1</dd><dt>b</dt><dd>2</dd></dl>");
    Ok(())
}

#[test]
fn test_builtin_filter_pipeline() -> Result<()> {
    let html = render(
        r#"<p>{{ title | trim | truncate(5) | upper }}</p><p>{{ tags | join(", ") }}</p><p>{{ missing | default("n/a") }}</p>"#,
        json!({"title": "  hello world  ", "tags": ["rust", "html"]}),
    )?;
    assert!(html.starts_with("<p>HELLO"));
    assert!(html.contains("<p>rust, html</p>"));
    assert!(html.ends_with("<p>n/a</p>"));
    Ok(())
}

#[test]
fn test_custom_filter() -> Result<()> {
    let mut engine = Engine::new(MemoryLoader::new());
    engine.register_filter(
        "repeat",
        Signature::new([ParamType::String, ParamType::Integer]),
        |args| {
            let text = args[0].as_str().unwrap_or_default();
            let count = args[1].as_u64().unwrap_or_default() as usize;
            Ok(Value::String(text.repeat(count)))
        },
    );

    let html = engine.render_source("page", r#"<p>{{ word | repeat("3") }}</p>"#, &json!({"word": "ab"}))?;
    assert_eq!(html, "<p>ababab</p>");
    Ok(())
}

#[test]
fn test_script_content_is_left_alone() -> Result<()> {
    let html = render(
        r#"<script>if (a < b) { x = "{{ y }}"; }</script><p>{{ y }}</p>"#,
        json!({"y": 1}),
    )?;
    assert_eq!(html, r#"<script>if (a < b) { x = "{{ y }}"; }</script><p>1</p>"#);
    Ok(())
}

#[test]
fn test_rendering_is_repeatable() -> Result<()> {
    let engine = Engine::new(MemoryLoader::new());
    let document = Document::parse(r#"<p v-for="n in count">{{ n }}</p>"#)?;

    let three = engine.render(&document, &json!({"count": 3}), "doc")?;
    let one = engine.render(&document, &json!({"count": 1}), "doc")?;
    assert_eq!(three.to_html(), "<p>1</p><p>2</p><p>3</p>");
    assert_eq!(one.to_html(), "<p>1</p>");
    Ok(())
}

#[test]
fn test_null_collection_renders_nothing() -> Result<()> {
    let html = render(r#"<ul><li v-for="x in nothing">{{ x }}</li></ul>"#, json!({}))?;
    assert_eq!(html, "<ul></ul>");
    Ok(())
}
