//! The `vtpl` binary.

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use vtpl::test_utils::{SiteFixture, TemplateFixture};

fn vtpl(dir: &TempDir) -> Result<Command> {
    let mut cmd = Command::cargo_bin("vtpl")?;
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    Ok(cmd)
}

fn site() -> Result<TempDir> {
    let temp = TempDir::new()?;
    SiteFixture::blog().write_to(&temp.path().join("templates"))?;
    std::fs::write(
        temp.path().join("data.yaml"),
        "posts:\n  - title: First\n    body: Hello\n",
    )?;
    Ok(temp)
}

#[test]
fn test_render_to_stdout() -> Result<()> {
    let temp = site()?;
    vtpl(&temp)?
        .args(["render", "index", "--templates", "templates", "--data", "data.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<title>Blog</title>"))
        .stdout(predicate::str::contains(r#"<div class="card"><h2>First</h2><p>Hello</p></div>"#));
    Ok(())
}

#[test]
fn test_render_without_layout_to_file() -> Result<()> {
    let temp = site()?;
    vtpl(&temp)?
        .args([
            "render",
            "index",
            "--templates",
            "templates",
            "--data",
            "data.yaml",
            "--no-layout",
            "--output",
            "out.html",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let html = std::fs::read_to_string(temp.path().join("out.html"))?;
    assert!(html.starts_with("<section>"));
    assert!(!html.contains("<html>"));
    Ok(())
}

#[test]
fn test_config_file_is_picked_up() -> Result<()> {
    let temp = site()?;
    std::fs::write(temp.path().join("vtpl.toml"), "template_dir = \"templates\"\nlayouts = false\n")?;

    vtpl(&temp)?
        .args(["render", "index", "--data", "data.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<section>"));
    Ok(())
}

#[test]
fn test_missing_required_prop_fails_with_chain() -> Result<()> {
    let temp = site()?;
    TemplateFixture::simple("broken", r#"<section><include src="card"></include></section>"#)
        .write_to(&temp.path().join("templates"))?;

    vtpl(&temp)?
        .args(["render", "broken", "--templates", "templates"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing required prop 'title' for component 'card'"))
        .stderr(predicate::str::contains("Template: broken"));
    Ok(())
}

#[test]
fn test_missing_template_dir() -> Result<()> {
    let temp = TempDir::new()?;
    vtpl(&temp)?
        .args(["render", "index", "--templates", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Template directory not found"));
    Ok(())
}

#[test]
fn test_invalid_config_is_reported() -> Result<()> {
    let temp = site()?;
    std::fs::write(temp.path().join("vtpl.toml"), "max_depht = 3\n")?;
    vtpl(&temp)?
        .args(["render", "index", "--templates", "templates"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_depht"));
    Ok(())
}

#[test]
fn test_filters_lists_builtins() -> Result<()> {
    let temp = TempDir::new()?;
    vtpl(&temp)?
        .args(["filters", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("upper\n"))
        .stdout(predicate::str::contains("truncate\n"));
    Ok(())
}
