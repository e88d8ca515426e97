//! One engine shared across threads.

use anyhow::Result;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use vtpl::loader::{FsLoader, TemplateProvider};
use vtpl::render::Engine;
use vtpl::test_utils::SiteFixture;

#[test]
fn test_parallel_renders_are_independent() -> Result<()> {
    let engine = Engine::new(SiteFixture::blog().loader());

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let engine = &engine;
                s.spawn(move || {
                    let title = format!("post-{worker}");
                    let data = json!({"posts": [{"title": title}]});
                    for _ in 0..20 {
                        let html = engine.render_template("index", &data).unwrap();
                        assert!(html.contains(&format!("<h2>{title}</h2>")));
                        assert_eq!(html.matches("<h2>").count(), 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    });
    Ok(())
}

#[test]
fn test_file_loader_parses_each_template_once() -> Result<()> {
    let temp = TempDir::new()?;
    SiteFixture::blog().write_to(temp.path())?;
    let loader = Arc::new(FsLoader::new(temp.path()));
    let engine = Engine::with_provider(loader.clone());

    std::thread::scope(|s| {
        for worker in 0..4 {
            let engine = &engine;
            s.spawn(move || {
                let data = json!({"posts": [{"title": worker}]});
                engine.render_template("index", &data).unwrap();
            });
        }
    });

    // index, layout and card
    assert_eq!(loader.cache().len(), 3);
    assert!(Arc::ptr_eq(&loader.load("card")?, &loader.load("card")?));
    Ok(())
}
