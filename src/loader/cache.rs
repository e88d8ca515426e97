//! Parsed-template cache shared by the template providers.
//!
//! The cache hands out `Arc<Template>` snapshots. A cached template is never
//! mutated; rendering clones the subtrees it rewrites, so concurrent renders
//! can share one entry.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;

use crate::template::Template;

#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: DashMap<String, Arc<Template>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached template for `name`, or parse and insert it.
    ///
    /// Two threads missing on the same name may both run `load`; the first
    /// insert wins and both receive the same snapshot afterwards.
    pub fn get_or_try_insert<E>(
        &self,
        name: &str,
        load: impl FnOnce() -> Result<Template, E>,
    ) -> Result<Arc<Template>, E> {
        if let Some(entry) = self.entries.get(name) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(entry.value()));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let template = Arc::new(load()?);
        let entry = self.entries.entry(name.to_string()).or_insert(template);
        Ok(Arc::clone(entry.value()))
    }

    pub fn invalidate(&self, name: &str) {
        self.entries.remove(name);
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation or the last [`clear`](Self::clear).
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Template, crate::template::TemplateError> {
        Template::parse("t", source)
    }

    #[test]
    fn test_memoizes() {
        let cache = TemplateCache::new();
        let first = cache.get_or_try_insert("t", || parse("<p>1</p>")).unwrap();
        let second = cache.get_or_try_insert("t", || parse("<p>2</p>")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), (1, 1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = TemplateCache::new();
        let result: Result<_, &str> = cache.get_or_try_insert("t", || Err("boom"));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = TemplateCache::new();
        cache.get_or_try_insert("a", || parse("<p></p>")).unwrap();
        cache.get_or_try_insert("b", || parse("<p></p>")).unwrap();
        cache.invalidate("a");
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), (0, 0));
    }
}
