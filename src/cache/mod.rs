//! Flush-on-demand render cache
//!
//! Rendered pages are cached by request path and invalidated only by an
//! explicit flush, triggered by the CMS publish webhook. There is no TTL and
//! no ordering guarantee beyond "flushed entries are refetched on next
//! access".

use std::collections::HashMap;
use std::sync::Mutex;

/// Process-wide cache of rendered pages, keyed by request path
#[derive(Debug, Default)]
pub struct RenderCache {
    entries: Mutex<HashMap<String, String>>,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached HTML for a path, if present
    pub fn get(&self, path: &str) -> Option<String> {
        self.entries.lock().expect("cache lock poisoned").get(path).cloned()
    }

    /// Store rendered HTML for a path
    pub fn insert(&self, path: &str, html: String) {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .insert(path.to_string(), html);
    }

    /// Drop all entries, returning how many were flushed
    pub fn flush(&self) -> usize {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let flushed = entries.len();
        entries.clear();
        flushed
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let cache = RenderCache::new();
        assert!(cache.get("/home").is_none());

        cache.insert("/home", "<html>home</html>".to_string());
        assert_eq!(cache.get("/home").as_deref(), Some("<html>home</html>"));
        assert!(cache.get("/other").is_none());
    }

    #[test]
    fn test_flush_empties_cache() {
        let cache = RenderCache::new();
        cache.insert("/a", "a".to_string());
        cache.insert("/b", "b".to_string());

        assert_eq!(cache.flush(), 2);
        assert!(cache.is_empty());
        assert!(cache.get("/a").is_none());

        // Flushing an empty cache is fine
        assert_eq!(cache.flush(), 0);
    }

    #[test]
    fn test_insert_overwrites() {
        let cache = RenderCache::new();
        cache.insert("/a", "old".to_string());
        cache.insert("/a", "new".to_string());
        assert_eq!(cache.get("/a").as_deref(), Some("new"));
        assert_eq!(cache.len(), 1);
    }
}
