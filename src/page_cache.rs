use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};

/// Rendered pages by route, served stale while a regeneration runs.
pub struct PageCache {
    pages: RwLock<HashMap<String, CachedPage>>,
    regenerating: Mutex<HashSet<String>>,
}

struct CachedPage {
    stale_after: DateTime<Utc>,
    body: Arc<String>,
}

#[derive(Debug, PartialEq)]
pub enum Lookup {
    Fresh(Arc<String>),
    Stale(Arc<String>),
    Missing,
}

impl PageCache {
    pub fn new() -> Self {
        PageCache {
            pages: RwLock::new(HashMap::new()),
            regenerating: Mutex::new(HashSet::new()),
        }
    }

    pub fn home_key(pages: u32) -> String {
        format!("home-{}", pages)
    }

    pub fn post_key(uid: &str) -> String {
        format!("post-{}", uid)
    }

    pub fn lookup(&self, key: &str) -> Lookup {
        self.lookup_at(key, Utc::now())
    }

    fn lookup_at(&self, key: &str, now: DateTime<Utc>) -> Lookup {
        let pages = self.pages.read().unwrap_or_else(PoisonError::into_inner);
        match pages.get(key) {
            None => Lookup::Missing,
            Some(page) if now >= page.stale_after => Lookup::Stale(page.body.clone()),
            Some(page) => Lookup::Fresh(page.body.clone()),
        }
    }

    pub fn store(&self, key: &str, body: String, revalidate: Duration) -> Arc<String> {
        let body = Arc::new(body);
        let mut pages = self.pages.write().unwrap_or_else(PoisonError::into_inner);
        pages.insert(key.to_string(), CachedPage {
            stale_after: Utc::now() + revalidate,
            body: body.clone(),
        });
        body
    }

    pub fn remove(&self, key: &str) {
        let mut pages = self.pages.write().unwrap_or_else(PoisonError::into_inner);
        pages.remove(key);
    }

    /// Claims the regeneration of `key`. Returns false when one is already running.
    pub fn begin_regeneration(&self, key: &str) -> bool {
        let mut regenerating = self.regenerating.lock().unwrap_or_else(PoisonError::into_inner);
        regenerating.insert(key.to_string())
    }

    pub fn end_regeneration(&self, key: &str) {
        let mut regenerating = self.regenerating.lock().unwrap_or_else(PoisonError::into_inner);
        regenerating.remove(key);
    }
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key() {
        let cache = PageCache::new();
        assert_eq!(cache.lookup("home-1"), Lookup::Missing);
    }

    #[test]
    fn test_fresh_then_stale() {
        let cache = PageCache::new();
        let stored = cache.store("post-a", "<h1>A</h1>".to_string(), Duration::minutes(30));
        assert_eq!(Arc::strong_count(&stored), 2);

        assert_eq!(cache.lookup("post-a"), Lookup::Fresh(Arc::new("<h1>A</h1>".to_string())));

        let later = Utc::now() + Duration::minutes(31);
        assert_eq!(cache.lookup_at("post-a", later), Lookup::Stale(Arc::new("<h1>A</h1>".to_string())));
    }

    #[test]
    fn test_store_replaces_body() {
        let cache = PageCache::new();
        cache.store("home-1", "old".to_string(), Duration::seconds(-1));
        assert!(matches!(cache.lookup("home-1"), Lookup::Stale(_)));

        cache.store("home-1", "new".to_string(), Duration::hours(24));
        assert_eq!(cache.lookup("home-1"), Lookup::Fresh(Arc::new("new".to_string())));

        cache.store("home-1", "now".to_string(), Duration::zero());
        assert!(matches!(cache.lookup("home-1"), Lookup::Stale(_)));

        cache.remove("home-1");
        assert_eq!(cache.lookup("home-1"), Lookup::Missing);
    }

    #[test]
    fn test_single_regeneration_per_key() {
        let cache = PageCache::new();
        assert!(cache.begin_regeneration("post-a"));
        assert!(!cache.begin_regeneration("post-a"));
        assert!(cache.begin_regeneration("post-b"));

        cache.end_regeneration("post-a");
        assert!(cache.begin_regeneration("post-a"));
    }

    #[test]
    fn test_keys() {
        assert_eq!(PageCache::home_key(2), "home-2");
        assert_eq!(PageCache::post_key("abc"), "post-abc");
    }
}
