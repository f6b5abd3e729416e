//! Response caches for the tile client.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Storage for raw tile responses, keyed by URL.
pub trait Cache: Send + Sync {
    fn get(&self, url: &str) -> Option<Arc<[u8]>>;
    fn insert(&self, url: &str, bytes: Arc<[u8]>);
    fn remove(&self, url: &str);
}

/// Cache that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl Cache for NoCache {
    fn get(&self, _url: &str) -> Option<Arc<[u8]>> {
        None
    }

    fn insert(&self, _url: &str, _bytes: Arc<[u8]>) {}

    fn remove(&self, _url: &str) {}
}

/// Unbounded in-memory cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Arc<[u8]>>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Cache for MemoryCache {
    fn get(&self, url: &str) -> Option<Arc<[u8]>> {
        // A poisoned lock only means another request panicked mid-insert;
        // treat it as a miss.
        self.entries.lock().ok()?.get(url).cloned()
    }

    fn insert(&self, url: &str, bytes: Arc<[u8]>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(url.to_owned(), bytes);
        }
    }

    fn remove(&self, url: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_cache_round_trip() {
        let cache = MemoryCache::new();
        assert!(cache.get("a").is_none());
        cache.insert("a", Arc::from(&[1u8, 2, 3][..]));
        assert_eq!(cache.get("a").as_deref(), Some(&[1u8, 2, 3][..]));
        assert_eq!(cache.len(), 1);

        cache.remove("a");
        assert!(cache.get("a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_no_cache_forgets() {
        let cache = NoCache;
        cache.insert("a", Arc::from(&[1u8][..]));
        assert!(cache.get("a").is_none());
    }
}
