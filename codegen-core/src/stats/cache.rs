//! Short-lived cache for ledger aggregates
//!
//! Entries expire after a fixed TTL and are never invalidated by writes, so a
//! reader may see a value up to one TTL old.

use crate::history::HistoryRecord;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Total,
    Successful,
    AllHistory,
    /// Language folded to lowercase
    ByLanguage(String),
}

impl CacheKey {
    pub fn by_language(language: &str) -> Self {
        Self::ByLanguage(language.to_ascii_lowercase())
    }
}

#[derive(Debug, Clone)]
pub enum CachedValue {
    Count(u64),
    Records(Arc<Vec<HistoryRecord>>),
}

#[derive(Debug)]
struct Entry {
    value: CachedValue,
    stored_at: Instant,
}

/// Concurrent key → aggregate map with per-entry expiry
#[derive(Debug)]
pub struct StatsCache {
    ttl: Duration,
    entries: DashMap<CacheKey, Entry>,
}

impl StatsCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: DashMap::new() }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, dropping it if it has expired
    pub fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        let now = Instant::now();
        let hit = self
            .entries
            .get(key)
            .filter(|entry| now.duration_since(entry.stored_at) < self.ttl)
            .map(|entry| entry.value.clone());

        // The read guard above is released before touching the shard again
        if hit.is_none() {
            self.entries.remove_if(key, |_, entry| now.duration_since(entry.stored_at) >= self.ttl);
        } else {
            trace!("Stats cache hit for {:?}", key);
        }
        hit
    }

    /// Store `value`, sweeping out every entry that has already expired
    pub fn insert(&self, key: CacheKey, value: CachedValue) {
        if self.ttl.is_zero() {
            return;
        }
        let now = Instant::now();
        self.entries.retain(|_, entry| now.duration_since(entry.stored_at) < self.ttl);
        self.entries.insert(key, Entry { value, stored_at: now });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_within_ttl() {
        let cache = StatsCache::new(Duration::from_secs(60));
        cache.insert(CacheKey::Total, CachedValue::Count(7));

        assert!(matches!(cache.get(&CacheKey::Total), Some(CachedValue::Count(7))));
        assert!(cache.get(&CacheKey::Successful).is_none());
    }

    #[test]
    fn test_language_keys_fold_case() {
        assert_eq!(CacheKey::by_language("Java"), CacheKey::by_language("JAVA"));
        assert_ne!(CacheKey::by_language("Java"), CacheKey::by_language("JavaScript"));
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let cache = StatsCache::new(Duration::from_millis(20));
        cache.insert(CacheKey::Total, CachedValue::Count(1));
        std::thread::sleep(Duration::from_millis(40));

        assert!(cache.get(&CacheKey::Total).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_sweeps_expired_keys() {
        let cache = StatsCache::new(Duration::from_millis(10));
        for i in 0..1000 {
            cache.insert(CacheKey::by_language(&format!("lang-{i}")), CachedValue::Count(i));
        }
        assert_eq!(cache.len(), 1000);
        std::thread::sleep(Duration::from_millis(30));

        cache.insert(CacheKey::Total, CachedValue::Count(1));
        assert!(matches!(cache.get(&CacheKey::Total), Some(CachedValue::Count(1))));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_ttl_disables_caching() {
        let cache = StatsCache::new(Duration::ZERO);
        cache.insert(CacheKey::Total, CachedValue::Count(1));
        assert!(cache.is_empty());
    }
}
