//! In-memory TTL cache backed by `DashMap` for concurrent access, bounded by LRU eviction.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Default maximum number of entries.
pub const DEFAULT_CAPACITY: usize = 1024;

/// A single cached value with the time it was stored.
struct CacheEntry {
    value: String,
    stored_at: Instant,
    /// Logical clock value of the most recent read or write.
    last_access: AtomicU64,
}

/// Thread-safe in-memory cache with caller-supplied time-to-live.
///
/// Entries are stored as serialized JSON strings. The TTL is a property of
/// the query kind, so it is passed to [`MemoryCache::get`] rather than fixed
/// per cache. Staleness is checked lazily on read: a stale entry is dropped
/// and reported as a miss. Inserting a new key while the cache is full evicts
/// the least-recently-used entry.
///
/// Time is read from `tokio::time`, so tests can drive it with a paused clock.
pub struct MemoryCache {
    store: DashMap<String, CacheEntry>,
    capacity: usize,
    clock: AtomicU64,
}

impl MemoryCache {
    /// Creates a new cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            store: DashMap::new(),
            capacity: capacity.max(1),
            clock: AtomicU64::new(0),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns the cached value for `key` if it was stored less than `ttl` ago.
    pub fn get(&self, key: &str, ttl: Duration) -> Option<String> {
        let entry = self.store.get(key)?;
        if entry.stored_at.elapsed() >= ttl {
            drop(entry);
            self.remove_if_stale(key, ttl);
            return None;
        }
        entry.last_access.store(self.tick(), Ordering::Relaxed);
        Some(entry.value.clone())
    }

    /// Drops `key` only if the entry is still stale under the shard lock, so a
    /// value written after the stale read survives.
    fn remove_if_stale(&self, key: &str, ttl: Duration) {
        self.store.remove_if(key, |_, entry| entry.stored_at.elapsed() >= ttl);
    }

    /// Inserts or overwrites a cache entry, stamping it with the current time.
    pub fn set(&self, key: String, value: String) {
        if !self.store.contains_key(&key) && self.store.len() >= self.capacity {
            self.evict_lru();
        }
        self.store.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
                last_access: AtomicU64::new(self.tick()),
            },
        );
    }

    fn evict_lru(&self) {
        let victim = self
            .store
            .iter()
            .min_by_key(|e| e.value().last_access.load(Ordering::Relaxed))
            .map(|e| e.key().clone());
        if let Some(key) = victim {
            tracing::debug!("cache full ({} entries), evicting {}", self.capacity, key);
            self.store.remove(&key);
        }
    }

    /// Number of entries currently held, stale ones included.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes all entries from the cache.
    pub fn clear(&self) {
        self.store.clear();
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn cache_set_and_get() {
        let cache = MemoryCache::new(8);
        cache.set("key1".to_string(), "value1".to_string());
        assert_eq!(cache.get("key1", TTL), Some("value1".to_string()));
    }

    #[test]
    fn cache_miss() {
        let cache = MemoryCache::new(8);
        assert_eq!(cache.get("nonexistent", TTL), None);
    }

    #[tokio::test]
    async fn cache_expiration() {
        tokio::time::pause();

        let cache = MemoryCache::new(8);
        cache.set("key1".to_string(), "value1".to_string());

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get("key1", TTL), Some("value1".to_string()));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("key1", TTL), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn ttl_is_chosen_by_reader() {
        tokio::time::pause();

        let cache = MemoryCache::new(8);
        cache.set("chart:AAPL:1d".to_string(), "bars".to_string());
        tokio::time::advance(Duration::from_secs(90)).await;

        assert_eq!(
            cache.get("chart:AAPL:1d", Duration::from_secs(3600)),
            Some("bars".to_string())
        );
        assert_eq!(cache.get("chart:AAPL:1d", Duration::from_secs(60)), None);
    }

    #[tokio::test]
    async fn overwrite_restarts_ttl() {
        tokio::time::pause();

        let cache = MemoryCache::new(8);
        cache.set("k".to_string(), "old".to_string());
        tokio::time::advance(Duration::from_secs(50)).await;
        cache.set("k".to_string(), "new".to_string());
        tokio::time::advance(Duration::from_secs(50)).await;

        assert_eq!(cache.get("k", TTL), Some("new".to_string()));
    }

    #[tokio::test]
    async fn stale_cleanup_keeps_a_fresh_rewrite() {
        tokio::time::pause();

        let cache = MemoryCache::new(8);
        cache.set("k".to_string(), "old".to_string());
        tokio::time::advance(TTL).await;

        // Another writer lands between the stale read and its cleanup.
        cache.set("k".to_string(), "new".to_string());
        cache.remove_if_stale("k", TTL);

        assert_eq!(cache.get("k", TTL), Some("new".to_string()));
    }

    #[tokio::test]
    async fn stale_cleanup_removes_expired_entry() {
        tokio::time::pause();

        let cache = MemoryCache::new(8);
        cache.set("k".to_string(), "old".to_string());
        tokio::time::advance(TTL).await;
        cache.remove_if_stale("k", TTL);

        assert!(cache.is_empty());
    }

    #[test]
    fn cache_overwrite() {
        let cache = MemoryCache::new(8);
        cache.set("key1".to_string(), "old".to_string());
        cache.set("key1".to_string(), "new".to_string());
        assert_eq!(cache.get("key1", TTL), Some("new".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = MemoryCache::new(2);
        cache.set("a".to_string(), "1".to_string());
        cache.set("b".to_string(), "2".to_string());

        // Touch "a" so "b" becomes the oldest.
        assert!(cache.get("a", TTL).is_some());
        cache.set("c".to_string(), "3".to_string());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("b", TTL), None);
        assert_eq!(cache.get("a", TTL), Some("1".to_string()));
        assert_eq!(cache.get("c", TTL), Some("3".to_string()));
    }

    #[test]
    fn overwrite_at_capacity_does_not_evict() {
        let cache = MemoryCache::new(2);
        cache.set("a".to_string(), "1".to_string());
        cache.set("b".to_string(), "2".to_string());
        cache.set("a".to_string(), "updated".to_string());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("b", TTL), Some("2".to_string()));
    }

    #[test]
    fn zero_capacity_still_holds_one() {
        let cache = MemoryCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.set("a".to_string(), "1".to_string());
        cache.set("b".to_string(), "2".to_string());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b", TTL), Some("2".to_string()));
    }

    #[test]
    fn cache_clear() {
        let cache = MemoryCache::new(8);
        cache.set("a".to_string(), "1".to_string());
        cache.set("b".to_string(), "2".to_string());
        cache.clear();
        assert_eq!(cache.get("a", TTL), None);
        assert_eq!(cache.get("b", TTL), None);
    }
}
