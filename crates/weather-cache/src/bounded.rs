use crate::traits::{CacheEntry, CacheKey, CacheStats, Store};
use bytes::Bytes;
use std::collections::HashMap;
use std::time::Duration;

/// Capacity-bounded TTL store.
///
/// When full, inserting a new key evicts the entry closest to expiry
/// (oldest-expiry-first). Overwriting an existing key never evicts.
pub struct BoundedStore {
    map: HashMap<CacheKey, CacheEntry, ahash::RandomState>,
    capacity: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
    expired_removed: u64,
}

impl BoundedStore {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "cache capacity must be > 0");
        Self {
            map: HashMap::with_capacity_and_hasher(capacity, ahash::RandomState::default()),
            capacity,
            hits: 0,
            misses: 0,
            evictions: 0,
            expired_removed: 0,
        }
    }

    /// Evict the entry with the earliest expiry. Expired entries are the
    /// first to go since their `expires_at` is already in the past.
    fn evict_one(&mut self) {
        let victim = self
            .map
            .iter()
            .min_by_key(|(_, entry)| entry.expires_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = victim {
            self.map.remove(&key);
            self.evictions += 1;
            tracing::debug!(key = %key, "evicted cache entry at capacity");
        }
    }
}

impl Store for BoundedStore {
    fn lookup(&mut self, key: &CacheKey) -> Option<Bytes> {
        match self.map.get(key) {
            Some(entry) if entry.is_expired() => {
                self.map.remove(key);
                self.misses += 1;
                self.expired_removed += 1;
                None
            }
            Some(entry) => {
                self.hits += 1;
                Some(entry.payload.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    fn store(&mut self, key: CacheKey, payload: Bytes, ttl: Duration) {
        while !self.map.contains_key(&key) && self.map.len() >= self.capacity {
            self.evict_one();
        }
        self.map.insert(key, CacheEntry::new(payload, ttl));
    }

    fn sweep_expired(&mut self) -> usize {
        let before = self.map.len();
        self.map.retain(|_, entry| !entry.is_expired());
        let removed = before - self.map.len();
        self.expired_removed += removed as u64;
        removed
    }

    fn remove(&mut self, key: &CacheKey) -> bool {
        self.map.remove(key).is_some()
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.capacity)
    }

    fn name(&self) -> &'static str {
        "bounded"
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            expired_removed: self.expired_removed,
            current_size: self.map.len(),
            capacity: Some(self.capacity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(city: &str) -> CacheKey {
        CacheKey::new(city, "SE")
    }

    fn payload() -> Bytes {
        Bytes::from_static(b"data")
    }

    #[test]
    fn basic_store_and_lookup() {
        let mut store = BoundedStore::new(4);
        store.store(key("Stockholm"), payload(), Duration::from_secs(60));

        assert!(store.lookup(&key("Stockholm")).is_some());
        assert!(store.lookup(&key("Oslo")).is_none());
    }

    #[test]
    fn evicts_oldest_expiry_first() {
        let mut store = BoundedStore::new(2);
        store.store(key("keep"), payload(), Duration::from_secs(100));
        store.store(key("victim"), payload(), Duration::from_secs(50));

        store.store(key("new"), payload(), Duration::from_secs(100));

        assert!(store.lookup(&key("keep")).is_some());
        assert!(store.lookup(&key("victim")).is_none());
        assert!(store.lookup(&key("new")).is_some());
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn overwrite_does_not_evict() {
        let mut store = BoundedStore::new(2);
        store.store(key("a"), payload(), Duration::from_secs(60));
        store.store(key("b"), payload(), Duration::from_secs(60));
        store.store(key("a"), payload(), Duration::from_secs(60));

        assert_eq!(store.len(), 2);
        assert!(store.lookup(&key("a")).is_some());
        assert!(store.lookup(&key("b")).is_some());
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut store = BoundedStore::new(3);
        for i in 0..20 {
            store.store(key(&format!("city-{i}")), payload(), Duration::from_secs(60));
        }
        assert!(store.len() <= 3);
        assert_eq!(store.stats().evictions, 17);
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn zero_capacity_rejected() {
        BoundedStore::new(0);
    }
}
