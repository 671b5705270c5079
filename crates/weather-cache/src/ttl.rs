use crate::traits::{CacheEntry, CacheKey, CacheStats, Store};
use bytes::Bytes;
use std::collections::HashMap;
use std::time::Duration;

/// Unbounded TTL store backed by a hash map.
///
/// Entries are only removed when a lookup finds them expired or when
/// `sweep_expired` runs, so long uptimes should pair this with periodic
/// sweeps or use `BoundedStore` instead.
pub struct TtlStore {
    map: HashMap<CacheKey, CacheEntry, ahash::RandomState>,
    hits: u64,
    misses: u64,
    expired_removed: u64,
}

impl TtlStore {
    pub fn new() -> Self {
        Self {
            map: HashMap::default(),
            hits: 0,
            misses: 0,
            expired_removed: 0,
        }
    }
}

impl Default for TtlStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for TtlStore {
    fn lookup(&mut self, key: &CacheKey) -> Option<Bytes> {
        match self.map.get(key) {
            Some(entry) if entry.is_expired() => {
                // Expired entries are indistinguishable from misses to callers
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
        None
    }

    fn name(&self) -> &'static str {
        "TTL"
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: 0,
            expired_removed: self.expired_removed,
            current_size: self.map.len(),
            capacity: None,
        }
    }
}
