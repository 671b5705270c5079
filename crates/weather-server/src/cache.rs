use bytes::Bytes;
use std::time::Duration;
use weather_cache::{BoundedStore, CacheKey, CacheStats, SharedStore, Store, TtlStore};

/// Type-erased store selected from config: unbounded, or capacity-bounded
/// with oldest-expiry-first eviction.
pub enum StoreKind {
    Unbounded(TtlStore),
    Bounded(BoundedStore),
}

impl StoreKind {
    pub fn from_capacity(capacity: usize) -> Self {
        if capacity == 0 {
            StoreKind::Unbounded(TtlStore::new())
        } else {
            StoreKind::Bounded(BoundedStore::new(capacity))
        }
    }
}

impl Store for StoreKind {
    fn lookup(&mut self, key: &CacheKey) -> Option<Bytes> {
        match self {
            StoreKind::Unbounded(s) => s.lookup(key),
            StoreKind::Bounded(s) => s.lookup(key),
        }
    }

    fn store(&mut self, key: CacheKey, payload: Bytes, ttl: Duration) {
        match self {
            StoreKind::Unbounded(s) => s.store(key, payload, ttl),
            StoreKind::Bounded(s) => s.store(key, payload, ttl),
        }
    }

    fn sweep_expired(&mut self) -> usize {
        match self {
            StoreKind::Unbounded(s) => s.sweep_expired(),
            StoreKind::Bounded(s) => s.sweep_expired(),
        }
    }

    fn remove(&mut self, key: &CacheKey) -> bool {
        match self {
            StoreKind::Unbounded(s) => s.remove(key),
            StoreKind::Bounded(s) => s.remove(key),
        }
    }

    fn len(&self) -> usize {
        match self {
            StoreKind::Unbounded(s) => s.len(),
            StoreKind::Bounded(s) => s.len(),
        }
    }

    fn capacity(&self) -> Option<usize> {
        match self {
            StoreKind::Unbounded(s) => s.capacity(),
            StoreKind::Bounded(s) => s.capacity(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            StoreKind::Unbounded(s) => s.name(),
            StoreKind::Bounded(s) => s.name(),
        }
    }

    fn stats(&self) -> CacheStats {
        match self {
            StoreKind::Unbounded(s) => s.stats(),
            StoreKind::Bounded(s) => s.stats(),
        }
    }
}

pub type Cache = SharedStore<StoreKind>;

pub fn build_cache(capacity: usize) -> Cache {
    let store = StoreKind::from_capacity(capacity);
    tracing::info!(kind = store.name(), capacity, "cache initialized");
    SharedStore::new(store)
}
