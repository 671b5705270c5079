use crate::traits::{CacheKey, CacheStats, Store};
use bytes::Bytes;
use parking_lot::RwLock;
use std::time::Duration;

/// Thread-safe wrapper around a `Store`.
///
/// A single `RwLock` guards the whole store, so a lookup observes either the
/// fully-old or fully-new entry for a key, never a torn mix. Payloads are
/// handed out as owned copies and stay valid after concurrent eviction.
pub struct SharedStore<T: Store> {
    inner: RwLock<T>,
    name: &'static str,
}

impl<T: Store> SharedStore<T> {
    pub fn new(inner: T) -> Self {
        let name = inner.name();
        Self {
            inner: RwLock::new(inner),
            name,
        }
    }

    /// Lookups mutate hit/miss counters and drop expired entries, so a write
    /// lock is taken even on the read path.
    pub fn lookup(&self, key: &CacheKey) -> Option<Bytes> {
        self.inner.write().lookup(key)
    }

    pub fn store(&self, key: CacheKey, payload: Bytes, ttl: Duration) {
        self.inner.write().store(key, payload, ttl);
    }

    pub fn sweep_expired(&self) -> usize {
        self.inner.write().sweep_expired()
    }

    pub fn remove(&self, key: &CacheKey) -> bool {
        self.inner.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.read().stats()
    }
}

// SharedStore is Sync as long as the inner store is Send
unsafe impl<T: Store> Sync for SharedStore<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounded::BoundedStore;
    use crate::ttl::TtlStore;
    use std::sync::Arc;
    use std::thread;

    fn key(city: &str) -> CacheKey {
        CacheKey::new(city, "SE")
    }

    #[test]
    fn shared_ttl_basic() {
        let store = SharedStore::new(TtlStore::new());
        store.store(key("Stockholm"), Bytes::from_static(b"data"), Duration::from_secs(60));

        assert!(store.lookup(&key("Stockholm")).is_some());
        assert!(store.lookup(&key("missing")).is_none());
        assert_eq!(store.name(), "TTL");
    }

    #[test]
    fn expiry_through_shared() {
        let store = SharedStore::new(TtlStore::new());
        store.store(key("short"), Bytes::from_static(b"data"), Duration::from_millis(20));

        assert!(store.lookup(&key("short")).is_some());
        thread::sleep(Duration::from_millis(60));
        assert!(store.lookup(&key("short")).is_none());
    }

    #[test]
    fn overwrite_resets_expiry() {
        let store = SharedStore::new(TtlStore::new());
        store.store(key("city"), Bytes::from_static(b"v1"), Duration::from_millis(200));
        thread::sleep(Duration::from_millis(120));

        // Second store restarts the clock; the entry outlives the first window
        store.store(key("city"), Bytes::from_static(b"v2"), Duration::from_millis(200));
        thread::sleep(Duration::from_millis(120));
        assert_eq!(store.lookup(&key("city")), Some(Bytes::from_static(b"v2")));

        thread::sleep(Duration::from_millis(150));
        assert!(store.lookup(&key("city")).is_none());
    }

    #[test]
    fn concurrent_access() {
        let store = Arc::new(SharedStore::new(BoundedStore::new(256)));

        let mut handles = vec![];
        for t in 0..8 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for i in 0..500 {
                    let k = key(&format!("city-{}", (t * 500 + i) % 300));
                    if i % 3 == 0 {
                        store.store(k, Bytes::from_static(b"data"), Duration::from_secs(60));
                    } else {
                        store.lookup(&k);
                    }
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert!(store.len() <= 256);
        let stats = store.stats();
        assert!(stats.hits + stats.misses > 0);
    }

    #[test]
    fn is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedStore<TtlStore>>();
        assert_send_sync::<SharedStore<BoundedStore>>();
    }
}
