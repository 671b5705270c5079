use bytes::Bytes;
use std::fmt;
use std::time::{Duration, Instant};

/// Composite lookup key: city name plus country code.
///
/// Matching is exact — no case folding, no whitespace trimming. "Stockholm"
/// and "stockholm" are distinct entries.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub city: String,
    pub country: String,
}

impl CacheKey {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.city, self.country)
    }
}

/// A cached payload with its expiry window.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub payload: Bytes,
    pub created_at: Instant,
    pub expires_at: Instant,
}

impl CacheEntry {
    /// A zero TTL is clamped to one second so `expires_at > created_at`
    /// always holds.
    pub fn new(payload: Bytes, ttl: Duration) -> Self {
        let ttl = if ttl.is_zero() {
            tracing::warn!("zero TTL clamped to 1s");
            Duration::from_secs(1)
        } else {
            ttl
        };
        let created_at = Instant::now();
        Self {
            payload,
            created_at,
            expires_at: created_at + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Snapshot of store statistics.
#[derive(Clone, Debug, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expired_removed: u64,
    pub current_size: usize,
    pub capacity: Option<usize>,
}

/// Common interface for the cache store implementations.
///
/// All methods take `&mut self` — thread safety is handled by `SharedStore`.
pub trait Store: Send {
    /// Look up a key. Returns an owned copy of the payload only if the entry
    /// exists and has not expired. An expired entry is removed and the
    /// lookup counts as a miss.
    fn lookup(&mut self, key: &CacheKey) -> Option<Bytes>;

    /// Insert or overwrite the entry for `key`. Overwriting resets the
    /// expiry relative to now.
    fn store(&mut self, key: CacheKey, payload: Bytes, ttl: Duration);

    /// Remove all entries past their expiry. Returns the number removed.
    fn sweep_expired(&mut self) -> usize;

    /// Remove a key explicitly.
    fn remove(&mut self, key: &CacheKey) -> bool;

    /// Number of entries currently in the store.
    fn len(&self) -> usize;

    /// Whether the store is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries, if bounded.
    fn capacity(&self) -> Option<usize>;

    /// Human-readable name of the store implementation.
    fn name(&self) -> &'static str;

    /// Current statistics snapshot.
    fn stats(&self) -> CacheStats;
}
