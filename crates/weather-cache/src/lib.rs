//! In-memory TTL cache for serialized weather payloads.
//!
//! The store implementations (`TtlStore`, `BoundedStore`) take `&mut self`
//! and are single-threaded; `SharedStore` wraps any of them behind a lock
//! for use from concurrent connection tasks.

pub mod bounded;
pub mod shared;
pub mod traits;
pub mod ttl;

pub use bounded::BoundedStore;
pub use shared::SharedStore;
pub use traits::{CacheEntry, CacheKey, CacheStats, Store};
pub use ttl::TtlStore;
