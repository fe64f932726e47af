//! lrukit: a fixed-capacity LRU cache built from a chained hash table and an
//! intrusive recency list sharing one slot arena.
//!
//! ```
//! use lrukit::LruCache;
//!
//! let mut cache = LruCache::new(2);
//! cache.set("a", 1);
//! cache.set("b", 2);
//! cache.get(&"a");
//! cache.set("c", 3); // "b" is least recently used
//!
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! ```

pub mod builder;
pub mod ds;
pub mod error;
pub mod events;
pub mod hash;
pub mod metrics;
pub mod policy;
pub mod prelude;
pub mod traits;

pub use builder::{CacheBuilder, CacheConfig};
#[cfg(feature = "concurrency")]
pub use policy::lru::ConcurrentLruCache;
pub use policy::lru::LruCache;
