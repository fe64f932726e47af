//! # Cache Traits
//!
//! Policy-neutral interfaces implemented by [`LruCache`](crate::LruCache), so
//! host code can be written against a trait instead of the concrete type.
//!
//! ```text
//!   ┌─────────────────────────────────────────┐
//!   │            CoreCache<K, V>              │
//!   │  insert(&mut, K, V) → Option<V>         │
//!   │  get(&mut, &K) → Option<&V>             │
//!   │  contains(&, &K) → bool                 │
//!   │  len / is_empty / capacity / clear      │
//!   └──────────────────┬──────────────────────┘
//!                      ▼
//!   ┌─────────────────────────────────────────┐
//!   │          MutableCache<K, V>             │
//!   │  remove(&K) → Option<V>                 │
//!   │  remove_batch(&[K]) → Vec<Option<V>>    │
//!   └──────────────────┬──────────────────────┘
//!                      ▼
//!   ┌─────────────────────────────────────────┐
//!   │          LruCacheTrait<K, V>            │
//!   │  pop_lru() → (K, V)                     │
//!   │  peek_lru() → (&K, &V)                  │
//!   │  touch(&K) → bool                       │
//!   │  recency_rank(&K) → usize               │
//!   └─────────────────────────────────────────┘
//! ```
//!
//! `ConcurrentCache` is a marker for caches that are safe to share between
//! threads without external locking.
//!
//! The inherent methods on `LruCache` are more general (borrowed lookups via
//! `Q`, `set` returning whether the key was new); the trait methods take `&K`.
//!
//! ## Example
//!
//! ```
//! use lrukit::LruCache;
//! use lrukit::traits::{CoreCache, LruCacheTrait, MutableCache};
//!
//! fn warm<C: CoreCache<u32, String>>(cache: &mut C, ids: &[u32]) {
//!     for &id in ids {
//!         cache.insert(id, format!("row-{id}"));
//!     }
//! }
//!
//! let mut cache = LruCache::new(2);
//! warm(&mut cache, &[1, 2, 3]);
//!
//! assert!(!CoreCache::contains(&cache, &1));
//! assert_eq!(LruCacheTrait::peek_lru(&cache).map(|(k, _)| *k), Some(2));
//! assert_eq!(MutableCache::remove(&mut cache, &3), Some("row-3".to_string()));
//! ```

/// Operations every cache supports.
pub trait CoreCache<K, V> {
    /// Inserts a key-value pair, returning the previous value if the key was
    /// already present.
    ///
    /// When a new key pushes the cache over capacity, an entry is evicted
    /// according to the cache's policy.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Gets a reference to a value by key.
    ///
    /// May update eviction order. Use [`contains`](Self::contains) to test
    /// for presence without side effects.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Checks if a key exists without updating access state.
    fn contains(&self, key: &K) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries held at once.
    fn capacity(&self) -> usize;

    fn clear(&mut self);
}

/// Caches that support removal of arbitrary keys.
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Removes a key, returning its value if it was present.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Removes several keys. Results are in input order.
    fn remove_batch(&mut self, keys: &[K]) -> Vec<Option<V>> {
        keys.iter().map(|k| self.remove(k)).collect()
    }
}

/// Recency-ordered caches.
pub trait LruCacheTrait<K, V>: MutableCache<K, V> {
    /// Removes and returns the least recently used entry.
    ///
    /// ```
    /// use lrukit::LruCache;
    /// use lrukit::traits::{CoreCache, LruCacheTrait};
    ///
    /// let mut cache = LruCache::new(10);
    /// CoreCache::insert(&mut cache, 1, "first");
    /// CoreCache::insert(&mut cache, 2, "second");
    ///
    /// assert_eq!(LruCacheTrait::pop_lru(&mut cache), Some((1, "first")));
    /// ```
    fn pop_lru(&mut self) -> Option<(K, V)>;

    /// Peeks at the least recently used entry without promoting it.
    fn peek_lru(&self) -> Option<(&K, &V)>;

    /// Marks an entry as most recently used without reading it.
    ///
    /// Returns `false` when the key is absent.
    fn touch(&mut self, key: &K) -> bool;

    /// Position in recency order: 0 is the most recently used.
    ///
    /// ```
    /// use lrukit::LruCache;
    /// use lrukit::traits::LruCacheTrait;
    ///
    /// let mut cache = LruCache::new(10);
    /// cache.set(1, "a");
    /// cache.set(2, "b");
    /// cache.set(3, "c");
    ///
    /// assert_eq!(LruCacheTrait::recency_rank(&cache, &3), Some(0));
    /// assert_eq!(LruCacheTrait::recency_rank(&cache, &1), Some(2));
    /// assert_eq!(LruCacheTrait::recency_rank(&cache, &99), None);
    /// ```
    fn recency_rank(&self, key: &K) -> Option<usize>;
}

/// Marker for caches that can be shared across threads as-is.
pub trait ConcurrentCache: Send + Sync {}
