//! Cache construction from a validated configuration.
//!
//! [`CacheConfig`] holds the sizing parameters; [`CacheBuilder`] layers the
//! event listeners on top and produces an [`LruCache`] (or, with the
//! `concurrency` feature, a [`ConcurrentLruCache`]).
//!
//! ## Example
//!
//! ```rust
//! use lrukit::builder::CacheBuilder;
//!
//! let mut cache = CacheBuilder::new(100)
//!     .bucket_count(64)
//!     .tracing()
//!     .build();
//! cache.set(1u64, "hello".to_string());
//! assert_eq!(cache.get(&1), Some(&"hello".to_string()));
//! assert_eq!(cache.bucket_count(), 64);
//! ```
//!
//! [`ConcurrentLruCache`]: crate::policy::lru::ConcurrentLruCache

use std::fmt;

use crate::error::ConfigError;
use crate::events::{CacheEvent, EventListener, FnListener, ListenerChain, TracingListener};
use crate::hash::Hashable;
#[cfg(feature = "concurrency")]
use crate::policy::lru::ConcurrentLruCache;
use crate::policy::lru::LruCache;

/// Sizing parameters for an [`LruCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of live entries. Must be greater than 0.
    pub capacity: usize,
    /// Number of hash buckets; `None` means one bucket per unit of capacity.
    pub bucket_count: Option<usize>,
    /// Reserve arena storage for a full cache up front.
    pub prealloc: bool,
}

impl CacheConfig {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Checks that capacity and bucket count are non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::new("capacity must be greater than 0"));
        }
        if self.bucket_count == Some(0) {
            return Err(ConfigError::new("bucket_count must be greater than 0"));
        }
        Ok(())
    }

    /// Bucket count the hash table will be built with.
    pub fn effective_bucket_count(&self) -> usize {
        self.bucket_count.unwrap_or(self.capacity)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            bucket_count: None,
            prealloc: true,
        }
    }
}

/// Builder for [`LruCache`] and [`ConcurrentLruCache`](crate::policy::lru::ConcurrentLruCache).
///
/// Listeners are invoked in the order they were added.
pub struct CacheBuilder<K, V> {
    config: CacheConfig,
    listeners: ListenerChain<K, V>,
}

impl<K, V> CacheBuilder<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self::from_config(CacheConfig::new(capacity))
    }

    pub fn from_config(config: CacheConfig) -> Self {
        Self {
            config,
            listeners: ListenerChain::new(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn bucket_count(mut self, bucket_count: usize) -> Self {
        self.config.bucket_count = Some(bucket_count);
        self
    }

    pub fn prealloc(mut self, prealloc: bool) -> Self {
        self.config.prealloc = prealloc;
        self
    }

    pub fn listener<L>(mut self, listener: L) -> Self
    where
        L: EventListener<K, V> + 'static,
    {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Adds a closure listener.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use lrukit::builder::CacheBuilder;
    /// use lrukit::events::CacheEvent;
    ///
    /// let evicted = Arc::new(AtomicUsize::new(0));
    /// let counter = Arc::clone(&evicted);
    /// let mut cache = CacheBuilder::new(1)
    ///     .on_event(move |event: CacheEvent<'_, u8, u8>| {
    ///         if let CacheEvent::Evicted { .. } = event {
    ///             counter.fetch_add(1, Ordering::Relaxed);
    ///         }
    ///     })
    ///     .build();
    ///
    /// cache.set(1, 1);
    /// cache.set(2, 2);
    /// assert_eq!(evicted.load(Ordering::Relaxed), 1);
    /// ```
    pub fn on_event<F>(self, f: F) -> Self
    where
        F: FnMut(CacheEvent<'_, K, V>) + Send + 'static,
    {
        self.listener(FnListener(f))
    }

    /// Adds a [`TracingListener`].
    pub fn tracing(self) -> Self
    where
        K: fmt::Debug,
    {
        self.listener(TracingListener)
    }
}

impl<K, V> CacheBuilder<K, V>
where
    K: Hashable + Eq + 'static,
    V: 'static,
{
    /// Builds the cache, or returns why the configuration is unusable.
    pub fn try_build(self) -> Result<LruCache<K, V>, ConfigError> {
        let config = self.config;
        LruCache::from_config(&config, self.listeners.into_listener()).inspect_err(|err| {
            tracing::warn!(
                error = %err,
                capacity = config.capacity,
                bucket_count = ?config.bucket_count,
                "rejected cache configuration"
            );
        })
    }

    /// # Panics
    ///
    /// Panics if the configuration is invalid.
    pub fn build(self) -> LruCache<K, V> {
        match self.try_build() {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    #[cfg(feature = "concurrency")]
    pub fn try_build_concurrent(self) -> Result<ConcurrentLruCache<K, V>, ConfigError> {
        self.try_build().map(ConcurrentLruCache::from)
    }

    /// # Panics
    ///
    /// Panics if the configuration is invalid.
    #[cfg(feature = "concurrency")]
    pub fn build_concurrent(self) -> ConcurrentLruCache<K, V> {
        ConcurrentLruCache::from(self.build())
    }
}

impl<K, V> fmt::Debug for CacheBuilder<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheBuilder")
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
