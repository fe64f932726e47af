pub use crate::builder::{CacheBuilder, CacheConfig};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::events::{CacheEvent, EventKind, EventListener, ListenerChain, TracingListener};
pub use crate::hash::{HashedKey, Hashable};
pub use crate::metrics::{CacheMetrics, MetricsSnapshot};
#[cfg(feature = "concurrency")]
pub use crate::policy::lru::ConcurrentLruCache;
pub use crate::policy::lru::LruCache;
pub use crate::traits::{CoreCache, LruCacheTrait, MutableCache};
