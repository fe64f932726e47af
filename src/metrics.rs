//! Event-driven cache counters.
//!
//! [`CacheMetrics`] is an [`EventListener`] that tallies events into atomic
//! counters. Install it behind an `Arc` and keep a clone to read from:
//!
//! ```
//! use std::sync::Arc;
//! use lrukit::builder::CacheBuilder;
//! use lrukit::metrics::CacheMetrics;
//!
//! let metrics = Arc::new(CacheMetrics::new());
//! let mut cache = CacheBuilder::new(2)
//!     .listener(Arc::clone(&metrics))
//!     .build();
//!
//! cache.set("a", 1);
//! cache.set("b", 2);
//! cache.set("c", 3); // evicts "a"
//! assert_eq!(cache.get(&"a"), None);
//! assert_eq!(cache.get(&"c"), Some(&3));
//!
//! let snap = metrics.snapshot();
//! assert_eq!(snap.inserts, 3);
//! assert_eq!(snap.evictions, 1);
//! assert_eq!((snap.hits, snap.misses), (1, 1));
//! assert_eq!(snap.hit_rate(), Some(0.5));
//! ```
//!
//! Counters use `Relaxed` ordering; a snapshot taken while other threads are
//! writing is not a consistent cut across fields.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::events::{CacheEvent, EventListener};

#[derive(Debug, Default)]
pub struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    updates: AtomicU64,
    touches: AtomicU64,
    evictions: AtomicU64,
    removals: AtomicU64,
    cleared_entries: AtomicU64,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tallies one event.
    pub fn record<K, V>(&self, event: &CacheEvent<'_, K, V>) {
        let counter = match event {
            CacheEvent::Hit { .. } => &self.hits,
            CacheEvent::Miss => &self.misses,
            CacheEvent::Inserted { .. } => &self.inserts,
            CacheEvent::Updated { .. } => &self.updates,
            CacheEvent::Touched { .. } => &self.touches,
            CacheEvent::Evicted { .. } => &self.evictions,
            CacheEvent::Removed { .. } => &self.removals,
            CacheEvent::Cleared { entries } => {
                self.cleared_entries
                    .fetch_add(*entries as u64, Ordering::Relaxed);
                return;
            },
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            touches: self.touches.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            cleared_entries: self.cleared_entries.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.inserts,
            &self.updates,
            &self.touches,
            &self.evictions,
            &self.removals,
            &self.cleared_entries,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl<K, V> EventListener<K, V> for Arc<CacheMetrics> {
    fn on_event(&mut self, event: CacheEvent<'_, K, V>) {
        self.record(&event);
    }
}

/// Point-in-time copy of [`CacheMetrics`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub updates: u64,
    pub touches: u64,
    pub evictions: u64,
    pub removals: u64,
    /// Entries dropped by `clear`, summed over all calls.
    pub cleared_entries: u64,
}

impl MetricsSnapshot {
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// `hits / (hits + misses)`, or `None` before the first lookup.
    pub fn hit_rate(&self) -> Option<f64> {
        match self.lookups() {
            0 => None,
            total => Some(self.hits as f64 / total as f64),
        }
    }
}
