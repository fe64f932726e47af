//! Cache events and host-supplied listeners.
//!
//! The cache never prints or logs from its mutation path. Instead every
//! observable step is reported as a [`CacheEvent`] to an optional
//! [`EventListener`] installed by the host (see
//! [`CacheBuilder::listener`](crate::builder::CacheBuilder::listener)).
//!
//! ## Event Flow
//!
//! ```text
//!   set(k, v) ──► Inserted{k} ──► (over capacity) Evicted{victim}
//!             └─► Updated{k}
//!   get(k)    ──► Hit{k} | Miss
//!   touch(k)  ──► Touched{k}
//!   remove(k) / pop_lru() ──► Removed{k}
//!   clear()   ──► Cleared{entries}
//! ```
//!
//! Events borrow from the cache and are only valid for the duration of the
//! callback. Listeners must be `Send` so a cache can sit behind a lock.
//!
//! ## Provided Listeners
//!
//! - [`TracingListener`]: forwards events to `tracing` (`trace!` for reads,
//!   `debug!` for mutations).
//! - [`ListenerChain`]: fans one event out to several listeners.
//! - [`CacheMetrics`](crate::metrics::CacheMetrics) (behind `Arc`): counters.

use std::fmt;

/// A single observable step of a cache operation.
#[derive(Debug)]
pub enum CacheEvent<'a, K, V> {
    /// `get` found the key and promoted it to most recently used.
    Hit { key: &'a K },
    /// `get` did not find the key. Nothing changed.
    Miss,
    /// `set` linked a new entry.
    Inserted { key: &'a K },
    /// `set` overwrote the value of an existing entry and promoted it.
    Updated { key: &'a K },
    /// `touch` promoted an entry without reading it.
    Touched { key: &'a K },
    /// The least recently used entry was dropped to stay within capacity.
    Evicted { key: &'a K, value: &'a V },
    /// An entry was removed by `remove` or `pop_lru`.
    Removed { key: &'a K },
    /// Every entry was dropped.
    Cleared { entries: usize },
}

impl<K, V> Clone for CacheEvent<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for CacheEvent<'_, K, V> {}

impl<'a, K, V> CacheEvent<'a, K, V> {
    /// Payload-free discriminant of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            CacheEvent::Hit { .. } => EventKind::Hit,
            CacheEvent::Miss => EventKind::Miss,
            CacheEvent::Inserted { .. } => EventKind::Inserted,
            CacheEvent::Updated { .. } => EventKind::Updated,
            CacheEvent::Touched { .. } => EventKind::Touched,
            CacheEvent::Evicted { .. } => EventKind::Evicted,
            CacheEvent::Removed { .. } => EventKind::Removed,
            CacheEvent::Cleared { .. } => EventKind::Cleared,
        }
    }

    /// Key the event refers to, if any.
    pub fn key(&self) -> Option<&'a K> {
        match *self {
            CacheEvent::Hit { key }
            | CacheEvent::Inserted { key }
            | CacheEvent::Updated { key }
            | CacheEvent::Touched { key }
            | CacheEvent::Evicted { key, .. }
            | CacheEvent::Removed { key } => Some(key),
            CacheEvent::Miss | CacheEvent::Cleared { .. } => None,
        }
    }
}

/// Discriminant of a [`CacheEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Hit,
    Miss,
    Inserted,
    Updated,
    Touched,
    Evicted,
    Removed,
    Cleared,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Hit => "hit",
            EventKind::Miss => "miss",
            EventKind::Inserted => "inserted",
            EventKind::Updated => "updated",
            EventKind::Touched => "touched",
            EventKind::Evicted => "evicted",
            EventKind::Removed => "removed",
            EventKind::Cleared => "cleared",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver of cache events.
///
/// Called synchronously, inside the operation that produced the event and
/// after the cache has reached a consistent state for that step.
///
/// On a [`ConcurrentLruCache`](crate::policy::lru::ConcurrentLruCache) the
/// listener runs while the cache's lock is held. That lock is not reentrant:
/// a listener that calls back into the same shared cache deadlocks.
pub trait EventListener<K, V>: Send {
    fn on_event(&mut self, event: CacheEvent<'_, K, V>);
}

impl<K, V, L> EventListener<K, V> for Box<L>
where
    L: EventListener<K, V> + ?Sized,
{
    fn on_event(&mut self, event: CacheEvent<'_, K, V>) {
        (**self).on_event(event);
    }
}

/// Adapts a closure into an [`EventListener`].
///
/// Usually created through
/// [`CacheBuilder::on_event`](crate::builder::CacheBuilder::on_event).
pub struct FnListener<F>(pub F);

impl<F> FnListener<F> {
    pub fn new<K, V>(f: F) -> Self
    where
        F: FnMut(CacheEvent<'_, K, V>) + Send,
    {
        Self(f)
    }
}

impl<K, V, F> EventListener<K, V> for FnListener<F>
where
    F: FnMut(CacheEvent<'_, K, V>) + Send,
{
    fn on_event(&mut self, event: CacheEvent<'_, K, V>) {
        (self.0)(event);
    }
}

impl<F> fmt::Debug for FnListener<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnListener").finish_non_exhaustive()
    }
}

/// Listener that logs every event through `tracing`.
///
/// Reads (`Hit`, `Miss`, `Touched`) are emitted at `TRACE`, mutations at
/// `DEBUG`. Keys are recorded as the structured field `key`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingListener;

impl<K: fmt::Debug, V> EventListener<K, V> for TracingListener {
    fn on_event(&mut self, event: CacheEvent<'_, K, V>) {
        match event {
            CacheEvent::Hit { key } => tracing::trace!(key = ?key, "cache hit"),
            CacheEvent::Miss => tracing::trace!("cache miss"),
            CacheEvent::Touched { key } => tracing::trace!(key = ?key, "entry touched"),
            CacheEvent::Inserted { key } => tracing::debug!(key = ?key, "entry inserted"),
            CacheEvent::Updated { key } => tracing::debug!(key = ?key, "entry updated"),
            CacheEvent::Evicted { key, .. } => {
                tracing::debug!(key = ?key, "evicted least recently used entry")
            },
            CacheEvent::Removed { key } => tracing::debug!(key = ?key, "entry removed"),
            CacheEvent::Cleared { entries } => tracing::debug!(entries, "cache cleared"),
        }
    }
}

/// Forwards each event to every listener, in registration order.
pub struct ListenerChain<K, V> {
    listeners: Vec<Box<dyn EventListener<K, V>>>,
}

impl<K, V> ListenerChain<K, V> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn push(&mut self, listener: Box<dyn EventListener<K, V>>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Collapses the chain: `None` when empty, the sole listener when there
    /// is one, otherwise the chain itself.
    pub fn into_listener(mut self) -> Option<Box<dyn EventListener<K, V>>>
    where
        K: 'static,
        V: 'static,
    {
        match self.listeners.len() {
            0 => None,
            1 => self.listeners.pop(),
            _ => Some(Box::new(self)),
        }
    }
}

impl<K, V> Default for ListenerChain<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> From<Vec<Box<dyn EventListener<K, V>>>> for ListenerChain<K, V> {
    fn from(listeners: Vec<Box<dyn EventListener<K, V>>>) -> Self {
        Self { listeners }
    }
}

impl<K, V> EventListener<K, V> for ListenerChain<K, V> {
    fn on_event(&mut self, event: CacheEvent<'_, K, V>) {
        for listener in &mut self.listeners {
            listener.on_event(event);
        }
    }
}

impl<K, V> fmt::Debug for ListenerChain<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerChain")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
