//! # Least Recently Used (LRU) Cache
//!
//! A fixed-capacity key/value cache. Lookups go through a chained hash table,
//! recency is tracked by a doubly linked list, and both structures thread
//! through the same arena-resident entries.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                          LruCache<K, V>                              │
//!   │                                                                      │
//!   │   HashTable (bucket heads)          RecencyList (head/tail/len)      │
//!   │   ┌────┬────┬────┬────┐             head (MRU)          tail (LRU)   │
//!   │   │ b0 │ b1 │ b2 │ b3 │               │                     │        │
//!   │   └─┬──┴────┴─┬──┴────┘               ▼                     ▼        │
//!   │     │ chain   │                    ┌──────┐ ◄──► ┌──────┐ ◄──► ┌──────┐
//!   │     └────────►│───────────────────►│ id_3 │      │ id_1 │      │ id_2 │
//!   │               └───────────────────►└──────┘      └──────┘      └──────┘
//!   │                                                                      │
//!   │   SlotArena<Entry<K, V>>: owns key, value, cached hash and all links │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations Flow
//!
//! ```text
//!   set(D) on a full cache (capacity = 3)
//!   ═══════════════════════════════════════════════════════════════════════
//!     head ──► [C] ◄──► [B] ◄──► [A] ◄── tail
//!
//!     1. HashTable::insert(D)  -> Inserted(id_d)
//!     2. push_front(id_d)      -> [D] [C] [B] [A]
//!     3. len 4 > 3: pop_back   -> victim A, unlink from table, free slot
//!
//!     head ──► [D] ◄──► [C] ◄──► [B] ◄── tail
//!
//!   get(B)
//!   ═══════════════════════════════════════════════════════════════════════
//!     1. HashTable::lookup(B)  -> id_b
//!     2. move_to_front(id_b)
//!
//!     head ──► [B] ◄──► [D] ◄──► [C] ◄── tail
//! ```
//!
//! ## Methods
//!
//! | Method           | Complexity | Description                               |
//! |------------------|------------|-------------------------------------------|
//! | `new(capacity)`  | O(b)       | Create cache, `b` buckets                 |
//! | `set(k, v)`      | O(1)*      | Insert or update, may evict LRU           |
//! | `get(&k)`        | O(1)*      | Get value, moves to MRU position          |
//! | `peek(&k)`       | O(1)*      | Get value without affecting order         |
//! | `remove(&k)`     | O(1)*      | Remove entry by key                       |
//! | `pop_lru()`      | O(1)       | Remove and return least recently used     |
//! | `touch(&k)`      | O(1)*      | Move to MRU without returning value       |
//! | `recency_rank()` | O(n)       | Position in recency order (0 = MRU)       |
//! | `iter()`         | O(n)       | Entries from MRU to LRU                   |
//!
//! `*` expected, with the chain length bounded by `len / bucket_count`.
//!
//! ## Example Usage
//!
//! ```
//! use lrukit::LruCache;
//!
//! let mut cache = LruCache::new(3);
//! assert!(cache.set("A".to_string(), 1));
//! cache.set("B".to_string(), 2);
//! cache.set("C".to_string(), 3);
//! cache.set("D".to_string(), 4); // evicts "A"
//!
//! assert_eq!(cache.get("A"), None);
//! assert_eq!(cache.get("B"), Some(&2));
//! assert_eq!(cache.size(), 3);
//!
//! // "B" was just promoted, "C" is now the eviction candidate
//! assert_eq!(cache.peek_lru(), Some((&"C".to_string(), &3)));
//! ```
//!
//! ## Thread Safety
//!
//! - `LruCache`: single-threaded; `&mut self` for every recency update
//! - `ConcurrentLruCache`: one `parking_lot::Mutex` around an `LruCache`,
//!   behind the `concurrency` feature

use std::borrow::Borrow;
use std::fmt;
#[cfg(feature = "concurrency")]
use std::sync::Arc;

#[cfg(feature = "concurrency")]
use parking_lot::Mutex;

use crate::builder::CacheConfig;
use crate::ds::{Entry, HashTable, InsertOutcome, RecencyIter, RecencyList, SlotArena};
use crate::error::{ConfigError, InvariantError};
use crate::events::{CacheEvent, EventListener};
use crate::hash::Hashable;
#[cfg(feature = "concurrency")]
use crate::traits::ConcurrentCache;
use crate::traits::{CoreCache, LruCacheTrait, MutableCache};

type Listener<K, V> = Option<Box<dyn EventListener<K, V>>>;

#[inline]
fn emit<K, V>(listener: &mut Listener<K, V>, event: CacheEvent<'_, K, V>) {
    if let Some(listener) = listener.as_mut() {
        listener.on_event(event);
    }
}

enum Upsert<V> {
    Inserted,
    Updated(Option<V>),
}

/// Fixed-capacity LRU cache.
///
/// Holds at most `capacity` entries. Inserting a new key into a full cache
/// evicts exactly one entry, the least recently used. `get`, `set` on an
/// existing key and `touch` promote the entry to most recently used.
pub struct LruCache<K, V> {
    arena: SlotArena<Entry<K, V>>,
    table: HashTable,
    list: RecencyList,
    capacity: usize,
    listener: Listener<K, V>,
}

impl<K, V> LruCache<K, V>
where
    K: Hashable + Eq,
{
    /// Creates a cache holding at most `capacity` entries, with one hash
    /// bucket per entry.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0. Use [`try_new`](Self::try_new) to get an
    /// error instead.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::LruCache;
    ///
    /// let cache: LruCache<u32, String> = LruCache::new(100);
    /// assert_eq!(cache.capacity(), 100);
    /// assert_eq!(cache.bucket_count(), 100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible version of [`new`](Self::new).
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        Self::from_config(&CacheConfig::new(capacity), None)
    }

    pub(crate) fn from_config(
        config: &CacheConfig,
        listener: Listener<K, V>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let bucket_count = config.effective_bucket_count();
        let table = HashTable::try_new(bucket_count).map_err(|err| {
            ConfigError::new(format!("cannot allocate {bucket_count} buckets: {err}"))
        })?;
        let arena = if config.prealloc {
            // one extra slot: the new entry is linked before the victim leaves
            let slots = config.capacity.saturating_add(1);
            SlotArena::try_with_capacity(slots).map_err(|err| {
                ConfigError::new(format!("cannot preallocate {slots} entries: {err}"))
            })?
        } else {
            SlotArena::new()
        };
        Ok(Self {
            arena,
            table,
            list: RecencyList::new(),
            capacity: config.capacity,
            listener,
        })
    }

    /// Installs `listener`, replacing any previous one.
    pub fn set_listener<L>(&mut self, listener: L)
    where
        L: EventListener<K, V> + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    /// Removes and returns the installed listener.
    pub fn take_listener(&mut self) -> Option<Box<dyn EventListener<K, V>>> {
        self.listener.take()
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Returns the value for `key` and marks it most recently used.
    ///
    /// A miss changes nothing.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hashable + Eq + ?Sized,
    {
        let Some(id) = self.table.lookup(&self.arena, key) else {
            emit(&mut self.listener, CacheEvent::Miss);
            return None;
        };
        self.list.move_to_front(&mut self.arena, id);

        #[cfg(debug_assertions)]
        self.debug_validate_invariants();

        let entry = self.arena.get(id)?;
        emit(&mut self.listener, CacheEvent::Hit { key: entry.key() });
        Some(entry.value())
    }

    /// Like [`get`](Self::get) but returns a mutable reference.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hashable + Eq + ?Sized,
    {
        let Some(id) = self.table.lookup(&self.arena, key) else {
            emit(&mut self.listener, CacheEvent::Miss);
            return None;
        };
        self.list.move_to_front(&mut self.arena, id);

        let entry = self.arena.get_mut(id)?;
        emit(&mut self.listener, CacheEvent::Hit { key: entry.key() });
        Some(entry.value_mut())
    }

    /// Returns the value for `key` without touching recency order.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hashable + Eq + ?Sized,
    {
        let id = self.table.lookup(&self.arena, key)?;
        self.arena.get(id).map(Entry::value)
    }

    /// Mutable [`peek`](Self::peek).
    pub fn peek_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hashable + Eq + ?Sized,
    {
        let id = self.table.lookup(&self.arena, key)?;
        self.arena.get_mut(id).map(Entry::value_mut)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hashable + Eq + ?Sized,
    {
        self.table.lookup(&self.arena, key).is_some()
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Inserts or updates `key`.
    ///
    /// Returns `true` if the key was new. Updating an existing key replaces
    /// its value, promotes it and leaves the size unchanged. A new key that
    /// pushes the size past capacity evicts the least recently used entry.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::LruCache;
    ///
    /// let mut cache = LruCache::new(2);
    /// assert!(cache.set("k", 1));
    /// assert!(!cache.set("k", 2));
    /// assert_eq!(cache.get(&"k"), Some(&2));
    /// assert_eq!(cache.size(), 1);
    /// ```
    pub fn set(&mut self, key: K, value: V) -> bool {
        matches!(self.upsert(key, value), Upsert::Inserted)
    }

    /// Inserts or updates `key`, returning the value it replaced.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.upsert(key, value) {
            Upsert::Inserted => None,
            Upsert::Updated(previous) => previous,
        }
    }

    fn upsert(&mut self, key: K, value: V) -> Upsert<V> {
        let candidate = Entry::new(key, value);
        let outcome = match self.table.insert(&mut self.arena, candidate) {
            InsertOutcome::Duplicate { existing, rejected } => {
                self.list.move_to_front(&mut self.arena, existing);
                let mut previous = None;
                if let Some(entry) = self.arena.get_mut(existing) {
                    previous = Some(entry.replace_value(rejected.into_value()));
                    emit(&mut self.listener, CacheEvent::Updated { key: entry.key() });
                }
                Upsert::Updated(previous)
            },
            InsertOutcome::Inserted(id) => {
                self.list.push_front(&mut self.arena, id);
                if let Some(entry) = self.arena.get(id) {
                    emit(&mut self.listener, CacheEvent::Inserted { key: entry.key() });
                }
                if self.list.len() > self.capacity {
                    self.evict_lru();
                }
                Upsert::Inserted
            },
        };

        #[cfg(debug_assertions)]
        self.debug_validate_invariants();

        outcome
    }

    fn evict_lru(&mut self) {
        let Some(victim) = self.list.pop_back(&mut self.arena) else {
            return;
        };
        let unlinked = self.table.unlink(&mut self.arena, victim);
        debug_assert!(unlinked, "evicted slot {victim:?} missing from table");

        if let Some(entry) = self.arena.remove(victim) {
            emit(
                &mut self.listener,
                CacheEvent::Evicted {
                    key: entry.key(),
                    value: entry.value(),
                },
            );
        }
    }

    /// Removes `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hashable + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes `key`, returning the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hashable + Eq + ?Sized,
    {
        let id = self.table.delete(&mut self.arena, key)?;
        self.list.remove(&mut self.arena, id);
        let entry = self.arena.remove(id)?;
        emit(&mut self.listener, CacheEvent::Removed { key: entry.key() });

        #[cfg(debug_assertions)]
        self.debug_validate_invariants();

        Some(entry.into_parts())
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let id = self.list.pop_back(&mut self.arena)?;
        self.table.unlink(&mut self.arena, id);
        let entry = self.arena.remove(id)?;
        emit(&mut self.listener, CacheEvent::Removed { key: entry.key() });

        #[cfg(debug_assertions)]
        self.debug_validate_invariants();

        Some(entry.into_parts())
    }

    /// The entry `pop_lru` would return, without removing or promoting it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        let entry = self.arena.get(self.list.back()?)?;
        Some((entry.key(), entry.value()))
    }

    /// The most recently used entry.
    pub fn peek_mru(&self) -> Option<(&K, &V)> {
        let entry = self.arena.get(self.list.front()?)?;
        Some((entry.key(), entry.value()))
    }

    /// Promotes `key` to most recently used. Returns `false` if absent.
    pub fn touch<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hashable + Eq + ?Sized,
    {
        let Some(id) = self.table.lookup(&self.arena, key) else {
            return false;
        };
        self.list.move_to_front(&mut self.arena, id);
        if let Some(entry) = self.arena.get(id) {
            emit(&mut self.listener, CacheEvent::Touched { key: entry.key() });
        }

        #[cfg(debug_assertions)]
        self.debug_validate_invariants();

        true
    }

    /// Position of `key` in recency order, 0 being most recent. O(n).
    pub fn recency_rank<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hashable + Eq + ?Sized,
    {
        let id = self.table.lookup(&self.arena, key)?;
        self.list.rank(&self.arena, id)
    }

    /// Drops every entry. Capacity and bucket count are unchanged.
    pub fn clear(&mut self) {
        let entries = self.arena.len();
        self.table.clear();
        self.list.clear();
        self.arena.clear();
        emit(&mut self.listener, CacheEvent::Cleared { entries });
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Number of live entries.
    pub fn size(&self) -> usize {
        self.list.len()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// Entries from most to least recently used. Does not promote.
    ///
    /// ```
    /// use lrukit::LruCache;
    ///
    /// let mut cache = LruCache::new(4);
    /// cache.set(1, 'a');
    /// cache.set(2, 'b');
    /// cache.set(3, 'c');
    /// cache.get(&1);
    ///
    /// let keys: Vec<_> = cache.keys().copied().collect();
    /// assert_eq!(keys, [1, 3, 2]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            arena: &self.arena,
            ids: self.list.iter(&self.arena),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Cross-checks arena, hash table and recency list.
    ///
    /// Verifies that all three agree on the entry count, that the count is
    /// within capacity, that the list links are symmetric, and that every
    /// listed entry is found by a table lookup of its own key.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let live = self.arena.len();
        if self.table.len() != live {
            return Err(InvariantError::new(format!(
                "table holds {} entries, arena holds {live}",
                self.table.len()
            )));
        }
        if self.list.len() != live {
            return Err(InvariantError::new(format!(
                "list holds {} entries, arena holds {live}",
                self.list.len()
            )));
        }
        if live > self.capacity {
            return Err(InvariantError::new(format!(
                "{live} entries exceed capacity {}",
                self.capacity
            )));
        }

        let mut walked = 0usize;
        let mut prev = None;
        let mut current = self.list.front();
        while let Some(id) = current {
            walked += 1;
            if walked > live {
                return Err(InvariantError::new("recency list does not terminate"));
            }
            let entry = self
                .arena
                .get(id)
                .ok_or_else(|| InvariantError::new(format!("list links vacant slot {id:?}")))?;
            if entry.list_prev != prev {
                return Err(InvariantError::new(format!("broken back link at {id:?}")));
            }
            if entry.hash() != entry.key().digest() {
                return Err(InvariantError::new(format!("stale hash at {id:?}")));
            }
            if self.table.lookup(&self.arena, entry.key()) != Some(id) {
                return Err(InvariantError::new(format!(
                    "{id:?} is listed but not reachable through the table"
                )));
            }
            prev = Some(id);
            current = entry.list_next;
        }

        if walked != live {
            return Err(InvariantError::new(format!(
                "walked {walked} list entries, expected {live}"
            )));
        }
        if self.list.back() != prev {
            return Err(InvariantError::new("list tail is not the last walked entry"));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.table.debug_validate_invariants(&self.arena);
        self.list.debug_validate_invariants(&self.arena);
        if let Err(err) = self.check_invariants() {
            panic!("LruCache invariant violated: {err}");
        }
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.list.len())
            .field("capacity", &self.capacity)
            .field("bucket_count", &self.table.bucket_count())
            .field("listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

impl<K, V> Extend<(K, V)> for LruCache<K, V>
where
    K: Hashable + Eq,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

/// Iterator returned by [`LruCache::iter`].
pub struct Iter<'a, K, V> {
    arena: &'a SlotArena<Entry<K, V>>,
    ids: RecencyIter<'a, K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.ids.next()?;
        let entry = self.arena.get(id)?;
        Some((entry.key(), entry.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl<'a, K, V> IntoIterator for &'a LruCache<K, V>
where
    K: Hashable + Eq,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ---------------------------------------------------------------------------
// Trait implementations
// ---------------------------------------------------------------------------

impl<K, V> CoreCache<K, V> for LruCache<K, V>
where
    K: Hashable + Eq,
{
    #[inline]
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        LruCache::insert(self, key, value)
    }

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        LruCache::get(self, key)
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        LruCache::contains(self, key)
    }

    fn len(&self) -> usize {
        LruCache::len(self)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        LruCache::clear(self);
    }
}

impl<K, V> MutableCache<K, V> for LruCache<K, V>
where
    K: Hashable + Eq,
{
    #[inline]
    fn remove(&mut self, key: &K) -> Option<V> {
        LruCache::remove(self, key)
    }
}

impl<K, V> LruCacheTrait<K, V> for LruCache<K, V>
where
    K: Hashable + Eq,
{
    fn pop_lru(&mut self) -> Option<(K, V)> {
        LruCache::pop_lru(self)
    }

    fn peek_lru(&self) -> Option<(&K, &V)> {
        LruCache::peek_lru(self)
    }

    fn touch(&mut self, key: &K) -> bool {
        LruCache::touch(self, key)
    }

    fn recency_rank(&self, key: &K) -> Option<usize> {
        LruCache::recency_rank(self, key)
    }
}

// ---------------------------------------------------------------------------
// ConcurrentLruCache
// ---------------------------------------------------------------------------

/// Thread-safe LRU cache: one `parking_lot::Mutex` around an [`LruCache`].
///
/// Every call holds the lock for the whole lookup, promotion and eviction,
/// so the table and list are never observed out of step. Values are
/// returned by clone because references cannot outlive the guard; use
/// [`with_lock`](Self::with_lock) to borrow instead.
///
/// Cloning the handle shares the same cache.
#[cfg(feature = "concurrency")]
pub struct ConcurrentLruCache<K, V> {
    inner: Arc<Mutex<LruCache<K, V>>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> Clone for ConcurrentLruCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> fmt::Debug for ConcurrentLruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("ConcurrentLruCache");
        // never block: the caller may be the lock holder
        match self.inner.try_lock() {
            Some(cache) => out
                .field("len", &cache.list.len())
                .field("capacity", &cache.capacity),
            None => out.field("inner", &format_args!("<locked>")),
        };
        out.finish_non_exhaustive()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> From<LruCache<K, V>> for ConcurrentLruCache<K, V> {
    fn from(cache: LruCache<K, V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentLruCache<K, V>
where
    K: Hashable + Eq,
{
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    ///
    /// ```
    /// use lrukit::ConcurrentLruCache;
    ///
    /// let cache: ConcurrentLruCache<u32, String> = ConcurrentLruCache::new(100);
    /// cache.set(1, "one".to_string());
    /// assert_eq!(cache.get(&1).as_deref(), Some("one"));
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self::from(LruCache::new(capacity))
    }

    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        LruCache::try_new(capacity).map(Self::from)
    }

    /// Returns a clone of the value and promotes the entry.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hashable + Eq + ?Sized,
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Returns a clone of the value without promoting.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hashable + Eq + ?Sized,
        V: Clone,
    {
        self.inner.lock().peek(key).cloned()
    }

    pub fn set(&self, key: K, value: V) -> bool {
        self.inner.lock().set(key, value)
    }

    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.lock().insert(key, value)
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hashable + Eq + ?Sized,
    {
        self.inner.lock().remove(key)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hashable + Eq + ?Sized,
    {
        self.inner.lock().contains(key)
    }

    pub fn touch<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hashable + Eq + ?Sized,
    {
        self.inner.lock().touch(key)
    }

    pub fn pop_lru(&self) -> Option<(K, V)> {
        self.inner.lock().pop_lru()
    }

    pub fn size(&self) -> usize {
        self.inner.lock().size()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Runs `f` with exclusive access to the underlying cache.
    ///
    /// The lock is held for the whole call and is not reentrant. `f`, and
    /// any listener it triggers, must not call methods on this handle or a
    /// clone of it; use `inner` instead.
    ///
    /// ```
    /// use lrukit::ConcurrentLruCache;
    ///
    /// let cache = ConcurrentLruCache::new(4);
    /// cache.set("a", 1);
    /// let total = cache.with_lock(|inner| {
    ///     inner.set("b", 2);
    ///     inner.values().sum::<i32>()
    /// });
    /// assert_eq!(total, 3);
    /// ```
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut LruCache<K, V>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }
}

#[cfg(feature = "concurrency")]
impl<K: Send, V: Send> ConcurrentCache for ConcurrentLruCache<K, V> {}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::builder::CacheBuilder;
    use crate::events::{EventKind, FnListener, TracingListener};

    fn keys_of<K: Hashable + Eq + Clone, V>(cache: &LruCache<K, V>) -> Vec<K> {
        cache.keys().cloned().collect()
    }

    mod basic_behavior {
        use super::*;

        #[test]
        fn new_cache_is_empty() {
            let cache: LruCache<u32, u32> = LruCache::new(5);
            assert_eq!(cache.size(), 0);
            assert!(cache.is_empty());
            assert_eq!(cache.capacity(), 5);
            assert_eq!(cache.bucket_count(), 5);
            assert_eq!(cache.peek_lru(), None);
        }

        #[test]
        fn zero_capacity_rejected() {
            let err = LruCache::<u32, u32>::try_new(0).unwrap_err();
            assert!(err.message().contains("capacity"));
        }

        #[test]
        fn unallocatable_capacity_rejected() {
            let err = LruCache::<u64, u64>::try_new(usize::MAX / 2).unwrap_err();
            assert!(err.message().starts_with("cannot allocate"));

            let config = CacheConfig {
                bucket_count: Some(16),
                ..CacheConfig::new(usize::MAX / 2)
            };
            let err = LruCache::<u64, u64>::from_config(&config, None).unwrap_err();
            assert!(err.message().starts_with("cannot preallocate"));

            let lazy = CacheConfig {
                prealloc: false,
                ..config
            };
            let mut cache = LruCache::<u64, u64>::from_config(&lazy, None).unwrap();
            assert!(cache.set(1, 1));
            assert_eq!(cache.capacity(), usize::MAX / 2);
        }

        #[test]
        #[should_panic(expected = "capacity must be greater than 0")]
        fn new_panics_on_zero_capacity() {
            let _cache: LruCache<u32, u32> = LruCache::new(0);
        }

        #[test]
        fn set_then_get() {
            let mut cache = LruCache::new(3);
            assert!(cache.set("a".to_string(), 1));
            assert_eq!(cache.get("a"), Some(&1));
            assert_eq!(cache.get("zzz"), None);
        }

        #[test]
        fn duplicate_set_updates_in_place() {
            let mut cache = LruCache::new(3);
            cache.set("k", 1);
            cache.set("other", 0);
            assert!(!cache.set("k", 2));
            assert_eq!(cache.size(), 2);
            assert_eq!(cache.get(&"k"), Some(&2));
            assert_eq!(cache.insert("k", 3), Some(2));
            assert_eq!(cache.keys().filter(|k| **k == "k").count(), 1);
        }

        #[test]
        fn get_mut_and_peek_mut_write_through() {
            let mut cache = LruCache::new(2);
            cache.set(1, String::from("a"));
            cache.set(2, String::from("b"));
            cache.get_mut(&1).unwrap().push('!');
            assert_eq!(keys_of(&cache), vec![1, 2]);
            cache.peek_mut(&2).unwrap().push('?');
            assert_eq!(keys_of(&cache), vec![1, 2]);
            assert_eq!(cache.peek(&1).map(String::as_str), Some("a!"));
            assert_eq!(cache.peek(&2).map(String::as_str), Some("b?"));
        }

        #[test]
        fn remove_and_reinsert() {
            let mut cache = LruCache::new(3);
            cache.set(1, 10);
            cache.set(2, 20);
            assert_eq!(cache.remove(&1), Some(10));
            assert_eq!(cache.remove(&1), None);
            assert!(!cache.contains(&1));
            assert!(cache.set(1, 11));
            assert_eq!(keys_of(&cache), vec![1, 2]);
            assert_eq!(cache.remove_entry(&2), Some((2, 20)));
        }

        #[test]
        fn clear_keeps_capacity() {
            let mut cache = LruCache::new(3);
            cache.extend([(1, 1), (2, 2), (3, 3)]);
            cache.clear();
            assert!(cache.is_empty());
            assert_eq!(cache.capacity(), 3);
            assert!(cache.set(4, 4));
            assert_eq!(cache.get(&4), Some(&4));
        }

        #[test]
        fn debug_output_is_summary() {
            let mut cache = LruCache::new(3);
            cache.set(1u8, ());
            let text = format!("{cache:?}");
            assert!(text.contains("LruCache"));
            assert!(text.contains("len: 1"));
            assert!(text.contains("capacity: 3"));
        }
    }

    mod recency {
        use super::*;

        #[test]
        fn insertion_order_evicts_oldest_first() {
            let mut cache = LruCache::new(3);
            for key in ["A", "B", "C", "D"] {
                cache.set(key, key.len());
            }
            assert_eq!(cache.size(), 3);
            assert!(!cache.contains(&"A"));
            for key in ["B", "C", "D"] {
                assert!(cache.get(&key).is_some());
            }
        }

        #[test]
        fn hit_protects_from_eviction() {
            let mut cache = LruCache::new(5);
            for i in 1..=5 {
                cache.set(format!("k{i}"), i);
            }
            assert_eq!(cache.get("k1"), Some(&1));
            cache.set("k6".to_string(), 6);

            assert!(cache.contains("k1"));
            assert!(!cache.contains("k2"));
            for key in ["k3", "k4", "k5", "k6"] {
                assert!(cache.contains(key));
            }
        }

        #[test]
        fn update_promotes() {
            let mut cache = LruCache::new(2);
            cache.set(1, 'a');
            cache.set(2, 'b');
            cache.set(1, 'z');
            cache.set(3, 'c');
            assert!(!cache.contains(&2));
            assert_eq!(cache.peek(&1), Some(&'z'));
        }

        #[test]
        fn miss_changes_nothing() {
            let mut cache = LruCache::new(3);
            cache.extend([(1, ()), (2, ()), (3, ())]);
            let before = keys_of(&cache);
            assert_eq!(cache.get(&42), None);
            assert_eq!(keys_of(&cache), before);
            assert_eq!(cache.size(), 3);
        }

        #[test]
        fn peek_contains_do_not_promote() {
            let mut cache = LruCache::new(2);
            cache.set(1, ());
            cache.set(2, ());
            assert!(cache.peek(&1).is_some());
            assert!(cache.contains(&1));
            cache.set(3, ());
            assert!(!cache.contains(&1));
        }

        #[test]
        fn touch_and_rank() {
            let mut cache = LruCache::new(4);
            cache.extend([(1, ()), (2, ()), (3, ())]);
            assert_eq!(cache.recency_rank(&3), Some(0));
            assert_eq!(cache.recency_rank(&1), Some(2));
            assert!(cache.touch(&1));
            assert!(!cache.touch(&9));
            assert_eq!(cache.recency_rank(&1), Some(0));
            assert_eq!(cache.peek_lru().map(|(k, _)| *k), Some(2));
            assert_eq!(cache.peek_mru().map(|(k, _)| *k), Some(1));
        }

        #[test]
        fn pop_lru_drains_in_order() {
            let mut cache = LruCache::new(3);
            cache.extend([(1, 'a'), (2, 'b'), (3, 'c')]);
            cache.get(&1);
            assert_eq!(cache.pop_lru(), Some((2, 'b')));
            assert_eq!(cache.pop_lru(), Some((3, 'c')));
            assert_eq!(cache.pop_lru(), Some((1, 'a')));
            assert_eq!(cache.pop_lru(), None);
        }

        #[test]
        fn capacity_one_replaces() {
            let mut cache = LruCache::new(1);
            cache.set(1, 1);
            cache.set(2, 2);
            assert_eq!(cache.size(), 1);
            assert_eq!(cache.peek(&2), Some(&2));
            assert!(!cache.contains(&1));
        }

        #[test]
        fn iter_is_mru_to_lru() {
            let mut cache = LruCache::new(3);
            cache.extend([("x", 1), ("y", 2), ("z", 3)]);
            cache.get(&"x");
            let collected: Vec<_> = (&cache).into_iter().map(|(k, v)| (*k, *v)).collect();
            assert_eq!(collected, vec![("x", 1), ("z", 3), ("y", 2)]);
            assert_eq!(cache.values().copied().collect::<Vec<_>>(), vec![1, 3, 2]);
        }
    }

    mod collisions {
        use super::*;

        #[test]
        fn single_bucket_behaves_like_many() {
            let mut cache: LruCache<u32, u32> = CacheBuilder::new(4).bucket_count(1).build();
            assert_eq!(cache.bucket_count(), 1);
            for i in 0..10 {
                cache.set(i, i * 100);
                cache.debug_validate_invariants();
            }
            assert_eq!(keys_of(&cache), vec![9, 8, 7, 6]);
            assert_eq!(cache.remove(&7), Some(700));
            assert_eq!(cache.get(&8), Some(&800));
            assert_eq!(keys_of(&cache), vec![8, 9, 6]);
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn borrowed_lookup_matches_owned_key() {
            let mut cache: LruCache<String, u8> = CacheBuilder::new(8).bucket_count(3).build();
            cache.set("alpha".to_string(), 1);
            cache.set("beta".to_string(), 2);
            assert_eq!(cache.get("alpha"), Some(&1));
            assert_eq!(cache.remove("beta"), Some(2));
            assert!(cache.touch("alpha"));
        }
    }

    mod events {
        use super::*;

        fn recording_cache(
            capacity: usize,
        ) -> (LruCache<u32, u32>, Arc<Mutex<Vec<(EventKind, Option<u32>)>>>) {
            let log = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&log);
            let mut cache = LruCache::new(capacity);
            cache.set_listener(FnListener::new(move |event: CacheEvent<'_, u32, u32>| {
                sink.lock().unwrap().push((event.kind(), event.key().copied()));
            }));
            (cache, log)
        }

        #[test]
        fn emits_in_operation_order() {
            let (mut cache, log) = recording_cache(2);
            cache.set(1, 10);
            cache.set(2, 20);
            cache.get(&1);
            cache.get(&5);
            cache.set(3, 30);
            cache.set(3, 31);
            cache.touch(&1);
            cache.remove(&1);
            cache.clear();

            let log = log.lock().unwrap();
            assert_eq!(
                *log,
                vec![
                    (EventKind::Inserted, Some(1)),
                    (EventKind::Inserted, Some(2)),
                    (EventKind::Hit, Some(1)),
                    (EventKind::Miss, None),
                    (EventKind::Inserted, Some(3)),
                    (EventKind::Evicted, Some(2)),
                    (EventKind::Updated, Some(3)),
                    (EventKind::Touched, Some(1)),
                    (EventKind::Removed, Some(1)),
                    (EventKind::Cleared, None),
                ]
            );
        }

        #[test]
        fn take_listener_silences_cache() {
            let (mut cache, log) = recording_cache(2);
            assert!(cache.take_listener().is_some());
            cache.set(1, 1);
            assert!(log.lock().unwrap().is_empty());
        }

        #[test]
        fn tracing_listener_smoke() {
            let _ = tracing_subscriber::fmt()
                .with_max_level(tracing::Level::TRACE)
                .with_test_writer()
                .try_init();

            let mut cache = LruCache::new(2);
            cache.set_listener(TracingListener);
            cache.set("a", 1);
            cache.set("b", 2);
            cache.get(&"a");
            cache.set("c", 3);
            assert_eq!(cache.size(), 2);
        }
    }

    #[cfg(feature = "concurrency")]
    mod concurrent {
        use super::*;

        #[test]
        fn shared_handle_sees_writes() {
            let cache = ConcurrentLruCache::new(2);
            let other = cache.clone();
            assert!(cache.set(1, "one".to_string()));
            assert_eq!(other.get(&1), Some("one".to_string()));
            assert_eq!(other.insert(1, "uno".to_string()), Some("one".to_string()));
            assert_eq!(cache.peek(&1).as_deref(), Some("uno"));
            assert_eq!(cache.len(), 1);
        }

        #[test]
        fn evicts_under_lock() {
            let cache = ConcurrentLruCache::new(2);
            cache.set(1, 1);
            cache.set(2, 2);
            assert!(cache.touch(&1));
            cache.set(3, 3);
            assert!(!cache.contains(&2));
            assert_eq!(cache.pop_lru(), Some((1, 1)));
            assert_eq!(cache.remove(&3), Some(3));
            assert!(cache.is_empty());
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn try_new_rejects_zero() {
            assert!(ConcurrentLruCache::<u8, u8>::try_new(0).is_err());
        }

        #[test]
        fn debug_does_not_block_on_held_lock() {
            let cache = ConcurrentLruCache::new(4);
            cache.set(1u8, 1u8);
            assert!(format!("{cache:?}").contains("len: 1"));

            let inside = cache.with_lock(|inner| {
                inner.set(2, 2);
                format!("{cache:?}")
            });
            assert!(inside.contains("<locked>"));
            assert_eq!(cache.len(), 2);
        }

        #[test]
        fn is_send_and_sync() {
            fn assert_concurrent<T: ConcurrentCache>() {}
            assert_concurrent::<ConcurrentLruCache<String, Vec<u8>>>();
        }
    }
}
