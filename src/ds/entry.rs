//! Intrusive cache entry.
//!
//! One `Entry` is simultaneously a node of a hash chain (`chain_next`) and a
//! node of the recency list (`list_prev` / `list_next`). Links are
//! [`SlotId`]s into the arena that owns every entry, never references.
//!
//! ```text
//!   ┌──────────────────────────────────────────────┐
//!   │                 Entry<K, V>                  │
//!   ├──────────────────────┬───────────────────────┤
//!   │ key: K               │ owned                 │
//!   │ value: V             │ overwritten in place  │
//!   │ hash: u64            │ fixed at construction │
//!   ├──────────────────────┼───────────────────────┤
//!   │ chain_next           │ HashTable bucket link │
//!   │ list_prev, list_next │ RecencyList links     │
//!   └──────────────────────┴───────────────────────┘
//! ```

use std::fmt;

use crate::ds::slot_arena::SlotId;
use crate::hash::Hashable;

/// Key/value node shared by the hash table and the recency list.
pub struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
    pub(crate) chain_next: Option<SlotId>,
    pub(crate) list_prev: Option<SlotId>,
    pub(crate) list_next: Option<SlotId>,
}

impl<K, V> Entry<K, V> {
    /// Creates an unlinked entry, computing the key digest once.
    pub fn new(key: K, value: V) -> Self
    where
        K: Hashable,
    {
        let hash = key.digest();
        Self::with_hash(key, value, hash)
    }

    /// Creates an unlinked entry with a precomputed digest.
    ///
    /// `hash` must equal `key.digest()`; lookups compare it before comparing keys.
    pub(crate) fn with_hash(key: K, value: V, hash: u64) -> Self {
        Self {
            key,
            value,
            hash,
            chain_next: None,
            list_prev: None,
            list_next: None,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Cached digest of the key.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Swaps in a new value, returning the old one. Links are untouched.
    pub fn replace_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    /// Returns `true` if the entry has no chain or recency links.
    pub fn is_detached(&self) -> bool {
        self.chain_next.is_none() && self.list_prev.is_none() && self.list_next.is_none()
    }

    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }

    pub fn into_value(self) -> V {
        self.value
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("hash", &self.hash)
            .field("chain_next", &self.chain_next)
            .field("list_prev", &self.list_prev)
            .field("list_next", &self.list_next)
            .finish()
    }
}
