//! Fixed-size chained hash table over arena-resident entries.
//!
//! Buckets hold the `SlotId` of the first entry in their chain; each entry
//! points at the next one through its own `chain_next` link. The table never
//! owns entries: every operation takes the arena that does.
//!
//! ## Architecture
//!
//! ```text
//!   buckets (bucket_count = 4)
//!   ┌───┬──────────────────────────────────────────────┐
//!   │ 0 │ None                                         │
//!   │ 1 │ id_7 ──chain_next──► id_2 ──chain_next──► ∅  │
//!   │ 2 │ id_4 ──► ∅                                   │
//!   │ 3 │ None                                         │
//!   └───┴──────────────────────────────────────────────┘
//!
//!   bucket(entry) = entry.hash % bucket_count
//! ```
//!
//! ## Operations
//! - `lookup(key)`: hash, pick bucket, compare cached hash then key.
//! - `insert(entry)`: reject duplicates (entry handed back), else link at bucket head.
//! - `delete(key)` / `unlink(id)`: patch the predecessor link (or the bucket head).
//!
//! The bucket count is fixed at construction. A skewed key set degrades
//! lookups toward O(n); there is no rehashing.

use std::borrow::Borrow;
use std::collections::TryReserveError;

use crate::ds::entry::Entry;
use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::hash::Hashable;

/// Result of [`HashTable::insert`].
#[derive(Debug)]
pub enum InsertOutcome<K, V> {
    /// The entry was stored in the arena and linked at its bucket head.
    Inserted(SlotId),
    /// An entry with an equal key already exists. The candidate was neither
    /// stored nor linked and is returned to the caller.
    Duplicate {
        existing: SlotId,
        rejected: Entry<K, V>,
    },
}

impl<K, V> InsertOutcome<K, V> {
    /// Returns `true` for a fresh insert.
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted(_))
    }

    /// Handle of the entry now holding the key.
    pub fn slot(&self) -> SlotId {
        match self {
            InsertOutcome::Inserted(id) => *id,
            InsertOutcome::Duplicate { existing, .. } => *existing,
        }
    }
}

/// Chained hash table indexing entries by key.
#[derive(Debug)]
pub struct HashTable {
    buckets: Box<[Option<SlotId>]>,
    len: usize,
}

impl HashTable {
    /// Creates a table with `bucket_count` empty buckets.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_count` is zero.
    pub fn new(bucket_count: usize) -> Self {
        assert!(bucket_count > 0, "bucket_count must be greater than 0");
        Self {
            buckets: vec![None; bucket_count].into_boxed_slice(),
            len: 0,
        }
    }

    /// Like [`new`](Self::new), but reports a bucket array that cannot be
    /// allocated instead of aborting.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_count` is zero.
    pub fn try_new(bucket_count: usize) -> Result<Self, TryReserveError> {
        assert!(bucket_count > 0, "bucket_count must be greater than 0");
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(bucket_count)?;
        buckets.resize(bucket_count, None);
        Ok(Self {
            buckets: buckets.into_boxed_slice(),
            len: 0,
        })
    }

    /// Number of linked entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    fn bucket_index(&self, hash: u64) -> usize {
        // u64 modulus keeps the index non-negative and in range on every target
        (hash % self.buckets.len() as u64) as usize
    }

    /// Finds the entry whose key equals `key`.
    pub fn lookup<K, V, Q>(&self, arena: &SlotArena<Entry<K, V>>, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: Hashable + Eq + ?Sized,
    {
        let hash = key.digest();
        self.find(arena, hash, key).map(|(_, id)| id)
    }

    /// Scans the chain for `key`, returning `(predecessor, match)`.
    fn find<K, V, Q>(
        &self,
        arena: &SlotArena<Entry<K, V>>,
        hash: u64,
        key: &Q,
    ) -> Option<(Option<SlotId>, SlotId)>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let mut prev = None;
        let mut current = self.buckets[self.bucket_index(hash)];
        while let Some(id) = current {
            let entry = arena.get(id)?;
            if entry.hash() == hash && <K as Borrow<Q>>::borrow(entry.key()) == key {
                return Some((prev, id));
            }
            prev = Some(id);
            current = entry.chain_next;
        }
        None
    }

    /// Stores and links `entry` unless its key is already present.
    ///
    /// On a duplicate the table and arena are left untouched and the
    /// candidate comes back in [`InsertOutcome::Duplicate`].
    pub fn insert<K, V>(
        &mut self,
        arena: &mut SlotArena<Entry<K, V>>,
        mut entry: Entry<K, V>,
    ) -> InsertOutcome<K, V>
    where
        K: Eq,
    {
        let hash = entry.hash();
        if let Some((_, existing)) = self.find(arena, hash, entry.key()) {
            return InsertOutcome::Duplicate {
                existing,
                rejected: entry,
            };
        }

        let bucket = self.bucket_index(hash);
        entry.chain_next = self.buckets[bucket];
        let id = arena.insert(entry);
        self.buckets[bucket] = Some(id);
        self.len += 1;
        InsertOutcome::Inserted(id)
    }

    /// Unlinks the entry whose key equals `key` from its chain.
    ///
    /// Returns the entry's handle, or `None` if the key is absent. The entry
    /// stays in the arena; releasing it is the caller's job.
    pub fn delete<K, V, Q>(&mut self, arena: &mut SlotArena<Entry<K, V>>, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: Hashable + Eq + ?Sized,
    {
        let hash = key.digest();
        let (prev, id) = self.find(arena, hash, key)?;
        self.splice_out(arena, hash, prev, id);
        Some(id)
    }

    /// Unlinks the entry at `id` from its chain, matching by handle.
    ///
    /// Returns `false` if `id` is vacant or not linked in this table.
    pub fn unlink<K, V>(&mut self, arena: &mut SlotArena<Entry<K, V>>, id: SlotId) -> bool {
        let Some(hash) = arena.get(id).map(Entry::hash) else {
            return false;
        };

        let mut prev = None;
        let mut current = self.buckets[self.bucket_index(hash)];
        while let Some(cur) = current {
            if cur == id {
                self.splice_out(arena, hash, prev, id);
                return true;
            }
            prev = Some(cur);
            current = arena.get(cur).and_then(|entry| entry.chain_next);
        }
        false
    }

    fn splice_out<K, V>(
        &mut self,
        arena: &mut SlotArena<Entry<K, V>>,
        hash: u64,
        prev: Option<SlotId>,
        id: SlotId,
    ) {
        let next = arena
            .get_mut(id)
            .and_then(|entry| entry.chain_next.take());

        match prev {
            Some(prev_id) => {
                if let Some(prev_entry) = arena.get_mut(prev_id) {
                    prev_entry.chain_next = next;
                }
            },
            None => {
                let bucket = self.bucket_index(hash);
                self.buckets[bucket] = next;
            },
        }
        self.len -= 1;
    }

    /// Number of entries chained in `bucket`.
    pub fn chain_len<K, V>(&self, arena: &SlotArena<Entry<K, V>>, bucket: usize) -> usize {
        let mut count = 0;
        let mut current = self.buckets.get(bucket).copied().flatten();
        while let Some(id) = current {
            count += 1;
            current = arena.get(id).and_then(|entry| entry.chain_next);
        }
        count
    }

    /// Empties every bucket. Entries in the arena are not touched.
    pub fn clear(&mut self) {
        self.buckets.fill(None);
        self.len = 0;
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants<K, V>(&self, arena: &SlotArena<Entry<K, V>>)
    where
        K: Eq,
    {
        let mut seen = rustc_hash::FxHashSet::default();
        let mut count = 0usize;

        for (bucket, head) in self.buckets.iter().enumerate() {
            let mut chain: Vec<SlotId> = Vec::new();
            let mut current = *head;
            while let Some(id) = current {
                assert!(seen.insert(id), "slot {id:?} linked twice");
                let entry = arena.get(id).expect("chained slot is vacant");
                assert_eq!(self.bucket_index(entry.hash()), bucket);
                for other in &chain {
                    let other = arena.get(*other).expect("chained slot is vacant");
                    assert!(other.key() != entry.key(), "duplicate key in bucket {bucket}");
                }
                chain.push(id);
                count += 1;
                assert!(count <= self.len, "chain longer than live count");
                current = entry.chain_next;
            }
        }

        assert_eq!(count, self.len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Key whose digest is chosen by the test, to force collisions.
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Colliding {
        name: &'static str,
        hash: u64,
    }

    impl Hashable for Colliding {
        fn digest(&self) -> u64 {
            self.hash
        }
    }

    fn key(name: &'static str, hash: u64) -> Colliding {
        Colliding { name, hash }
    }

    #[test]
    fn lookup_on_empty_table_misses() {
        let table = HashTable::new(11);
        let arena: SlotArena<Entry<String, ()>> = SlotArena::new();
        assert_eq!(table.lookup(&arena, "A"), None);
        assert!(table.is_empty());
    }

    #[test]
    fn insert_then_lookup_finds_entry() {
        let mut table = HashTable::new(11);
        let mut arena = SlotArena::new();

        let outcome = table.insert(&mut arena, Entry::new("bubbles".to_string(), ()));
        assert!(outcome.is_inserted());
        let id = outcome.slot();

        assert_eq!(table.lookup(&arena, "bubbles"), Some(id));
        assert_eq!(table.len(), 1);
        table.debug_validate_invariants(&arena);
    }

    #[test]
    fn many_keys_share_few_buckets() {
        let mut table = HashTable::new(11);
        let mut arena = SlotArena::new();
        let inputs: Vec<String> = (1..=20).map(|i| i.to_string()).collect();

        for input in &inputs {
            assert!(table.insert(&mut arena, Entry::new(input.clone(), 0)).is_inserted());
        }
        for input in &inputs {
            assert!(table.lookup(&arena, input.as_str()).is_some(), "missing {input}");
        }

        let chained: usize = (0..table.bucket_count())
            .map(|b| table.chain_len(&arena, b))
            .sum();
        assert_eq!(chained, 20);
        table.debug_validate_invariants(&arena);
    }

    #[test]
    fn duplicate_insert_returns_candidate_unlinked() {
        let mut table = HashTable::new(4);
        let mut arena = SlotArena::new();

        let first = table.insert(&mut arena, Entry::new("k", 1)).slot();
        match table.insert(&mut arena, Entry::new("k", 2)) {
            InsertOutcome::Duplicate { existing, rejected } => {
                assert_eq!(existing, first);
                assert!(rejected.is_detached());
                assert_eq!(*rejected.value(), 2);
            },
            InsertOutcome::Inserted(_) => panic!("duplicate key was linked"),
        }

        assert_eq!(table.len(), 1);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(first).map(|e| *e.value()), Some(1));
    }

    #[test]
    fn colliding_keys_are_told_apart_by_equality() {
        let mut table = HashTable::new(8);
        let mut arena = SlotArena::new();

        let a = table.insert(&mut arena, Entry::new(key("a", 42), 'a')).slot();
        let b = table.insert(&mut arena, Entry::new(key("b", 42), 'b')).slot();
        let c = table.insert(&mut arena, Entry::new(key("c", 50), 'c')).slot();

        assert_eq!(table.chain_len(&arena, 42 % 8), 3);
        assert_eq!(table.lookup(&arena, &key("a", 42)), Some(a));
        assert_eq!(table.lookup(&arena, &key("b", 42)), Some(b));
        assert_eq!(table.lookup(&arena, &key("c", 50)), Some(c));
        assert_eq!(table.lookup(&arena, &key("d", 42)), None);
    }

    #[test]
    fn delete_head_middle_and_tail_of_chain() {
        let mut table = HashTable::new(1);
        let mut arena = SlotArena::new();

        // single bucket: chain order is reverse insertion (c -> b -> a)
        let a = table.insert(&mut arena, Entry::new("a", ())).slot();
        let b = table.insert(&mut arena, Entry::new("b", ())).slot();
        let c = table.insert(&mut arena, Entry::new("c", ())).slot();

        assert_eq!(table.delete(&mut arena, "b"), Some(b));
        table.debug_validate_invariants(&arena);
        assert_eq!(table.delete(&mut arena, "c"), Some(c));
        table.debug_validate_invariants(&arena);
        assert_eq!(table.lookup(&arena, "a"), Some(a));
        assert_eq!(table.delete(&mut arena, "a"), Some(a));

        assert!(table.is_empty());
        assert_eq!(table.chain_len(&arena, 0), 0);
        // the table only unlinks; slots still belong to the caller
        assert_eq!(arena.len(), 3);
        assert!(arena.get(b).is_some_and(Entry::is_detached));
    }

    #[test]
    fn delete_missing_key_stops_at_chain_end() {
        let mut table = HashTable::new(2);
        let mut arena = SlotArena::new();
        table.insert(&mut arena, Entry::new(key("x", 3), ()));
        table.insert(&mut arena, Entry::new(key("y", 5), ()));

        assert_eq!(table.delete(&mut arena, &key("z", 7)), None);
        assert_eq!(table.delete(&mut arena, &key("z", 0)), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn unlink_by_handle() {
        let mut table = HashTable::new(1);
        let mut arena = SlotArena::new();
        let a = table.insert(&mut arena, Entry::new(1u32, ())).slot();
        let b = table.insert(&mut arena, Entry::new(2u32, ())).slot();

        assert!(table.unlink(&mut arena, a));
        assert!(!table.unlink(&mut arena, a));
        assert_eq!(table.lookup(&arena, &1u32), None);
        assert_eq!(table.lookup(&arena, &2u32), Some(b));

        arena.remove(a);
        assert!(!table.unlink(&mut arena, a));
        table.debug_validate_invariants(&arena);
    }

    #[test]
    fn clear_empties_buckets() {
        let mut table = HashTable::new(3);
        let mut arena = SlotArena::new();
        for i in 0..10u64 {
            table.insert(&mut arena, Entry::new(i, i));
        }
        table.clear();
        arena.clear();
        assert!(table.is_empty());
        assert_eq!(table.lookup(&arena, &3u64), None);
        table.debug_validate_invariants(&arena);
    }

    #[test]
    fn large_digest_maps_into_range() {
        let mut table = HashTable::new(7);
        let mut arena = SlotArena::new();
        let id = table.insert(&mut arena, Entry::new(key("max", u64::MAX), ())).slot();
        assert_eq!(table.chain_len(&arena, (u64::MAX % 7) as usize), 1);
        assert_eq!(table.lookup(&arena, &key("max", u64::MAX)), Some(id));
    }

    #[test]
    #[should_panic(expected = "bucket_count")]
    fn zero_buckets_panics() {
        let _ = HashTable::new(0);
    }

    #[test]
    fn try_new_reports_unallocatable_bucket_array() {
        assert!(HashTable::try_new(usize::MAX / 2).is_err());
        let table = HashTable::try_new(5).unwrap();
        assert_eq!(table.bucket_count(), 5);
        assert!(table.is_empty());
    }
}
