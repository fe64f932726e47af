//! Intrusive recency list threaded through arena entries.
//!
//! The list itself only stores `head`, `tail` and a length; the `prev`/`next`
//! links live inside each [`Entry`]. The same entries are chained into the
//! hash table, so the list never allocates or frees anything.
//!
//! ## Architecture
//!
//! ```text
//!   head (MRU)                                      tail (LRU)
//!     │                                               │
//!     ▼                                               ▼
//!   [id_3] ◄──list_prev── [id_1] ◄──list_prev── [id_2]
//!   [id_3] ──list_next──► [id_1] ──list_next──► [id_2]
//! ```
//!
//! ## Operations
//! - `push_front(id)`: link an unlinked entry at the head
//! - `remove(id)`: detach from anywhere, fixing neighbours and head/tail
//! - `move_to_front(id)`: detach + attach at head, no-op when already head
//! - `pop_back()`: detach and return the tail (eviction victim)
//!
//! All of the above are O(1). `iter` walks head to tail in O(n).

use crate::ds::entry::Entry;
use crate::ds::slot_arena::{SlotArena, SlotId};

/// Head/tail anchors of a doubly linked list whose links live in entries.
#[derive(Debug, Default)]
pub struct RecencyList {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
}

impl RecencyList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Most recently used entry.
    pub fn front(&self) -> Option<SlotId> {
        self.head
    }

    /// Least recently used entry.
    pub fn back(&self) -> Option<SlotId> {
        self.tail
    }

    /// Returns `true` if `id` is currently threaded into this list.
    ///
    /// A linked entry either has a neighbour or is the sole element.
    pub fn is_linked<K, V>(&self, arena: &SlotArena<Entry<K, V>>, id: SlotId) -> bool {
        match arena.get(id) {
            Some(entry) => {
                entry.list_prev.is_some() || entry.list_next.is_some() || self.head == Some(id)
            },
            None => false,
        }
    }

    /// Links `id` at the head.
    ///
    /// An entry that is already linked is moved instead, so it can never
    /// appear twice.
    pub fn push_front<K, V>(&mut self, arena: &mut SlotArena<Entry<K, V>>, id: SlotId) {
        if self.is_linked(arena, id) {
            self.move_to_front(arena, id);
            return;
        }
        if self.attach_front(arena, id).is_some() {
            self.len += 1;
        }
    }

    /// Unlinks `id` from wherever it sits.
    ///
    /// Returns `false` if the entry was not linked; its own links are cleared
    /// either way.
    pub fn remove<K, V>(&mut self, arena: &mut SlotArena<Entry<K, V>>, id: SlotId) -> bool {
        if !self.is_linked(arena, id) {
            if let Some(entry) = arena.get_mut(id) {
                entry.list_prev = None;
                entry.list_next = None;
            }
            return false;
        }
        self.detach(arena, id);
        self.len -= 1;
        true
    }

    /// Moves a linked entry to the head; returns `false` if it is not linked.
    pub fn move_to_front<K, V>(&mut self, arena: &mut SlotArena<Entry<K, V>>, id: SlotId) -> bool {
        if Some(id) == self.head {
            return true;
        }
        if !self.is_linked(arena, id) {
            return false;
        }
        self.detach(arena, id);
        self.attach_front(arena, id);
        true
    }

    /// Unlinks and returns the tail entry.
    pub fn pop_back<K, V>(&mut self, arena: &mut SlotArena<Entry<K, V>>) -> Option<SlotId> {
        let id = self.tail?;
        self.detach(arena, id)?;
        self.len -= 1;
        Some(id)
    }

    /// Forgets every link anchor. Entry links are left for the caller to drop.
    pub fn clear(&mut self) {
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterates handles from head (MRU) to tail (LRU).
    pub fn iter<'a, K, V>(&self, arena: &'a SlotArena<Entry<K, V>>) -> RecencyIter<'a, K, V> {
        RecencyIter {
            arena,
            current: self.head,
            remaining: self.len,
        }
    }

    /// Position of `id` counted from the head, O(n).
    pub fn rank<K, V>(&self, arena: &SlotArena<Entry<K, V>>, id: SlotId) -> Option<usize> {
        self.iter(arena).position(|cur| cur == id)
    }

    fn detach<K, V>(&mut self, arena: &mut SlotArena<Entry<K, V>>, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let entry = arena.get(id)?;
            (entry.list_prev, entry.list_next)
        };

        match prev {
            Some(prev_id) => {
                if let Some(prev_entry) = arena.get_mut(prev_id) {
                    prev_entry.list_next = next;
                }
            },
            None => self.head = next,
        }

        match next {
            Some(next_id) => {
                if let Some(next_entry) = arena.get_mut(next_id) {
                    next_entry.list_prev = prev;
                }
            },
            None => self.tail = prev,
        }

        if let Some(entry) = arena.get_mut(id) {
            entry.list_prev = None;
            entry.list_next = None;
        }

        Some(())
    }

    fn attach_front<K, V>(&mut self, arena: &mut SlotArena<Entry<K, V>>, id: SlotId) -> Option<()> {
        let old_head = self.head;
        let entry = arena.get_mut(id)?;
        entry.list_prev = None;
        entry.list_next = old_head;

        match old_head {
            Some(old_head) => {
                if let Some(head_entry) = arena.get_mut(old_head) {
                    head_entry.list_prev = Some(id);
                }
            },
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        Some(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants<K, V>(&self, arena: &SlotArena<Entry<K, V>>) {
        if self.head.is_none() || self.tail.is_none() {
            assert!(self.head.is_none());
            assert!(self.tail.is_none());
            assert_eq!(self.len, 0);
            return;
        }

        let mut seen = rustc_hash::FxHashSet::default();
        let mut count = 0usize;
        let mut current = self.head;
        let mut prev = None;

        while let Some(id) = current {
            assert!(seen.insert(id), "cycle through {id:?}");
            let entry = arena.get(id).expect("linked slot is vacant");
            assert_eq!(entry.list_prev, prev);
            match entry.list_next {
                Some(next_id) => {
                    let next_entry = arena.get(next_id).expect("next slot is vacant");
                    assert_eq!(next_entry.list_prev, Some(id));
                },
                None => assert_eq!(self.tail, Some(id)),
            }

            prev = Some(id);
            current = entry.list_next;
            count += 1;
            assert!(count <= self.len);
        }

        assert_eq!(count, self.len);

        // the backward walk must cover the same set
        let mut back_count = 0usize;
        let mut current = self.tail;
        while let Some(id) = current {
            assert!(seen.contains(&id));
            back_count += 1;
            assert!(back_count <= self.len);
            current = arena.get(id).and_then(|entry| entry.list_prev);
        }
        assert_eq!(back_count, self.len);
    }
}

/// Iterator over list handles from MRU to LRU.
pub struct RecencyIter<'a, K, V> {
    arena: &'a SlotArena<Entry<K, V>>,
    current: Option<SlotId>,
    remaining: usize,
}

impl<K, V> Iterator for RecencyIter<'_, K, V> {
    type Item = SlotId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let entry = self.arena.get(id)?;
        self.current = entry.list_next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
