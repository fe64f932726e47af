//! Slot arena with stable handles and slot reuse.
//!
//! Entries live in a `Vec<Option<T>>`; a [`SlotId`] is an index into it.
//! Released slots go onto a free list and are handed out again by the next
//! `insert`, so the arena never shrinks while the cache is live and the
//! handles held by the hash table and recency list stay valid until the
//! owning entry is removed.
//!
//! ```text
//!   slots:     [ Some(A) | None | Some(C) | Some(D) ]
//!   free_list: [ 1 ]
//!
//!   insert(E) -> SlotId(1)
//!   slots:     [ Some(A) | Some(E) | Some(C) | Some(D) ]
//! ```

use std::collections::TryReserveError;
use std::num::NonZeroUsize;

/// Stable handle to an arena slot.
///
/// Stored as `index + 1` so that `Option<SlotId>` is pointer-sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(NonZeroUsize);

impl SlotId {
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        Self(NonZeroUsize::MIN.saturating_add(index))
    }

    /// Returns the raw slot index.
    #[inline]
    pub fn index(self) -> usize {
        self.0.get() - 1
    }
}

/// Arena that owns values and addresses them by [`SlotId`].
#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Option<T>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Creates an arena with room for `capacity` values before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Like [`with_capacity`](Self::with_capacity), but reports allocation
    /// failure instead of aborting.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;
        Ok(Self {
            slots,
            free_list: Vec::new(),
            len: 0,
        })
    }

    /// Stores `value`, reusing a released slot when one is available.
    pub fn insert(&mut self, value: T) -> SlotId {
        let idx = match self.free_list.pop() {
            Some(idx) => {
                debug_assert!(self.slots[idx].is_none(), "free slot {idx} is occupied");
                self.slots[idx] = Some(value);
                idx
            },
            None => {
                self.slots.push(Some(value));
                self.slots.len() - 1
            },
        };
        self.len += 1;
        SlotId::new(idx)
    }

    /// Takes the value out of `id` and releases the slot.
    ///
    /// Returns `None` for a vacant or out-of-range slot, so a double release
    /// never puts the same index on the free list twice.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let value = self.slots.get_mut(id.index())?.take()?;
        self.free_list.push(id.index());
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots ever allocated (occupied + free).
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of released slots waiting for reuse.
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Drops every value and forgets all handles.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.len = 0;
    }

    /// Iterates occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|value| (SlotId::new(idx), value)))
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
