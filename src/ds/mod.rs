pub mod entry;
pub mod hash_table;
pub mod recency_list;
pub mod slot_arena;

pub use entry::Entry;
pub use hash_table::{HashTable, InsertOutcome};
pub use recency_list::{RecencyIter, RecencyList};
pub use slot_arena::{SlotArena, SlotId};
