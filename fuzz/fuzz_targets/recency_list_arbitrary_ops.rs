#![no_main]

use libfuzzer_sys::fuzz_target;
use lrukit::ds::{Entry, RecencyList, SlotArena};

// Fuzz arbitrary operation sequences on RecencyList
//
// A fixed pool of arena entries is linked, moved and unlinked in random
// order; the list must stay consistent with a VecDeque model.
fuzz_target!(|data: &[u8]| {
    let mut arena = SlotArena::new();
    let ids: Vec<_> = (0u8..16).map(|k| arena.insert(Entry::new(k, ()))).collect();
    let mut list = RecencyList::new();
    let mut model: std::collections::VecDeque<usize> = std::collections::VecDeque::new();

    for pair in data.chunks_exact(2) {
        let op = pair[0] % 4;
        let slot = usize::from(pair[1]) % ids.len();
        let id = ids[slot];

        match op {
            0 => {
                list.push_front(&mut arena, id);
                model.retain(|&s| s != slot);
                model.push_front(slot);
            },
            1 => {
                let linked = model.contains(&slot);
                assert_eq!(list.remove(&mut arena, id), linked);
                model.retain(|&s| s != slot);
            },
            2 => {
                let linked = model.contains(&slot);
                assert_eq!(list.move_to_front(&mut arena, id), linked);
                if linked {
                    model.retain(|&s| s != slot);
                    model.push_front(slot);
                }
            },
            _ => {
                let popped = list.pop_back(&mut arena);
                assert_eq!(popped, model.pop_back().map(|s| ids[s]));
            },
        }

        assert_eq!(list.len(), model.len());
        let walked: Vec<_> = list.iter(&arena).collect();
        let expected: Vec<_> = model.iter().map(|&s| ids[s]).collect();
        assert_eq!(walked, expected);
    }

    list.debug_validate_invariants(&arena);
});
