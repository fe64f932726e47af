#![no_main]

use libfuzzer_sys::fuzz_target;
use lrukit::builder::CacheBuilder;

// Fuzz arbitrary operation sequences on LruCache
//
// The first two bytes pick capacity and bucket count; the rest are
// (op, key, value) triples over a small key space so that updates,
// collisions and evictions all happen often.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let capacity = usize::from(data[0] % 32) + 1;
    let buckets = usize::from(data[1] % 16) + 1;
    let mut cache = CacheBuilder::new(capacity).bucket_count(buckets).build();

    for chunk in data[2..].chunks_exact(3) {
        let op = chunk[0] % 8;
        let key = chunk[1] % 48;
        let value = chunk[2];

        match op {
            0 | 1 => {
                let existed = cache.contains(&key);
                let old_len = cache.size();
                let fresh = cache.set(key, value);

                assert_eq!(fresh, !existed);
                assert_eq!(cache.peek_mru(), Some((&key, &value)));
                if existed {
                    assert_eq!(cache.size(), old_len);
                } else {
                    assert_eq!(cache.size(), (old_len + 1).min(capacity));
                }
            },
            2 | 3 => {
                let expected = cache.peek(&key).copied();
                assert_eq!(cache.get(&key).copied(), expected);
                if expected.is_some() {
                    assert_eq!(cache.recency_rank(&key), Some(0));
                }
            },
            4 => {
                let old_len = cache.size();
                if cache.remove(&key).is_some() {
                    assert_eq!(cache.size(), old_len - 1);
                    assert!(!cache.contains(&key));
                }
            },
            5 => {
                if cache.touch(&key) {
                    assert_eq!(cache.peek_mru().map(|(k, _)| *k), Some(key));
                }
            },
            6 => {
                let expected = cache.peek_lru().map(|(k, v)| (*k, *v));
                assert_eq!(cache.pop_lru(), expected);
            },
            _ => {
                if value == 0 {
                    cache.clear();
                    assert!(cache.is_empty());
                }
            },
        }

        assert!(cache.size() <= capacity);
    }

    assert!(cache.check_invariants().is_ok());
    assert_eq!(cache.iter().count(), cache.size());
});
