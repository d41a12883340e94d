//! Tests for OrderedMap under concurrent use from many threads.

use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use lightblocks::OrderedMap;

use crate::helpers::*;

const THREADS: usize = 10;

#[test]
fn test_concurrent_insert_and_remove_same_keys() {
    let map = OrderedMap::new();

    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                map.insert("five".to_string(), "five_value".to_string());
                map.remove("three");
            });
        }
    });

    assert_eq!(map.values(), vec!["five_value"]);
    map.check_links().unwrap();
}

#[test]
fn test_concurrent_insertion_of_distinct_keys() {
    let map = OrderedMap::new();

    thread::scope(|scope| {
        for i in 0..THREADS {
            let map = &map;
            scope.spawn(move || {
                map.insert(i.to_string(), format!("{i}_value"));
            });
        }
    });

    // Order among racing inserts is unspecified
    let mut values = map.values();
    values.sort();
    let mut expected: Vec<String> = (0..THREADS).map(|i| format!("{i}_value")).collect();
    expected.sort();
    assert_eq!(values, expected);
    assert_eq!(map.len(), THREADS);
    map.check_links().unwrap();
}

#[test]
fn test_concurrent_removal() {
    let map = numbered_map(10);

    thread::scope(|scope| {
        for i in 0..5 {
            let map = &map;
            scope.spawn(move || {
                map.remove(i.to_string().as_str());
            });
        }
    });

    assert_eq!(
        map.values(),
        vec!["5_value", "6_value", "7_value", "8_value", "9_value"]
    );
    map.check_links().unwrap();
}

#[test]
fn test_concurrent_mixed_operations() {
    let map = numbered_map(10);

    thread::scope(|scope| {
        for i in 0..10 {
            let map = &map;
            scope.spawn(move || {
                let key = i.to_string();
                if i % 2 == 0 {
                    map.remove(key.as_str());
                } else {
                    map.insert(key.clone(), format!("{key}_value"));
                }
            });
        }
    });

    // Updates of existing keys never move them
    assert_eq!(
        map.values(),
        vec!["1_value", "3_value", "5_value", "7_value", "9_value"]
    );
}

#[test]
fn test_many_concurrent_inserts_are_not_lost() {
    const PER_THREAD: usize = 500;
    let map = OrderedMap::new();

    thread::scope(|scope| {
        for t in 0..THREADS {
            let map = &map;
            scope.spawn(move || {
                for i in 0..PER_THREAD {
                    map.insert(format!("{t}-{i}"), format!("{t}-{i}"));
                }
            });
        }
    });

    assert_eq!(map.len(), THREADS * PER_THREAD);
    let values = map.values();
    assert_eq!(values.len(), THREADS * PER_THREAD);

    // Each thread's own inserts keep their relative order
    for t in 0..THREADS {
        let prefix = format!("{t}-");
        let own: Vec<usize> = values
            .iter()
            .filter_map(|v| v.strip_prefix(&prefix))
            .map(|i| i.parse().unwrap())
            .collect();
        assert_eq!(own, (0..PER_THREAD).collect::<Vec<_>>());
    }
    map.check_links().unwrap();
}

/// Readers taking snapshots while a writer inserts and a remover unlinks must
/// never see a value twice, out of order, or a broken chain.
#[test]
fn test_reads_never_observe_torn_links() {
    const KEYS: usize = 2_000;
    let map = Arc::new(OrderedMap::new());
    let done = Arc::new(AtomicBool::new(false));

    let inserter = {
        let map = Arc::clone(&map);
        thread::spawn(move || {
            for i in 0..KEYS {
                map.insert(format!("k{i}"), format!("{i:06}"));
            }
        })
    };

    let remover = {
        let map = Arc::clone(&map);
        thread::spawn(move || {
            for i in (0..KEYS).step_by(2) {
                let key = format!("k{i}");
                while !map.contains_key(key.as_str()) {
                    thread::yield_now();
                }
                assert!(map.remove(key.as_str()).is_some());
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let map = Arc::clone(&map);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut snapshots = 0;
                while !done.load(Ordering::Acquire) || snapshots == 0 {
                    let values = map.values();
                    assert!(
                        values.windows(2).all(|w| w[0] < w[1]),
                        "snapshot out of insertion order"
                    );
                    assert_eq!(
                        values.iter().collect::<HashSet<_>>().len(),
                        values.len(),
                        "snapshot repeats a value"
                    );
                    map.check_links().unwrap();
                    snapshots += 1;
                }
                snapshots
            })
        })
        .collect();

    inserter.join().unwrap();
    remover.join().unwrap();
    done.store(true, Ordering::Release);
    for reader in readers {
        assert!(reader.join().unwrap() > 0);
    }

    let expected: Vec<String> = (1..KEYS).step_by(2).map(|i| format!("{i:06}")).collect();
    assert_eq!(map.values(), expected);
    map.check_links().unwrap();
}
