//! Arena storage for the ordered collection.
//!
//! Every entry lives in a slot of a single `Vec` and is addressed by its slot
//! handle. The order is a doubly linked chain of handles that starts at the
//! [`HEAD`] sentinel and ends at the [`TAIL`] sentinel. Both sentinels exist
//! for the lifetime of the arena, so an empty collection is simply
//! `head.next == TAIL` and `tail.prev == HEAD`.
//!
//! Slots released by removal are pushed on a free list and reused by later
//! insertions. A reused slot is always relinked at the end of the chain.

use std::{
    borrow::Borrow,
    collections::{HashMap, hash_map},
    hash::Hash,
    mem,
};

use super::errors::CollectionError;

/// Handle of the head sentinel.
pub(crate) const HEAD: usize = 0;
/// Handle of the tail sentinel.
pub(crate) const TAIL: usize = 1;

/// What an insertion did to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The key was absent and a new entry was linked before the tail.
    Inserted,
    /// The key was present and its value was overwritten in place.
    Updated,
}

#[derive(Debug)]
enum Record<K, V> {
    Sentinel,
    Live { key: K, value: V },
    Free,
}

#[derive(Debug)]
struct Slot<K, V> {
    prev: usize,
    next: usize,
    record: Record<K, V>,
}

/// Unsynchronized ordered entries: key index plus linked arena.
///
/// All locking happens in [`super::OrderedMap`]; this type only maintains the
/// structural invariants.
#[derive(Debug)]
pub(crate) struct OrderedEntries<K, V> {
    index: HashMap<K, usize>,
    slots: Vec<Slot<K, V>>,
    free: Vec<usize>,
}

impl<K, V> OrderedEntries<K, V> {
    pub(crate) fn new() -> Self {
        let sentinel = || Slot {
            prev: HEAD,
            next: TAIL,
            record: Record::Sentinel,
        };
        Self {
            index: HashMap::new(),
            slots: vec![sentinel(), sentinel()],
            free: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    /// Iterate live entries from head to tail.
    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            current: self.slots[HEAD].next,
            remaining: self.index.len(),
        }
    }

    /// Detach `handle` from both neighbours and release its slot.
    fn unlink(&mut self, handle: usize) -> Record<K, V> {
        self.free.push(handle);
        let (prev, next) = (self.slots[handle].prev, self.slots[handle].next);
        self.slots[prev].next = next;
        self.slots[next].prev = prev;

        let slot = &mut self.slots[handle];
        slot.prev = handle;
        slot.next = handle;
        mem::replace(&mut slot.record, Record::Free)
    }
}

impl<K: Hash + Eq + Clone, V> OrderedEntries<K, V> {
    /// Insert a new entry at the end, or overwrite the value of an existing key.
    pub(crate) fn insert(&mut self, key: K, value: V) -> InsertOutcome {
        let Self { index, slots, free } = self;
        match index.entry(key) {
            hash_map::Entry::Occupied(occupied) => {
                if let Record::Live { value: current, .. } = &mut slots[*occupied.get()].record {
                    *current = value;
                }
                InsertOutcome::Updated
            }
            hash_map::Entry::Vacant(vacant) => {
                let handle = link_last(slots, free, vacant.key().clone(), value);
                vacant.insert(handle);
                InsertOutcome::Inserted
            }
        }
    }
}

/// Place a live record in a free slot (or a new one) and link it before the tail.
fn link_last<K, V>(
    slots: &mut Vec<Slot<K, V>>,
    free: &mut Vec<usize>,
    key: K,
    value: V,
) -> usize {
    let prev = slots[TAIL].prev;
    let slot = Slot {
        prev,
        next: TAIL,
        record: Record::Live { key, value },
    };
    let handle = match free.pop() {
        Some(handle) => {
            slots[handle] = slot;
            handle
        }
        None => {
            slots.push(slot);
            slots.len() - 1
        }
    };
    slots[prev].next = handle;
    slots[TAIL].prev = handle;
    handle
}

impl<K: Hash + Eq, V> OrderedEntries<K, V> {
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let &handle = self.index.get(key)?;
        match &self.slots[handle].record {
            Record::Live { value, .. } => Some(value),
            Record::Sentinel | Record::Free => None,
        }
    }

    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Remove `key` and return its value. Absent keys are a no-op.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.index.remove(key)?;
        match self.unlink(handle) {
            Record::Live { value, .. } => Some(value),
            Record::Sentinel | Record::Free => None,
        }
    }

    /// Walk the chain and verify it agrees with the index.
    pub(crate) fn check_links(&self) -> Result<(), CollectionError> {
        let corruption = |reason: String| CollectionError::LinkCorruption { reason };
        let len = self.index.len();

        for sentinel in [HEAD, TAIL] {
            if !matches!(self.slots[sentinel].record, Record::Sentinel) {
                return Err(corruption(format!("slot {sentinel} is not a sentinel")));
            }
        }
        if self.slots.len() != len + self.free.len() + 2 {
            return Err(corruption(format!(
                "{} slots for {len} entries and {} free slots",
                self.slots.len(),
                self.free.len()
            )));
        }

        let mut seen = 0;
        let mut prev = HEAD;
        let mut current = self.slots[HEAD].next;
        while current != TAIL {
            if seen == len {
                return Err(corruption(format!(
                    "forward walk did not reach tail after {len} entries"
                )));
            }
            let slot = self.slots.get(current).ok_or_else(|| {
                corruption(format!("slot {prev} links to missing slot {current}"))
            })?;
            if slot.prev != prev {
                return Err(corruption(format!(
                    "slot {current} links back to {} but follows {prev}",
                    slot.prev
                )));
            }
            match &slot.record {
                Record::Live { key, .. } if self.index.get(key) == Some(&current) => {}
                Record::Live { .. } => {
                    return Err(corruption(format!(
                        "slot {current} is not the indexed slot for its key"
                    )));
                }
                Record::Sentinel | Record::Free => {
                    return Err(corruption(format!("walk reached non-live slot {current}")));
                }
            }
            seen += 1;
            prev = current;
            current = slot.next;
        }

        if self.slots[TAIL].prev != prev {
            return Err(corruption(format!(
                "tail links back to {} but follows {prev}",
                self.slots[TAIL].prev
            )));
        }
        if seen != len {
            return Err(corruption(format!(
                "walk visited {seen} entries but index holds {len}"
            )));
        }
        Ok(())
    }
}

/// Borrowing iterator over `(key, value)` pairs in insertion order.
pub(crate) struct Iter<'a, K, V> {
    slots: &'a [Slot<K, V>],
    current: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.current != TAIL && self.remaining > 0 {
            let slot = &self.slots[self.current];
            self.current = slot.next;
            if let Record::Live { key, value } = &slot.record {
                self.remaining -= 1;
                return Some((key, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
