//! Insertion-ordered, thread-safe key/value collection.
//!
//! [`OrderedMap`] combines a hash index (constant-time access by key) with a
//! doubly linked order over an arena of entries (constant-time unlink and
//! ordered traversal). A key's position is fixed by its first insertion:
//! inserting an existing key overwrites the value in place, and only removal
//! followed by a fresh insertion moves a key to the end.
//!
//! ## Locking
//!
//! One reader/writer lock guards the index, the arena and both sentinels as a
//! single unit. [`OrderedMap::get`] and [`OrderedMap::values`] take it shared,
//! [`OrderedMap::insert`] and [`OrderedMap::remove`] take it exclusive. There is
//! no per-entry locking and no nested acquisition.
//!
//! Two racing writes are applied one at a time in lock-acquisition order; which
//! one wins is not specified.

mod entries;
mod errors;

use std::{
    borrow::Borrow,
    fmt,
    hash::Hash,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use entries::OrderedEntries;
pub use entries::InsertOutcome;
pub use errors::CollectionError;

use crate::Result;

/// An insertion-ordered map safe to share between threads and tasks.
///
/// Keys and values default to `String`, matching the command payloads the
/// dispatcher applies.
///
/// ```
/// use lightblocks::OrderedMap;
///
/// let map = OrderedMap::new();
/// map.insert("a".to_string(), "1".to_string());
/// map.insert("b".to_string(), "2".to_string());
/// map.insert("a".to_string(), "3".to_string());
///
/// assert_eq!(map.values(), vec!["3", "2"]);
/// assert_eq!(map.get("missing"), None);
/// ```
pub struct OrderedMap<K = String, V = String> {
    entries: RwLock<OrderedEntries<K, V>>,
}

impl<K, V> OrderedMap<K, V> {
    /// Creates an empty map. Both sentinels are allocated up front.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(OrderedEntries::new()),
        }
    }

    // A panicking reader or writer cannot leave the arena half-linked: link
    // patching does no allocation after the first neighbour is rewritten.
    fn read(&self) -> RwLockReadGuard<'_, OrderedEntries<K, V>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, OrderedEntries<K, V>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Hash + Eq + Clone, V: Clone> OrderedMap<K, V> {
    /// Inserts `value` under `key`.
    ///
    /// An absent key is appended after every existing entry. A present key has
    /// its value overwritten without changing its position.
    pub fn insert(&self, key: K, value: V) -> InsertOutcome {
        self.write().insert(key, value)
    }

    /// Removes `key` and returns its value. Removing an absent key does nothing.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.write().remove(key)
    }

    /// Returns the current value for `key`, or `None` if the key is unknown.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read().get(key).cloned()
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read().contains_key(key)
    }

    /// Snapshot of all values in insertion order.
    ///
    /// The snapshot reflects exactly the entries present while the shared lock
    /// was held.
    pub fn values(&self) -> Vec<V> {
        let entries = self.read();
        let mut values = Vec::with_capacity(entries.len());
        values.extend(entries.iter().map(|(_, value)| value.clone()));
        values
    }

    /// Snapshot of all `(key, value)` pairs in insertion order.
    pub fn entries(&self) -> Vec<(K, V)> {
        let entries = self.read();
        entries
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Verifies that the linked order and the key index agree.
    ///
    /// Walks from head to tail under the shared lock, checking back links,
    /// sentinel placement, and that the walk visits exactly `len()` entries.
    pub fn check_links(&self) -> Result<()> {
        Ok(self.read().check_links()?)
    }
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedMap")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
