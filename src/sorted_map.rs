//! The sorted-map contract an index must satisfy to back a keyed table.
//!
//! [`BpTreeMap`] is the production implementation. The standard library's
//! [`BTreeMap`] implements it too, with the same no-overwrite rule, so a table can
//! switch index structures and tests can compare against it.

use alloc::collections::BTreeMap;
use alloc::collections::btree_map;
use core::ops::Bound;

use crate::bptree_map::{self, BpTreeMap};
use crate::error::DuplicateKeyError;

/// An ordered key-value index with unique keys and half-open range queries.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use bptree_index::{BpTreeMap, SortedMap};
///
/// fn load<M: SortedMap<u32, u32> + Default>() -> M {
///     let mut index = M::default();
///     for k in [5, 1, 9, 3, 7] {
///         index.put(k, k * 100).unwrap();
///     }
///     index
/// }
///
/// fn middle<M: SortedMap<u32, u32>>(index: &M) -> Vec<u32> {
///     index.sub_map(&3, &9).map(|(k, _)| *k).collect()
/// }
///
/// assert_eq!(middle(&load::<BpTreeMap<u32, u32>>()), [3, 5, 7]);
/// assert_eq!(middle(&load::<BTreeMap<u32, u32>>()), [3, 5, 7]);
/// ```
pub trait SortedMap<K, V> {
    /// Iterator over every entry in ascending key order.
    type Entries<'a>: Iterator<Item = (&'a K, &'a V)>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    /// Iterator over the entries of a key range in ascending key order.
    type Range<'a>: Iterator<Item = (&'a K, &'a V)>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    /// Looks up the value stored under `key`.
    fn get(&self, key: &K) -> Option<&V>;

    /// Inserts a new entry.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateKeyError`] carrying the pair if `key` is already present.
    /// The index is left unchanged.
    fn put(&mut self, key: K, value: V) -> Result<(), DuplicateKeyError<K, V>>;

    /// Number of entries.
    fn size(&self) -> usize;

    /// The smallest key.
    fn first_key(&self) -> Option<&K>;

    /// The largest key.
    fn last_key(&self) -> Option<&K>;

    /// All entries in key order.
    fn entries(&self) -> Self::Entries<'_>;

    /// Entries with keys `< to`.
    fn head_map(&self, to: &K) -> Self::Range<'_>;

    /// Entries with keys `>= from`.
    fn tail_map(&self, from: &K) -> Self::Range<'_>;

    /// Entries with keys in `[from, to)`.
    ///
    /// # Panics
    ///
    /// Panics if `from > to`.
    fn sub_map(&self, from: &K, to: &K) -> Self::Range<'_>;
}

impl<K: Ord + Clone, V> SortedMap<K, V> for BpTreeMap<K, V> {
    type Entries<'a>
        = bptree_map::Iter<'a, K, V>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    type Range<'a>
        = bptree_map::Range<'a, K, V>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    fn get(&self, key: &K) -> Option<&V> {
        BpTreeMap::get(self, key)
    }

    fn put(&mut self, key: K, value: V) -> Result<(), DuplicateKeyError<K, V>> {
        BpTreeMap::put(self, key, value)
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn first_key(&self) -> Option<&K> {
        BpTreeMap::first_key(self)
    }

    fn last_key(&self) -> Option<&K> {
        BpTreeMap::last_key(self)
    }

    fn entries(&self) -> Self::Entries<'_> {
        self.iter()
    }

    fn head_map(&self, to: &K) -> Self::Range<'_> {
        BpTreeMap::head_map(self, to)
    }

    fn tail_map(&self, from: &K) -> Self::Range<'_> {
        BpTreeMap::tail_map(self, from)
    }

    fn sub_map(&self, from: &K, to: &K) -> Self::Range<'_> {
        BpTreeMap::sub_map(self, from, to)
    }
}

impl<K: Ord, V> SortedMap<K, V> for BTreeMap<K, V> {
    type Entries<'a>
        = btree_map::Iter<'a, K, V>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    type Range<'a>
        = btree_map::Range<'a, K, V>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    fn get(&self, key: &K) -> Option<&V> {
        BTreeMap::get(self, key)
    }

    fn put(&mut self, key: K, value: V) -> Result<(), DuplicateKeyError<K, V>> {
        if self.contains_key(&key) {
            return Err(DuplicateKeyError::new(key, value));
        }
        self.insert(key, value);
        Ok(())
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn first_key(&self) -> Option<&K> {
        self.first_key_value().map(|(k, _)| k)
    }

    fn last_key(&self) -> Option<&K> {
        self.last_key_value().map(|(k, _)| k)
    }

    fn entries(&self) -> Self::Entries<'_> {
        self.iter()
    }

    fn head_map(&self, to: &K) -> Self::Range<'_> {
        self.range::<K, _>((Bound::Unbounded, Bound::Excluded(to)))
    }

    fn tail_map(&self, from: &K) -> Self::Range<'_> {
        self.range::<K, _>((Bound::Included(from), Bound::Unbounded))
    }

    fn sub_map(&self, from: &K, to: &K) -> Self::Range<'_> {
        self.range::<K, _>((Bound::Included(from), Bound::Excluded(to)))
    }
}
