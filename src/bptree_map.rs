use core::borrow::Borrow;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{Bound, Index, RangeBounds};

use crate::config::TreeConfig;
use crate::error::{ConfigError, DuplicateKeyError, InvariantViolation};
use crate::raw::RawBpTreeMap;

mod iter;
mod probe;
mod structure;

pub use iter::{IntoIter, Iter, Keys, Range, Values};
pub use probe::Probe;
pub use structure::Structure;

/// Validates that the start bound does not exceed the end bound.
///
/// # Panics
///
/// Panics if `start > end` or if `start == end` and both bounds are `Excluded`.
fn validate_range_bounds<T, R>(range: &R)
where
    T: ?Sized + Ord,
    R: RangeBounds<T>,
{
    if let (Bound::Included(start) | Bound::Excluded(start), Bound::Included(end) | Bound::Excluded(end)) =
        (range.start_bound(), range.end_bound())
    {
        let valid =
            if matches!(range.start_bound(), Bound::Excluded(_)) && matches!(range.end_bound(), Bound::Excluded(_)) {
                start < end
            } else {
                start <= end
            };
        assert!(valid, "range start is greater than range end in BpTreeMap");
    }
}

/// An ordered index based on a [B+Tree].
///
/// Keys must have a [total order] (the [`Ord`] trait). All entries live in the leaves,
/// which are linked left to right into a chain; internal nodes only hold separator
/// keys that route a lookup to the right leaf. Iteration and range queries descend
/// at most once and then follow the chain.
///
/// The index is built for primary keys: an existing key is never overwritten.
/// [`put`](Self::put) rejects a duplicate and hands the pair back.
///
/// It is a logic error for a key to be modified in such a way that the key's ordering
/// relative to any other key changes while it is in the map. This is normally only
/// possible through [`Cell`], [`RefCell`], global state, I/O, or unsafe code. The
/// resulting behavior is not specified but stays confined to the map that observed it.
///
/// # Examples
///
/// ```
/// use bptree_index::BpTreeMap;
///
/// let mut squares = BpTreeMap::new();
/// for k in (1..=19).step_by(2) {
///     squares.put(k, k * k).unwrap();
/// }
///
/// assert_eq!(squares.len(), 10);
/// assert_eq!(squares.first_key(), Some(&1));
/// assert_eq!(squares.last_key(), Some(&19));
/// assert_eq!(squares[&7], 49);
///
/// // Half-open: 13 is not part of the result.
/// let middle: Vec<_> = squares.sub_map(&5, &13).map(|(k, _)| *k).collect();
/// assert_eq!(middle, [5, 7, 9, 11]);
///
/// // Keys are unique.
/// assert!(squares.put(7, 0).is_err());
/// assert_eq!(squares[&7], 49);
/// ```
///
/// [B+Tree]: https://en.wikipedia.org/wiki/B%2B_tree
/// [total order]: https://en.wikipedia.org/wiki/Total_order
/// [`Cell`]: core::cell::Cell
/// [`RefCell`]: core::cell::RefCell
pub struct BpTreeMap<K, V> {
    raw: RawBpTreeMap<K, V>,
}

impl<K, V> BpTreeMap<K, V> {
    /// Makes a new, empty `BpTreeMap` of the default order.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::{BpTreeMap, DEFAULT_ORDER};
    ///
    /// let mut map = BpTreeMap::new();
    /// map.put(1, "a").unwrap();
    /// assert_eq!(map.order(), DEFAULT_ORDER);
    /// ```
    #[must_use]
    pub fn new() -> BpTreeMap<K, V> {
        BpTreeMap {
            raw: RawBpTreeMap::new(TreeConfig::new()),
        }
    }

    /// Makes a new, empty `BpTreeMap` whose nodes hold at most `order` children.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `order` cannot describe a working tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::{BpTreeMap, ConfigError};
    ///
    /// let map: BpTreeMap<i32, i32> = BpTreeMap::with_order(16).unwrap();
    /// assert_eq!(map.order(), 16);
    ///
    /// let err = BpTreeMap::<i32, i32>::with_order(2).unwrap_err();
    /// assert_eq!(err, ConfigError::OrderTooSmall { order: 2, min: 3 });
    /// ```
    pub fn with_order(order: usize) -> Result<BpTreeMap<K, V>, ConfigError> {
        Self::with_config(TreeConfig::new().with_order(order))
    }

    /// Makes a new, empty `BpTreeMap` with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if [`TreeConfig::validate`] rejects the configuration.
    pub fn with_config(config: TreeConfig) -> Result<BpTreeMap<K, V>, ConfigError> {
        config.validate()?;
        Ok(BpTreeMap {
            raw: RawBpTreeMap::new(config),
        })
    }

    /// Returns the configuration the map was built with.
    #[must_use]
    pub fn config(&self) -> &TreeConfig {
        self.raw.config()
    }

    /// Returns the fanout: the maximum number of children of an internal node.
    #[must_use]
    pub fn order(&self) -> usize {
        self.raw.config().order()
    }

    /// Returns the number of levels in the tree, counting the leaf level.
    ///
    /// An empty map has height 1: its root is a single empty leaf.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BpTreeMap;
    ///
    /// let mut map = BpTreeMap::new();
    /// assert_eq!(map.height(), 1);
    /// for k in 0..5 {
    ///     map.put(k, ()).unwrap();
    /// }
    /// // The fifth key overflows the root leaf of an order-5 tree.
    /// assert_eq!(map.height(), 2);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns the number of nodes in the tree, leaves and internal nodes together.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.raw.node_count()
    }

    /// Returns the number of elements in the map.
    ///
    /// The count is kept up to date on every insertion; it does not walk the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BpTreeMap;
    ///
    /// let mut a = BpTreeMap::new();
    /// assert_eq!(a.len(), 0);
    /// a.put(1, "a").unwrap();
    /// assert_eq!(a.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Same as [`len`](Self::len).
    #[must_use]
    pub const fn size(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the map, removing all elements. The order is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BpTreeMap;
    ///
    /// let mut a = BpTreeMap::new();
    /// a.put(1, "a").unwrap();
    /// a.clear();
    /// assert!(a.is_empty());
    /// assert_eq!(a.height(), 1);
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the first key-value pair in the map, the one with the minimum key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BpTreeMap;
    ///
    /// let mut map = BpTreeMap::new();
    /// assert_eq!(map.first_key_value(), None);
    /// map.put(1, "b").unwrap();
    /// map.put(2, "a").unwrap();
    /// assert_eq!(map.first_key_value(), Some((&1, &"b")));
    /// ```
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first_key_value()
    }

    /// Returns the last key-value pair in the map, the one with the maximum key.
    ///
    /// Read from the leaf at the end of the chain, without a descent.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last_key_value()
    }

    /// Returns the minimum key.
    #[must_use]
    pub fn first_key(&self) -> Option<&K> {
        self.first_key_value().map(|(k, _)| k)
    }

    /// Returns the maximum key.
    #[must_use]
    pub fn last_key(&self) -> Option<&K> {
        self.last_key_value().map(|(k, _)| k)
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// The iterator is lazy and can be cloned or requested again to restart.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BpTreeMap;
    ///
    /// let mut map = BpTreeMap::new();
    /// for k in (2..=20).rev().step_by(2) {
    ///     map.put(k, k * 10).unwrap();
    /// }
    ///
    /// let keys: Vec<_> = map.iter().map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [2, 4, 6, 8, 10, 12, 14, 16, 18, 20]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.raw)
    }

    /// Same as [`iter`](Self::iter).
    pub fn entries(&self) -> Iter<'_, K, V> {
        self.iter()
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns a printable view of the node layout, one node per line.
    ///
    /// See [`Structure`] for the format.
    pub fn structure(&self) -> Structure<'_, K, V> {
        Structure::new(&self.raw)
    }
}

impl<K, V> BpTreeMap<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    ///
    /// # Complexity
    ///
    /// O(log n): one node per level, each scanned linearly.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BpTreeMap;
    ///
    /// let mut map = BpTreeMap::new();
    /// map.put(1, "a").unwrap();
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.raw.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the key-value pair corresponding to the supplied key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BpTreeMap;
    ///
    /// let mut map = BpTreeMap::new();
    /// map.put(String::from("pk"), 1).unwrap();
    /// assert_eq!(map.get_key_value("pk"), Some((&String::from("pk"), &1)));
    /// ```
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.raw.get_key_value(key)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.raw.get_key_value(key).is_some()
    }

    /// Looks up a key and reports how many nodes the lookup read.
    ///
    /// See [`Probe`].
    pub fn probe<Q>(&self, key: &Q) -> Probe<'_, V>
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        let (entry, nodes_visited) = self.raw.probe(key);
        Probe::new(entry.map(|(_, v)| v), nodes_visited)
    }

    /// Constructs an iterator over a sub-range of entries in the map.
    ///
    /// `range(min..max)` yields entries from `min` (inclusive) to `max` (exclusive).
    /// The range may also be given as `(Bound<T>, Bound<T>)`.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`.
    /// Panics if range `start == end` and both bounds are `Excluded`.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::ops::Bound::{Excluded, Included};
    /// use bptree_index::BpTreeMap;
    ///
    /// let map: BpTreeMap<_, _> = [(3, "a"), (5, "b"), (8, "c")].into_iter().collect();
    /// let found: Vec<_> = map.range((Excluded(&3), Included(&8))).collect();
    /// assert_eq!(found, [(&5, &"b"), (&8, &"c")]);
    /// assert_eq!(Some((&5, &"b")), map.range(4..).next());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to position each end; each step after that is O(1).
    pub fn range<T, R>(&self, range: R) -> Range<'_, K, V>
    where
        T: ?Sized + Ord,
        K: Borrow<T> + Ord,
        R: RangeBounds<T>,
    {
        validate_range_bounds(&range);

        let front = self.raw.start_position(range.start_bound());
        let end = self.raw.end_position(range.end_bound());
        Range::new(&self.raw, front, end)
    }

    /// Entries with keys strictly less than `to`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BpTreeMap;
    ///
    /// let map: BpTreeMap<_, _> = (1..=19).step_by(2).map(|k| (k, k * k)).collect();
    /// let head: Vec<_> = map.head_map(&12).collect();
    /// assert_eq!(head, [(&1, &1), (&3, &9), (&5, &25), (&7, &49), (&9, &81), (&11, &121)]);
    /// ```
    pub fn head_map<Q>(&self, to: &Q) -> Range<'_, K, V>
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.range::<Q, _>((Bound::Unbounded, Bound::Excluded(to)))
    }

    /// Entries with keys greater than or equal to `from`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BpTreeMap;
    ///
    /// let map: BpTreeMap<_, _> = (1..=19).step_by(2).map(|k| (k, k * k)).collect();
    /// let tail: Vec<_> = map.tail_map(&12).map(|(k, _)| *k).collect();
    /// assert_eq!(tail, [13, 15, 17, 19]);
    /// ```
    pub fn tail_map<Q>(&self, from: &Q) -> Range<'_, K, V>
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.range::<Q, _>((Bound::Included(from), Bound::Unbounded))
    }

    /// Entries with keys in `[from, to)`.
    ///
    /// # Panics
    ///
    /// Panics if `from > to`.
    pub fn sub_map<Q>(&self, from: &Q, to: &Q) -> Range<'_, K, V>
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.range::<Q, _>((Bound::Included(from), Bound::Excluded(to)))
    }

    /// Checks every structural invariant of the tree and the leaf chain.
    ///
    /// The public operations keep these invariants, so this only fails on a bug.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation>
    where
        K: Ord,
    {
        self.raw.check_invariants()
    }
}

impl<K: Ord + Clone, V> BpTreeMap<K, V> {
    /// Inserts a key-value pair into the map.
    ///
    /// Keys are unique. If the map already holds `key`, nothing changes and the pair
    /// is returned inside the error.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateKeyError`] if the key is already present.
    ///
    /// # Complexity
    ///
    /// O(log n). A full leaf splits and may split its ancestors up to the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BpTreeMap;
    ///
    /// let mut map = BpTreeMap::new();
    /// assert!(map.put(37, "a").is_ok());
    /// assert!(!map.is_empty());
    ///
    /// let rejected = map.put(37, "b").unwrap_err();
    /// assert_eq!(rejected.into_parts(), (37, "b"));
    /// assert_eq!(map[&37], "a");
    /// ```
    pub fn put(&mut self, key: K, value: V) -> Result<(), DuplicateKeyError<K, V>> {
        self.raw.insert(key, value)
    }
}

impl<K: Clone, V: Clone> Clone for BpTreeMap<K, V> {
    fn clone(&self) -> Self {
        BpTreeMap { raw: self.raw.clone() }
    }
}

impl<K: Hash, V: Hash> Hash for BpTreeMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (k, v) in self {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for BpTreeMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq> Eq for BpTreeMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BpTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for BpTreeMap<K, V> {
    fn default() -> Self {
        BpTreeMap::new()
    }
}

impl<K: Ord + Clone, V> FromIterator<(K, V)> for BpTreeMap<K, V> {
    /// Builds a map of the default order. A repeated key keeps its first value.
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = BpTreeMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord + Clone, V> Extend<(K, V)> for BpTreeMap<K, V> {
    /// Inserts every pair whose key is not yet present; the others are dropped.
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            // Keys already present keep their value.
            let _ = self.put(k, v);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a BpTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V> IntoIterator for BpTreeMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree_index::BpTreeMap;
    ///
    /// let map: BpTreeMap<_, _> = [(2, "b"), (1, "a")].into_iter().collect();
    /// let mut iter = map.into_iter();
    /// assert_eq!(iter.next(), Some((1, "a")));
    /// assert_eq!(iter.next_back(), Some((2, "b")));
    /// ```
    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<K, Q, V> Index<&Q> for BpTreeMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}
