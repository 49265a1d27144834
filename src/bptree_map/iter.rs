//! Iterators over a [`BpTreeMap`](super::BpTreeMap).
//!
//! The borrowing iterators follow the leaf chain: after the starting leaf is found
//! they never descend from the root again. The chain is singly linked, so they only
//! run forwards.

use alloc::vec;
use core::fmt;
use core::iter::FusedIterator;

use crate::raw::{Position, RawBpTreeMap};

/// Cursor over the leaf chain from `front` up to, not including, `end`.
struct LeafWalk<'a, K, V> {
    tree: Option<&'a RawBpTreeMap<K, V>>,
    front: Option<Position>,
    /// `None` runs to the end of the chain.
    end: Option<Position>,
}

impl<K, V> Clone for LeafWalk<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for LeafWalk<'_, K, V> {}

impl<'a, K, V> LeafWalk<'a, K, V> {
    const EMPTY: Self = LeafWalk {
        tree: None,
        front: None,
        end: None,
    };

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree?;
        let position = self.front?;
        if self.front == self.end {
            return None;
        }

        self.front = tree.advance(position);
        let (leaf, index) = position;
        Some(tree.leaf(leaf).entry(index))
    }
}

/// An iterator over the entries of a `BpTreeMap`, in ascending key order.
///
/// This `struct` is created by the [`iter`] method on [`BpTreeMap`]. A clone
/// carries on independently from the same position.
///
/// # Examples
///
/// ```
/// use bptree_index::BpTreeMap;
///
/// let map: BpTreeMap<_, _> = [(2, "b"), (1, "a")].into_iter().collect();
/// let mut iter = map.iter();
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.len(), 1);
/// assert_eq!(iter.next(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: super::BpTreeMap::iter
/// [`BpTreeMap`]: super::BpTreeMap
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    walk: LeafWalk<'a, K, V>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(tree: &'a RawBpTreeMap<K, V>) -> Self {
        Iter {
            walk: LeafWalk {
                tree: Some(tree),
                front: tree.first_position(),
                end: None,
            },
            remaining: tree.len(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.walk.next()?;
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            walk: self.walk,
            remaining: self.remaining,
        }
    }
}

impl<K, V> Default for Iter<'_, K, V> {
    /// Creates an empty `bptree_map::Iter`.
    ///
    /// ```
    /// # use bptree_index::bptree_map;
    /// let iter: bptree_map::Iter<'_, u8, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        Iter {
            walk: LeafWalk::EMPTY,
            remaining: 0,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// An iterator over a sub-range of entries in a `BpTreeMap`.
///
/// This `struct` is created by [`range`], [`head_map`], [`tail_map`] and
/// [`sub_map`]. Positioning it costs one descent; every step after that follows
/// the leaf chain.
///
/// [`range`]: super::BpTreeMap::range
/// [`head_map`]: super::BpTreeMap::head_map
/// [`tail_map`]: super::BpTreeMap::tail_map
/// [`sub_map`]: super::BpTreeMap::sub_map
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, K, V> {
    walk: LeafWalk<'a, K, V>,
}

impl<'a, K, V> Range<'a, K, V> {
    pub(crate) fn new(tree: &'a RawBpTreeMap<K, V>, front: Option<Position>, end: Option<Position>) -> Self {
        Range {
            walk: LeafWalk {
                tree: Some(tree),
                front,
                end,
            },
        }
    }
}

impl<'a, K, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.walk.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match (self.walk.tree, self.walk.front) {
            (Some(tree), Some(_)) if self.walk.front != self.walk.end => (1, Some(tree.len())),
            _ => (0, Some(0)),
        }
    }
}

impl<K, V> FusedIterator for Range<'_, K, V> {}

impl<K, V> Clone for Range<'_, K, V> {
    fn clone(&self) -> Self {
        Range { walk: self.walk }
    }
}

impl<K, V> Default for Range<'_, K, V> {
    /// Creates an empty `bptree_map::Range`.
    ///
    /// ```
    /// # use bptree_index::bptree_map;
    /// let mut range: bptree_map::Range<'_, u8, u8> = Default::default();
    /// assert_eq!(range.next(), None);
    /// ```
    fn default() -> Self {
        Range { walk: LeafWalk::EMPTY }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Range<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// An iterator over the keys of a `BpTreeMap`.
///
/// This `struct` is created by the [`keys`](super::BpTreeMap::keys) method.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    pub(super) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// An iterator over the values of a `BpTreeMap`, in key order.
///
/// This `struct` is created by the [`values`](super::BpTreeMap::values) method.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    pub(super) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// An owning iterator over the entries of a `BpTreeMap`, sorted by key.
///
/// This `struct` is created by the `into_iter` method on [`BpTreeMap`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`BpTreeMap`]: super::BpTreeMap
pub struct IntoIter<K, V> {
    pub(super) inner: vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice()).finish()
    }
}

impl<K, V> Default for IntoIter<K, V> {
    fn default() -> Self {
        IntoIter {
            inner: vec::Vec::new().into_iter(),
        }
    }
}
