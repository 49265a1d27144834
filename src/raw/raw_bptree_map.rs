use alloc::vec::Vec;
use core::borrow::Borrow;
use core::ops::Bound;

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::arena::Arena;
use super::handle::Handle;
use super::node::{InternalNode, LeafNode, Node, SearchResult};
use crate::config::TreeConfig;
use crate::error::DuplicateKeyError;

/// A slot on the leaf chain: a leaf and an index into its entries.
pub(crate) type Position = (Handle, usize);

/// The core B+Tree implementation backing `BpTreeMap`.
#[derive(Clone)]
pub(crate) struct RawBpTreeMap<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K, V>>,
    /// Fanout and split points.
    config: TreeConfig,
    /// Handle to the root node. A fresh tree's root is an empty leaf.
    root: Handle,
    /// Handle to the first (leftmost) leaf, where the leaf chain starts.
    first_leaf: Handle,
    /// Handle to the last (rightmost) leaf, where the leaf chain ends.
    last_leaf: Handle,
    /// Total number of key-value pairs in the tree.
    len: usize,
    /// Number of levels, counting the leaf level.
    height: usize,
}

/// Path element for tracking traversal during insertion.
struct PathElement {
    /// Handle to the internal node at this level.
    node: Handle,
    /// Index of the child we descended into.
    child_index: usize,
}

/// Stack of internal nodes from the root down to the target leaf's parent.
type Path = SmallVec<[PathElement; 16]>;

impl<K, V> RawBpTreeMap<K, V> {
    /// Creates a tree whose root is a single empty leaf.
    ///
    /// `config` must already be validated.
    pub(crate) fn new(config: TreeConfig) -> Self {
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node::new_leaf());
        Self {
            nodes,
            config,
            root,
            first_leaf: root,
            last_leaf: root,
            len: 0,
            height: 1,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) const fn height(&self) -> usize {
        self.height
    }

    pub(crate) const fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Number of nodes allocated, leaves and internal nodes together.
    pub(crate) const fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn root(&self) -> Handle {
        self.root
    }

    pub(crate) fn first_leaf(&self) -> Handle {
        self.first_leaf
    }

    pub(crate) fn last_leaf(&self) -> Handle {
        self.last_leaf
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    #[cfg(test)]
    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.nodes.get_mut(handle)
    }

    #[cfg(test)]
    pub(crate) fn set_len(&mut self, len: usize) {
        self.len = len;
    }

    #[inline]
    pub(crate) fn leaf(&self, handle: Handle) -> &LeafNode<K, V> {
        self.nodes.get(handle).as_leaf()
    }

    /// Drops every entry and starts over from a single empty leaf.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.alloc(Node::new_leaf());
        self.first_leaf = self.root;
        self.last_leaf = self.root;
        self.len = 0;
        self.height = 1;
    }

    /// Moves all entries out in key order by walking the leaf chain, leaving the tree empty.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let mut result = Vec::with_capacity(self.len);
        let mut current = Some(self.first_leaf);

        while let Some(leaf_handle) = current {
            let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();
            current = leaf.next();
            let (keys, values) = leaf.take_all();
            result.extend(keys.into_iter().zip(values));
        }

        self.clear();
        result
    }

    /// Turns a leaf index that may sit one past the leaf's end into a valid position,
    /// following the leaf chain if needed.
    pub(crate) fn normalize(&self, leaf_handle: Handle, index: usize) -> Option<Position> {
        let leaf = self.leaf(leaf_handle);
        if index < leaf.key_count() {
            Some((leaf_handle, index))
        } else {
            // Only the root leaf can be empty, so a successor always has an entry 0.
            leaf.next().map(|next| (next, 0))
        }
    }

    /// Returns the position after `position` on the leaf chain.
    #[inline]
    pub(crate) fn advance(&self, (leaf_handle, index): Position) -> Option<Position> {
        self.normalize(leaf_handle, index + 1)
    }

    /// Returns the position of the smallest entry.
    pub(crate) fn first_position(&self) -> Option<Position> {
        self.normalize(self.first_leaf, 0)
    }

    /// Returns the smallest entry.
    pub(crate) fn first_key_value(&self) -> Option<(&K, &V)> {
        let leaf = self.leaf(self.first_leaf);
        if leaf.is_empty() { None } else { Some(leaf.entry(0)) }
    }

    /// Returns the largest entry, from the leaf at the end of the chain.
    pub(crate) fn last_key_value(&self) -> Option<(&K, &V)> {
        let leaf = self.leaf(self.last_leaf);
        let count = leaf.key_count();
        if count == 0 { None } else { Some(leaf.entry(count - 1)) }
    }
}

impl<K: Ord, V> RawBpTreeMap<K, V> {
    /// Descends from the root to the leaf whose range contains `key`.
    /// Returns the leaf and the number of nodes visited on the way, the leaf included.
    fn find_leaf<Q>(&self, key: &Q) -> (Handle, usize)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        let mut visited = 1;

        while let Node::Internal(internal) = self.nodes.get(current) {
            current = internal.child(internal.search_child(key));
            visited += 1;
        }

        (current, visited)
    }

    /// Looks up a key, also reporting how many nodes the descent touched.
    pub(crate) fn probe<Q>(&self, key: &Q) -> (Option<(&K, &V)>, usize)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (leaf_handle, visited) = self.find_leaf(key);
        let leaf = self.leaf(leaf_handle);
        let entry = match leaf.search(key) {
            SearchResult::Found(index) => Some(leaf.entry(index)),
            SearchResult::NotFound(_) => None,
        };
        (entry, visited)
    }

    /// Returns the key-value pair corresponding to the key.
    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.probe(key).0
    }

    /// Finds the first position whose key is `>= key`.
    pub(crate) fn lower_bound<Q>(&self, key: &Q) -> Option<Position>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (leaf_handle, _) = self.find_leaf(key);
        let index = match self.leaf(leaf_handle).search(key) {
            SearchResult::Found(index) | SearchResult::NotFound(index) => index,
        };
        self.normalize(leaf_handle, index)
    }

    /// Finds the first position whose key is `> key`.
    pub(crate) fn upper_bound<Q>(&self, key: &Q) -> Option<Position>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (leaf_handle, _) = self.find_leaf(key);
        let index = match self.leaf(leaf_handle).search(key) {
            SearchResult::Found(index) => index + 1,
            SearchResult::NotFound(index) => index,
        };
        self.normalize(leaf_handle, index)
    }

    /// Position of the first entry inside a range with the given start bound.
    pub(crate) fn start_position<Q>(&self, bound: Bound<&Q>) -> Option<Position>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match bound {
            Bound::Unbounded => self.first_position(),
            Bound::Included(key) => self.lower_bound(key),
            Bound::Excluded(key) => self.upper_bound(key),
        }
    }

    /// Position of the first entry past a range with the given end bound.
    /// `None` means the range runs to the end of the leaf chain.
    pub(crate) fn end_position<Q>(&self, bound: Bound<&Q>) -> Option<Position>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match bound {
            Bound::Unbounded => None,
            Bound::Included(key) => self.upper_bound(key),
            Bound::Excluded(key) => self.lower_bound(key),
        }
    }
}

impl<K: Clone + Ord, V> RawBpTreeMap<K, V> {
    /// Inserts a key-value pair into the tree.
    ///
    /// An existing key is never overwritten: the pair comes back in the error and the
    /// tree is untouched.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Result<(), DuplicateKeyError<K, V>> {
        // Build path from root to leaf
        let mut path: Path = SmallVec::new();
        let mut current = self.root;

        while let Node::Internal(internal) = self.nodes.get(current) {
            let child_index = internal.search_child(&key);
            path.push(PathElement {
                node: current,
                child_index,
            });
            current = internal.child(child_index);
        }

        let max_keys = self.config.max_keys();
        let leaf = self.nodes.get_mut(current).as_leaf_mut();
        let index = match leaf.search(&key) {
            SearchResult::Found(_) => {
                trace!(leaf = current.to_index(), "rejected duplicate key");
                return Err(DuplicateKeyError::new(key, value));
            }
            SearchResult::NotFound(index) => index,
        };

        if leaf.key_count() < max_keys {
            leaf.insert(index, key, value);
        } else {
            self.split_leaf_and_propagate(current, index, key, value, &mut path);
        }
        self.len += 1;

        Ok(())
    }

    /// Splits a full leaf around the incoming entry and propagates the new separator up.
    fn split_leaf_and_propagate(&mut self, leaf_handle: Handle, index: usize, key: K, value: V, path: &mut Path) {
        let keep = self.config.leaf_split_at();
        let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();
        let mut right_leaf = leaf.split_insert(index, key, value, keep);
        let separator = right_leaf.key(0).clone();
        let left_keys = leaf.key_count();
        let right_keys = right_leaf.key_count();

        // The new leaf inherits the old successor and becomes the split leaf's successor.
        // These are the only two links that change.
        right_leaf.set_next(leaf.next());
        let right_handle = self.nodes.alloc(Node::Leaf(right_leaf));
        self.nodes.get_mut(leaf_handle).as_leaf_mut().set_next(Some(right_handle));

        if self.last_leaf == leaf_handle {
            self.last_leaf = right_handle;
        }

        debug!(
            leaf = leaf_handle.to_index(),
            sibling = right_handle.to_index(),
            left_keys,
            right_keys,
            "split leaf"
        );

        self.propagate_split(path, separator, right_handle);
    }

    /// Inserts a separator and new right child into each ancestor in turn, splitting
    /// full ancestors, until one has room or the root itself splits.
    fn propagate_split(&mut self, path: &mut Path, mut separator: K, mut new_child: Handle) {
        let max_keys = self.config.max_keys();
        let keep = self.config.internal_split_at();

        while let Some(elem) = path.pop() {
            let parent = self.nodes.get_mut(elem.node).as_internal_mut();

            if parent.key_count() < max_keys {
                parent.insert_child(elem.child_index, separator, new_child);
                return;
            }

            let (median, right_internal) = parent.split_insert(elem.child_index, separator, new_child, keep);
            let left_keys = parent.key_count();
            let right_keys = right_internal.key_count();
            let right_handle = self.nodes.alloc(Node::Internal(right_internal));

            debug!(
                node = elem.node.to_index(),
                sibling = right_handle.to_index(),
                left_keys,
                right_keys,
                "split internal node"
            );

            separator = median;
            new_child = right_handle;
        }

        // The root split: grow the tree by one level.
        let old_root = self.root;
        let new_root = InternalNode::new_root(old_root, separator, new_child);
        self.root = self.nodes.alloc(Node::Internal(new_root));
        self.height += 1;

        debug!(root = self.root.to_index(), height = self.height, "grew new root");
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
mod tests {
    use super::*;
    use crate::config::MIN_ORDER;
    use crate::error::InvariantViolation;
    use alloc::collections::BTreeMap;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn tree(order: usize) -> RawBpTreeMap<i32, i32> {
        RawBpTreeMap::new(TreeConfig::new().with_order(order))
    }

    fn chain_keys(tree: &RawBpTreeMap<i32, i32>) -> Vec<i32> {
        let mut keys = Vec::new();
        let mut current = Some(tree.first_leaf());
        while let Some(handle) = current {
            let leaf = tree.leaf(handle);
            keys.extend_from_slice(leaf.keys());
            current = leaf.next();
        }
        keys
    }

    #[test]
    fn new_tree_is_single_empty_leaf() {
        let tree = tree(5);
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert!(tree.node(tree.root()).is_leaf());
        assert_eq!(tree.first_leaf(), tree.root());
        assert_eq!(tree.last_leaf(), tree.root());
        assert!(tree.leaf(tree.root()).next().is_none());
        assert!(tree.first_position().is_none());
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn duplicate_is_rejected_without_change() {
        let mut tree = tree(5);
        tree.insert(1, 10).unwrap();
        let err = tree.insert(1, 99).unwrap_err();
        assert_eq!(err.into_parts(), (1, 99));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get_key_value(&1), Some((&1, &10)));
    }

    #[test]
    fn first_leaf_split_grows_root() {
        let mut tree = tree(5);
        for key in 1..=4 {
            tree.insert(key, key).unwrap();
        }
        assert_eq!(tree.height(), 1);

        tree.insert(5, 5).unwrap();
        assert_eq!(tree.height(), 2);

        let root = tree.node(tree.root()).as_internal();
        assert_eq!(root.keys(), &[3]);
        assert_eq!(root.child_count(), 2);
        assert_eq!(root.child(0), tree.first_leaf());
        assert_eq!(root.child(1), tree.last_leaf());
        assert_eq!(tree.leaf(tree.first_leaf()).keys(), &[1, 2]);
        assert_eq!(tree.leaf(tree.last_leaf()).keys(), &[3, 4, 5]);
        assert_eq!(tree.leaf(tree.first_leaf()).next(), Some(tree.last_leaf()));
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn interior_leaf_split_relinks_only_its_neighbours() {
        let mut tree = tree(5);
        for key in [10, 20, 30, 40, 50, 60, 70] {
            tree.insert(key, key).unwrap();
        }
        // Leaves: [10, 20] -> [30, 40] -> [50, 60, 70]
        let first = tree.first_leaf();
        let middle = tree.leaf(first).next().unwrap();
        let last = tree.last_leaf();
        assert_eq!(tree.leaf(middle).next(), Some(last));

        // Fill the first leaf and split it.
        tree.insert(11, 11).unwrap();
        tree.insert(12, 12).unwrap();
        tree.insert(13, 13).unwrap();

        let new_leaf = tree.leaf(first).next().unwrap();
        assert_ne!(new_leaf, middle);
        assert_eq!(tree.leaf(new_leaf).next(), Some(middle));
        assert_eq!(tree.leaf(middle).next(), Some(last));
        assert_eq!(tree.last_leaf(), last);
        assert_eq!(chain_keys(&tree), [10, 11, 12, 13, 20, 30, 40, 50, 60, 70]);
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn bounds_cross_leaf_boundaries() {
        let mut tree = tree(5);
        for key in (0..40).step_by(2) {
            tree.insert(key, key).unwrap();
        }
        let key_at = |position: Option<Position>| position.map(|(leaf, index)| *tree.leaf(leaf).key(index));

        assert_eq!(key_at(tree.lower_bound(&-5)), Some(0));
        assert_eq!(key_at(tree.lower_bound(&7)), Some(8));
        assert_eq!(key_at(tree.lower_bound(&8)), Some(8));
        assert_eq!(key_at(tree.upper_bound(&8)), Some(10));
        assert_eq!(key_at(tree.upper_bound(&38)), None);
        assert_eq!(key_at(tree.lower_bound(&39)), None);

        // Every key's upper bound is the next key along the chain.
        for key in (0..38).step_by(2) {
            assert_eq!(key_at(tree.upper_bound(&key)), Some(key + 2));
            assert_eq!(key_at(tree.upper_bound(&key)), key_at(tree.lower_bound(&(key + 1))));
        }
    }

    #[test]
    fn probe_visits_one_node_per_level() {
        let mut tree = tree(3);
        for key in 0..100 {
            tree.insert(key, key).unwrap();
        }
        for key in -1..=100 {
            let (_, visited) = tree.probe(&key);
            assert_eq!(visited, tree.height());
        }
    }

    #[test]
    fn drain_empties_tree_in_order() {
        let mut tree = tree(4);
        for key in (0..30).rev() {
            tree.insert(key, key * 2).unwrap();
        }
        let drained = tree.drain_to_vec();
        let expected: Vec<(i32, i32)> = (0..30).map(|k| (k, k * 2)).collect();
        assert_eq!(drained, expected);
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn corrupted_leaf_chain_is_reported() {
        let mut tree = tree(5);
        for key in 0..20 {
            tree.insert(key, key).unwrap();
        }
        let first = tree.first_leaf();
        let skipped = tree.leaf(first).next().unwrap();
        let after = tree.leaf(skipped).next();
        tree.node_mut(first).as_leaf_mut().set_next(after);

        assert_eq!(
            tree.check_invariants(),
            Err(InvariantViolation::BrokenLeafChain {
                from: first.to_index(),
                found: after.map(Handle::to_index),
                expected: Some(skipped.to_index()),
            })
        );
    }

    #[test]
    fn corrupted_length_is_reported() {
        let mut tree = tree(5);
        for key in 0..20 {
            tree.insert(key, key).unwrap();
        }
        tree.set_len(19);
        assert_eq!(
            tree.check_invariants(),
            Err(InvariantViolation::LengthMismatch {
                recorded: 19,
                counted: 20
            })
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn invariants_hold_after_every_insert(
            order in MIN_ORDER..9usize,
            keys in prop::collection::vec(-500i32..500, 0..400),
        ) {
            let mut tree = tree(order);
            let mut model = BTreeMap::new();

            for key in keys {
                let result = tree.insert(key, key * 3);
                if model.contains_key(&key) {
                    prop_assert!(result.is_err(), "duplicate {} was accepted", key);
                } else {
                    prop_assert!(result.is_ok());
                    model.insert(key, key * 3);
                }
                prop_assert_eq!(tree.check_invariants(), Ok(()));
            }

            prop_assert_eq!(tree.len(), model.len());
            prop_assert_eq!(chain_keys(&tree), model.keys().copied().collect::<Vec<_>>());
            for (key, value) in &model {
                prop_assert_eq!(tree.get_key_value(key), Some((key, value)));
            }
        }

        #[test]
        fn height_stays_logarithmic(order in MIN_ORDER..9usize, count in 1usize..600) {
            let mut tree = tree(order);
            for key in 0..count as i32 {
                tree.insert(key, key).unwrap();
            }
            // Every non-root node keeps at least `order / 2` children or entries.
            let min_fanout = (order / 2).max(2);
            let mut bound = 2;
            let mut reach = 1;
            while reach < count {
                reach *= min_fanout;
                bound += 1;
            }
            prop_assert!(tree.height() <= bound, "height {} exceeds {}", tree.height(), bound);
        }
    }
}
