use core::borrow::Borrow;
use core::cmp::Ordering;

use smallvec::SmallVec;

use super::handle::Handle;
use crate::config::DEFAULT_ORDER;

// Inline capacity covers the default order; larger orders spill to the heap.
const INLINE_KEYS: usize = DEFAULT_ORDER - 1;
const INLINE_CHILDREN: usize = DEFAULT_ORDER;

pub(crate) type Keys<K> = SmallVec<[K; INLINE_KEYS]>;
pub(crate) type Values<V> = SmallVec<[V; INLINE_KEYS]>;
type Children = SmallVec<[Handle; INLINE_CHILDREN]>;

#[derive(Clone)]
pub(crate) enum Node<K, V> {
    Internal(InternalNode<K>),
    Leaf(LeafNode<K, V>),
}

// B+Tree: Internal nodes store separator keys and child handles.
// Child `i` covers keys in `[keys[i - 1], keys[i])`.
#[derive(Clone)]
pub(crate) struct InternalNode<K> {
    keys: Keys<K>,
    children: Children,
}

// B+Tree: Leaf nodes store keys and values side by side, plus the link to the
// leaf holding the next greater keys.
#[derive(Clone)]
pub(crate) struct LeafNode<K, V> {
    next: Option<Handle>,
    keys: Keys<K>,
    values: Values<V>,
}

/// Result of searching for a key in a leaf.
pub(crate) enum SearchResult {
    /// Key was found at the given index.
    Found(usize),
    /// Key was not found; index is where it would be inserted.
    NotFound(usize),
}

impl<K, V> Node<K, V> {
    /// Creates a new empty leaf node.
    pub(crate) fn new_leaf() -> Self {
        Node::Leaf(LeafNode::new())
    }

    /// Returns true if this is a leaf node.
    #[cfg(test)]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Returns the leaf node, panicking if this is not a leaf.
    pub(crate) fn as_leaf(&self) -> &LeafNode<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the leaf node mutably, panicking if this is not a leaf.
    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the internal node, panicking if this is not internal.
    pub(crate) fn as_internal(&self) -> &InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Returns the internal node mutably, panicking if this is not internal.
    pub(crate) fn as_internal_mut(&mut self) -> &mut InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Returns the keys of this node.
    pub(crate) fn keys(&self) -> &[K] {
        match self {
            Node::Internal(internal) => internal.keys(),
            Node::Leaf(leaf) => leaf.keys(),
        }
    }
}

impl<K> InternalNode<K> {
    /// Creates a new empty internal node.
    pub(crate) fn new() -> Self {
        Self {
            keys: SmallVec::new(),
            children: SmallVec::new(),
        }
    }

    /// Creates the node that replaces a split root: two children, one separator.
    pub(crate) fn new_root(left: Handle, separator: K, right: Handle) -> Self {
        let mut root = Self::new();
        root.children.push(left);
        root.keys.push(separator);
        root.children.push(right);
        root
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    /// Picks the child whose key range contains `key`: the first child whose
    /// separator is greater than `key`, or the last child.
    ///
    /// Nodes hold a handful of keys, so a linear scan is used.
    #[inline]
    pub(crate) fn search_child<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.keys
            .iter()
            .position(|separator| key < separator.borrow())
            .unwrap_or(self.keys.len())
    }

    /// Inserts `key` at `index` and `child` just to its right.
    ///
    /// `index` is the position of the child that was split; `child` is its new right sibling.
    pub(crate) fn insert_child(&mut self, index: usize, key: K, child: Handle) {
        self.keys.insert(index, key);
        self.children.insert(index + 1, child);
    }

    /// Splits a full node while inserting `key`/`child` as `insert_child` would.
    ///
    /// Of the separators that would result, the left node keeps the first `keep`,
    /// the next one is returned for promotion to the parent, and the returned right
    /// node gets the rest. The incoming pair is placed directly in its final node.
    pub(crate) fn split_insert(&mut self, index: usize, key: K, child: Handle, keep: usize) -> (K, InternalNode<K>) {
        debug_assert!(keep >= 1 && keep < self.keys.len() + 1, "split point out of range");

        let mut right = InternalNode::new();
        let separator = match index.cmp(&keep) {
            Ordering::Less => {
                let mut moved = self.keys.drain(keep - 1..);
                let separator = moved.next().expect("internal split needs a separator to promote");
                right.keys = moved.collect();
                right.children = self.children.drain(keep..).collect();
                self.insert_child(index, key, child);
                separator
            }
            Ordering::Equal => {
                // The incoming separator is the median itself.
                right.keys = self.keys.drain(keep..).collect();
                right.children.push(child);
                right.children.extend(self.children.drain(keep + 1..));
                key
            }
            Ordering::Greater => {
                right.keys = self.keys.drain(keep + 1..).collect();
                right.children = self.children.drain(keep + 1..).collect();
                let separator = self.keys.pop().expect("internal split needs a separator to promote");
                right.insert_child(index - keep - 1, key, child);
                separator
            }
        };

        (separator, right)
    }
}

impl<K, V> LeafNode<K, V> {
    /// Creates a new empty leaf node.
    pub(crate) fn new() -> Self {
        Self {
            next: None,
            keys: SmallVec::new(),
            values: SmallVec::new(),
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the next leaf handle.
    pub(crate) fn next(&self) -> Option<Handle> {
        self.next
    }

    /// Sets the next leaf handle.
    pub(crate) fn set_next(&mut self, next: Option<Handle>) {
        self.next = next;
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn value(&self, index: usize) -> &V {
        &self.values[index]
    }

    /// Returns the entry at `index`.
    #[inline]
    pub(crate) fn entry(&self, index: usize) -> (&K, &V) {
        (self.key(index), self.value(index))
    }

    pub(crate) fn first_key(&self) -> Option<&K> {
        self.keys.first()
    }

    pub(crate) fn last_key(&self) -> Option<&K> {
        self.keys.last()
    }

    /// Searches for a key in this leaf with a linear scan.
    #[inline]
    pub(crate) fn search<Q>(&self, key: &Q) -> SearchResult
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        for (index, candidate) in self.keys.iter().enumerate() {
            match key.cmp(candidate.borrow()) {
                Ordering::Less => return SearchResult::NotFound(index),
                Ordering::Equal => return SearchResult::Found(index),
                Ordering::Greater => {}
            }
        }
        SearchResult::NotFound(self.keys.len())
    }

    /// Wedges a key and value in at `index`, shifting later entries right.
    pub(crate) fn insert(&mut self, index: usize, key: K, value: V) {
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    /// Splits a full leaf while inserting `key`/`value` at sorted position `index`.
    ///
    /// The left leaf keeps `keep` entries, the returned right leaf receives the rest.
    /// The new entry goes straight into whichever half its position selects.
    /// The caller owns the `next` links.
    pub(crate) fn split_insert(&mut self, index: usize, key: K, value: V, keep: usize) -> LeafNode<K, V> {
        debug_assert!(keep >= 1 && keep <= self.keys.len(), "split point out of range");

        let mut right = LeafNode::new();
        if index < keep {
            right.keys = self.keys.drain(keep - 1..).collect();
            right.values = self.values.drain(keep - 1..).collect();
            self.insert(index, key, value);
        } else {
            right.keys = self.keys.drain(keep..).collect();
            right.values = self.values.drain(keep..).collect();
            right.insert(index - keep, key, value);
        }
        right
    }

    /// Takes ownership of all keys and values, leaving the leaf empty.
    pub(crate) fn take_all(&mut self) -> (Keys<K>, Values<V>) {
        let keys = core::mem::take(&mut self.keys);
        let values = core::mem::take(&mut self.values);
        (keys, values)
    }
}
