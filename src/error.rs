//! Error types for the index.

use thiserror::Error;

/// Returned by [`BpTreeMap::put`](crate::BpTreeMap::put) when the key is already present.
///
/// The index never overwrites an entry. The tree is left unchanged and the rejected
/// key and value are handed back.
///
/// # Examples
///
/// ```
/// use bptree_index::BpTreeMap;
///
/// let mut map = BpTreeMap::new();
/// map.put(7, "first").unwrap();
///
/// let err = map.put(7, "second").unwrap_err();
/// assert_eq!(err.key(), &7);
/// assert_eq!(err.into_parts(), (7, "second"));
/// assert_eq!(map.get(&7), Some(&"first"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("duplicate key rejected: the index already holds an entry for this key")]
pub struct DuplicateKeyError<K, V> {
    key: K,
    value: V,
}

impl<K, V> DuplicateKeyError<K, V> {
    pub(crate) const fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    /// The key that was already present.
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// The value that was not inserted.
    pub const fn value(&self) -> &V {
        &self.value
    }

    /// Returns the rejected key and value.
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

/// Returned when a [`TreeConfig`](crate::TreeConfig) cannot describe a working tree.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Splits need at least one key on each side.
    #[error("tree order {order} is below the minimum of {min}")]
    OrderTooSmall { order: usize, min: usize },

    /// Node child counts would overflow.
    #[error("tree order {order} is too large")]
    OrderTooLarge { order: usize },
}

/// A structural defect found by
/// [`BpTreeMap::check_invariants`](crate::BpTreeMap::check_invariants).
///
/// Any of these means split or propagation logic corrupted the tree; it is never caused
/// by caller input. Nodes are identified by their arena index.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("keys of node {node} are not strictly increasing at index {index}")]
    UnsortedKeys { node: usize, index: usize },

    #[error("node {node} holds {keys} keys, more than the maximum of {max}")]
    Overfull { node: usize, keys: usize, max: usize },

    #[error("node {node} is empty but is not the root leaf")]
    EmptyNode { node: usize },

    #[error("internal node {node} has {keys} keys but {children} children")]
    ChildCount { node: usize, keys: usize, children: usize },

    #[error("a key in node {node} lies outside the range its parent routes to it")]
    SeparatorBounds { node: usize },

    #[error("leaf {node} is at depth {depth}, expected {expected}")]
    UnevenDepth { node: usize, depth: usize, expected: usize },

    #[error("recorded height {recorded} does not match the actual height {actual}")]
    HeightMismatch { recorded: usize, actual: usize },

    #[error("leaf chain links leaf {from} to {found:?}, expected {expected:?}")]
    BrokenLeafChain {
        from: usize,
        found: Option<usize>,
        expected: Option<usize>,
    },

    #[error("leaf {node} is first on the chain but is not the leftmost leaf")]
    StaleFirstLeaf { node: usize },

    #[error("leaf {node} is recorded as last but is not the rightmost leaf")]
    StaleLastLeaf { node: usize },

    #[error("keys are not strictly increasing across leaves {left} and {right}")]
    ChainOutOfOrder { left: usize, right: usize },

    #[error("recorded length {recorded} does not match the {counted} keys on the leaf chain")]
    LengthMismatch { recorded: usize, counted: usize },
}
