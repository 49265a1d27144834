use alloc::vec;
use core::fmt;

use crate::raw::{Node, RawBpTreeMap};

/// A printable view of a tree's node layout.
///
/// Created by [`BpTreeMap::structure`](super::BpTreeMap::structure). Nodes are printed
/// depth first, one per line, indented by one tab per level. Keys are shown between
/// `.` markers that stand for child slots (or value slots in leaves), so an internal
/// node with separator 3 prints as `[ . 3 . ]`.
///
/// # Examples
///
/// ```
/// use bptree_index::BpTreeMap;
///
/// let map: BpTreeMap<u32, ()> = (1..=5).map(|k| (k, ())).collect();
/// assert_eq!(
///     map.structure().to_string(),
///     "[ . 3 . ]\n\t[ . 1 . 2 . ]\n\t[ . 3 . 4 . 5 . ]\n"
/// );
/// ```
pub struct Structure<'a, K, V> {
    tree: &'a RawBpTreeMap<K, V>,
}

impl<'a, K, V> Structure<'a, K, V> {
    pub(crate) fn new(tree: &'a RawBpTreeMap<K, V>) -> Self {
        Structure { tree }
    }
}

impl<K: fmt::Display, V> fmt::Display for Structure<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(self.tree.root(), 0usize)];

        while let Some((handle, depth)) = stack.pop() {
            let node = self.tree.node(handle);
            for _ in 0..depth {
                f.write_str("\t")?;
            }
            f.write_str("[ .")?;
            for key in node.keys() {
                write!(f, " {key} .")?;
            }
            f.write_str(" ]\n")?;

            if let Node::Internal(internal) = node {
                stack.extend(internal.children().iter().rev().map(|&child| (child, depth + 1)));
            }
        }

        Ok(())
    }
}

impl<K: fmt::Display, V> fmt::Debug for Structure<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
