use alloc::vec::Vec;

use super::handle::Handle;
use super::node::Node;
use super::raw_bptree_map::RawBpTreeMap;
use crate::error::InvariantViolation;

/// Key range a subtree must stay inside: `[lower, upper)`, open where `None`.
struct Bounds<'a, K> {
    lower: Option<&'a K>,
    upper: Option<&'a K>,
}

impl<K: Ord, V> RawBpTreeMap<K, V> {
    /// Walks the whole tree and then the leaf chain, reporting the first broken invariant.
    pub(crate) fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut leaves = Vec::new();
        let mut leaf_depth = None;
        self.check_subtree(
            self.root(),
            Bounds {
                lower: None,
                upper: None,
            },
            0,
            &mut leaf_depth,
            &mut leaves,
        )?;

        let actual = leaf_depth.map_or(1, |depth| depth + 1);
        if actual != self.height() {
            return Err(InvariantViolation::HeightMismatch {
                recorded: self.height(),
                actual,
            });
        }

        self.check_leaf_chain(&leaves)
    }

    /// Checks one node and recurses into its children, collecting leaves left to right.
    fn check_subtree(
        &self,
        handle: Handle,
        bounds: Bounds<'_, K>,
        depth: usize,
        leaf_depth: &mut Option<usize>,
        leaves: &mut Vec<Handle>,
    ) -> Result<(), InvariantViolation> {
        let node_index = handle.to_index();
        let node = self.node(handle);
        let keys = node.keys();

        if let Some(index) = keys.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(InvariantViolation::UnsortedKeys {
                node: node_index,
                index: index + 1,
            });
        }

        let max = self.config().max_keys();
        if keys.len() > max {
            return Err(InvariantViolation::Overfull {
                node: node_index,
                keys: keys.len(),
                max,
            });
        }

        let below = matches!((keys.first(), bounds.lower), (Some(first), Some(lower)) if first < lower);
        let above = matches!((keys.last(), bounds.upper), (Some(last), Some(upper)) if last >= upper);
        if below || above {
            return Err(InvariantViolation::SeparatorBounds { node: node_index });
        }

        match node {
            Node::Leaf(leaf) => {
                if leaf.is_empty() && handle != self.root() {
                    return Err(InvariantViolation::EmptyNode { node: node_index });
                }
                match *leaf_depth {
                    None => *leaf_depth = Some(depth),
                    Some(expected) if expected != depth => {
                        return Err(InvariantViolation::UnevenDepth {
                            node: node_index,
                            depth,
                            expected,
                        });
                    }
                    Some(_) => {}
                }
                leaves.push(handle);
            }
            Node::Internal(internal) => {
                if keys.is_empty() {
                    return Err(InvariantViolation::EmptyNode { node: node_index });
                }
                if internal.child_count() != keys.len() + 1 {
                    return Err(InvariantViolation::ChildCount {
                        node: node_index,
                        keys: keys.len(),
                        children: internal.child_count(),
                    });
                }
                for (index, &child) in internal.children().iter().enumerate() {
                    let child_bounds = Bounds {
                        lower: if index == 0 { bounds.lower } else { Some(&keys[index - 1]) },
                        upper: keys.get(index).or(bounds.upper),
                    };
                    self.check_subtree(child, child_bounds, depth + 1, leaf_depth, leaves)?;
                }
            }
        }

        Ok(())
    }

    /// Compares the `next` links against the leaf order found by the tree walk.
    fn check_leaf_chain(&self, leaves: &[Handle]) -> Result<(), InvariantViolation> {
        if leaves.first() != Some(&self.first_leaf()) {
            return Err(InvariantViolation::StaleFirstLeaf {
                node: self.first_leaf().to_index(),
            });
        }
        if leaves.last() != Some(&self.last_leaf()) {
            return Err(InvariantViolation::StaleLastLeaf {
                node: self.last_leaf().to_index(),
            });
        }

        let mut counted = 0;
        for (position, &handle) in leaves.iter().enumerate() {
            let leaf = self.leaf(handle);
            let expected = leaves.get(position + 1).copied();
            if leaf.next() != expected {
                return Err(InvariantViolation::BrokenLeafChain {
                    from: handle.to_index(),
                    found: leaf.next().map(Handle::to_index),
                    expected: expected.map(Handle::to_index),
                });
            }
            if let Some(next) = expected {
                let in_order = match (leaf.last_key(), self.leaf(next).first_key()) {
                    (Some(last), Some(first)) => last < first,
                    _ => true,
                };
                if !in_order {
                    return Err(InvariantViolation::ChainOutOfOrder {
                        left: handle.to_index(),
                        right: next.to_index(),
                    });
                }
            }
            counted += leaf.key_count();
        }

        if counted != self.len() {
            return Err(InvariantViolation::LengthMismatch {
                recorded: self.len(),
                counted,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::TreeConfig;
    use pretty_assertions::assert_eq;

    fn filled(count: i32) -> RawBpTreeMap<i32, ()> {
        let mut tree = RawBpTreeMap::new(TreeConfig::new());
        for key in 0..count {
            tree.insert(key, ()).unwrap();
        }
        tree
    }

    #[test]
    fn healthy_trees_pass() {
        for count in [0, 1, 4, 5, 17, 200] {
            assert_eq!(filled(count).check_invariants(), Ok(()), "{count} keys");
        }
    }

    #[test]
    fn separator_outside_child_range_is_reported() {
        let mut tree = filled(5);
        // Root separator is 2; push the right leaf's keys below it.
        let last = tree.last_leaf();
        let leaf = tree.node_mut(last).as_leaf_mut();
        let (_, values) = leaf.take_all();
        for (index, value) in values.into_iter().enumerate() {
            leaf.insert(index, index as i32 - 10, value);
        }
        assert_eq!(
            tree.check_invariants(),
            Err(InvariantViolation::SeparatorBounds { node: last.to_index() })
        );
    }

    #[test]
    fn unsorted_leaf_is_reported() {
        let mut tree = filled(3);
        let root = tree.root();
        tree.node_mut(root).as_leaf_mut().insert(3, 1, ());
        assert_eq!(
            tree.check_invariants(),
            Err(InvariantViolation::UnsortedKeys {
                node: root.to_index(),
                index: 3
            })
        );
    }

    #[test]
    fn overfull_leaf_is_reported() {
        let mut tree = filled(4);
        let root = tree.root();
        tree.node_mut(root).as_leaf_mut().insert(4, 99, ());
        assert_eq!(
            tree.check_invariants(),
            Err(InvariantViolation::Overfull {
                node: root.to_index(),
                keys: 5,
                max: 4
            })
        );
    }

    #[test]
    fn emptied_leaf_is_reported() {
        let mut tree = filled(5);
        let first = tree.first_leaf();
        tree.node_mut(first).as_leaf_mut().take_all();
        assert_eq!(
            tree.check_invariants(),
            Err(InvariantViolation::EmptyNode { node: first.to_index() })
        );
    }
}
