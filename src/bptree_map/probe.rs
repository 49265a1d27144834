use core::fmt;

/// The outcome of an instrumented lookup.
///
/// Created by [`BpTreeMap::probe`](super::BpTreeMap::probe). A lookup visits one
/// node per level, so `nodes_visited` equals the tree height whether or not the key
/// is present.
///
/// # Examples
///
/// ```
/// use bptree_index::BpTreeMap;
///
/// let map: BpTreeMap<u32, u32> = (0..100).map(|k| (k, k * k)).collect();
///
/// let hit = map.probe(&7);
/// assert_eq!(hit.value(), Some(&49));
/// assert_eq!(hit.nodes_visited(), map.height());
///
/// let miss = map.probe(&1000);
/// assert!(!miss.is_hit());
/// assert_eq!(miss.nodes_visited(), map.height());
/// ```
#[derive(PartialEq, Eq)]
pub struct Probe<'a, V> {
    value: Option<&'a V>,
    nodes_visited: usize,
}

impl<'a, V> Probe<'a, V> {
    pub(crate) const fn new(value: Option<&'a V>, nodes_visited: usize) -> Self {
        Probe { value, nodes_visited }
    }

    /// The value found, if the key is present.
    #[must_use]
    pub const fn value(&self) -> Option<&'a V> {
        self.value
    }

    /// Number of nodes read on the way from the root to the leaf, both included.
    #[must_use]
    pub const fn nodes_visited(&self) -> usize {
        self.nodes_visited
    }

    /// Returns `true` if the key was found.
    #[must_use]
    pub const fn is_hit(&self) -> bool {
        self.value.is_some()
    }
}

impl<V> Clone for Probe<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Probe<'_, V> {}

impl<V: fmt::Debug> fmt::Debug for Probe<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Probe")
            .field("value", &self.value)
            .field("nodes_visited", &self.nodes_visited)
            .finish()
    }
}
