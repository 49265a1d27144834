//! Tree shape configuration.

use crate::error::ConfigError;

/// Fanout used when none is given: at most 4 keys and 5 children per node.
pub const DEFAULT_ORDER: usize = 5;

/// Smallest fanout for which both halves of a split are non-empty.
pub const MIN_ORDER: usize = 3;

/// Shape parameters for a [`BpTreeMap`](crate::BpTreeMap).
///
/// # Examples
///
/// ```
/// use bptree_index::{BpTreeMap, TreeConfig};
///
/// let config = TreeConfig::new().with_order(8);
/// assert_eq!(config.max_keys(), 7);
///
/// let map: BpTreeMap<u32, &str> = BpTreeMap::with_config(config).unwrap();
/// assert_eq!(map.order(), 8);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TreeConfig {
    order: usize,
}

impl TreeConfig {
    /// Returns the default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self { order: DEFAULT_ORDER }
    }

    /// Sets the fanout: the maximum number of children of an internal node.
    #[must_use]
    pub const fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Returns the configured fanout.
    #[must_use]
    pub const fn order(&self) -> usize {
        self.order
    }

    /// Maximum number of keys held by any node.
    #[must_use]
    pub const fn max_keys(&self) -> usize {
        self.order - 1
    }

    /// Number of entries the left leaf keeps when a full leaf splits.
    ///
    /// The right leaf receives the remaining `order - leaf_split_at()`.
    #[must_use]
    pub const fn leaf_split_at(&self) -> usize {
        self.order / 2
    }

    /// Number of separators the left node keeps when a full internal node splits.
    ///
    /// The separator after them moves up to the parent.
    #[must_use]
    pub const fn internal_split_at(&self) -> usize {
        self.order / 2
    }

    /// Checks that the configuration describes a usable tree.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OrderTooSmall`] if the order is below [`MIN_ORDER`], and
    /// [`ConfigError::OrderTooLarge`] if a node of that order could not be addressed.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.order < MIN_ORDER {
            return Err(ConfigError::OrderTooSmall {
                order: self.order,
                min: MIN_ORDER,
            });
        }
        if self.order == usize::MAX {
            return Err(ConfigError::OrderTooLarge { order: self.order });
        }
        Ok(())
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_order_matches_reference_fanout() {
        let config = TreeConfig::default();
        assert_eq!(config.order(), 5);
        assert_eq!(config.max_keys(), 4);
        assert_eq!(config.leaf_split_at(), 2);
        assert_eq!(config.internal_split_at(), 2);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn order_below_minimum_is_rejected() {
        for order in 0..MIN_ORDER {
            assert_eq!(
                TreeConfig::new().with_order(order).validate(),
                Err(ConfigError::OrderTooSmall { order, min: MIN_ORDER })
            );
        }
    }

    #[test]
    fn unaddressable_order_is_rejected() {
        assert_eq!(
            TreeConfig::new().with_order(usize::MAX).validate(),
            Err(ConfigError::OrderTooLarge { order: usize::MAX })
        );
    }

    #[test]
    fn split_points_leave_both_halves_non_empty() {
        for order in MIN_ORDER..64 {
            let config = TreeConfig::new().with_order(order);
            assert!(config.leaf_split_at() >= 1);
            assert!(config.leaf_split_at() < order);
            assert!(config.internal_split_at() >= 1);
            assert!(config.internal_split_at() < config.max_keys() + 1);
        }
    }
}
