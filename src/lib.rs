//! An in-memory B+Tree index for Rust.
//!
//! This crate provides [`BpTreeMap`], an ordered map meant to serve as the primary-key
//! index of an in-memory table. All entries live in the leaves, which are linked into
//! a chain, so ordered scans and range queries walk the leaf level instead of
//! re-descending the tree:
//!
//! - [`get`](BpTreeMap::get) / [`put`](BpTreeMap::put) - point lookup and insertion
//! - [`head_map`](BpTreeMap::head_map), [`tail_map`](BpTreeMap::tail_map),
//!   [`sub_map`](BpTreeMap::sub_map) - half-open range queries
//! - [`iter`](BpTreeMap::iter) - every entry in key order
//!
//! Keys are unique: inserting an existing key fails with [`DuplicateKeyError`] and
//! leaves the stored value alone.
//!
//! # Example
//!
//! ```
//! use bptree_index::BpTreeMap;
//!
//! let mut index = BpTreeMap::new();
//! for id in (1..=19).step_by(2) {
//!     index.put(id, id * id).unwrap();
//! }
//!
//! assert_eq!(index.get(&7), Some(&49));
//! assert_eq!(index.len(), 10);
//!
//! let below_12: Vec<_> = index.head_map(&12).map(|(k, _)| *k).collect();
//! assert_eq!(below_12, [1, 3, 5, 7, 9, 11]);
//!
//! let rejected = index.put(7, 0).unwrap_err();
//! assert_eq!(rejected.into_parts(), (7, 0));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Configurable fanout** - [`TreeConfig`] sets the order; the default is 5
//! - **Interchangeable** - [`SortedMap`] is implemented for both `BpTreeMap` and `BTreeMap`
//! - **Self-checking** - [`check_invariants`](BpTreeMap::check_invariants) verifies the
//!   tree and the leaf chain
//!
//! # Implementation
//!
//! Nodes are stored in an arena and refer to each other by compact handles. Inserts
//! record their descent path; a full node splits and the separator moves up that path
//! in a loop, growing a new root when the old one splits. Splits are logged through
//! [`tracing`] at `debug` level.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod config;
mod error;
mod raw;
mod sorted_map;

pub mod bptree_map;

pub use bptree_map::{BpTreeMap, Probe};
pub use config::{DEFAULT_ORDER, MIN_ORDER, TreeConfig};
pub use error::{ConfigError, DuplicateKeyError, InvariantViolation};
pub use sorted_map::SortedMap;
