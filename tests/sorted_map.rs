use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use bptree_index::{BpTreeMap, SortedMap};

const TEST_SIZE: usize = 1_000;

#[derive(Debug, Clone)]
enum IndexOp {
    Put(i32, u64),
    Get(i32),
    Head(i32),
    Tail(i32),
    Sub(i32, i32),
}

fn key_strategy() -> impl Strategy<Value = i32> {
    -800i32..800i32
}

fn index_op_strategy() -> impl Strategy<Value = IndexOp> {
    prop_oneof![
        8 => (key_strategy(), any::<u64>()).prop_map(|(k, v)| IndexOp::Put(k, v)),
        3 => key_strategy().prop_map(IndexOp::Get),
        1 => key_strategy().prop_map(IndexOp::Head),
        1 => key_strategy().prop_map(IndexOp::Tail),
        1 => (key_strategy(), key_strategy()).prop_map(|(a, b)| IndexOp::Sub(a.min(b), a.max(b))),
    ]
}

fn collect<'a>(entries: impl Iterator<Item = (&'a i32, &'a u64)>) -> Vec<(i32, u64)> {
    entries.map(|(k, v)| (*k, *v)).collect()
}

/// Runs `op` through the trait and reports what the caller observes.
fn observe<M: SortedMap<i32, u64>>(index: &mut M, op: &IndexOp) -> (Result<(), (i32, u64)>, Vec<(i32, u64)>) {
    match *op {
        IndexOp::Put(k, v) => (index.put(k, v).map_err(|err| err.into_parts()), Vec::new()),
        IndexOp::Get(k) => (Ok(()), index.get(&k).map(|v| (k, *v)).into_iter().collect()),
        IndexOp::Head(k) => (Ok(()), collect(index.head_map(&k))),
        IndexOp::Tail(k) => (Ok(()), collect(index.tail_map(&k))),
        IndexOp::Sub(from, to) => (Ok(()), collect(index.sub_map(&from, &to))),
    }
}

/// A keyed table that only knows its index through the trait.
struct Table<M> {
    rows: M,
}

impl<M: SortedMap<i32, u64>> Table<M> {
    fn insert(&mut self, id: i32, balance: u64) -> bool {
        self.rows.put(id, balance).is_ok()
    }

    fn total_between(&self, from: i32, to: i32) -> u64 {
        self.rows.sub_map(&from, &to).map(|(_, balance)| *balance).sum()
    }

    fn bounds(&self) -> Option<(i32, i32)> {
        Some((*self.rows.first_key()?, *self.rows.last_key()?))
    }
}

#[test]
fn table_behaves_the_same_on_either_index() {
    let mut tree = Table {
        rows: BpTreeMap::<i32, u64>::with_order(4).unwrap(),
    };
    let mut reference = Table {
        rows: BTreeMap::<i32, u64>::new(),
    };

    for id in [40, 10, 30, 20, 50, 10, 60, 5] {
        let balance = u64::try_from(id).unwrap() * 100;
        assert_eq!(tree.insert(id, balance), reference.insert(id, balance), "insert {id}");
    }

    assert_eq!(tree.rows.size(), 7);
    assert_eq!(tree.bounds(), Some((5, 60)));
    assert_eq!(tree.bounds(), reference.bounds());
    assert_eq!(tree.total_between(10, 50), 10_000);
    assert_eq!(tree.total_between(10, 50), reference.total_between(10, 50));
}

#[test]
fn empty_indexes_agree() {
    let tree: BpTreeMap<i32, u64> = BpTreeMap::new();
    let reference: BTreeMap<i32, u64> = BTreeMap::new();
    assert_eq!(SortedMap::first_key(&tree), SortedMap::first_key(&reference));
    assert_eq!(SortedMap::last_key(&tree), None);
    assert_eq!(SortedMap::size(&tree), 0);
    assert_eq!(collect(SortedMap::entries(&tree)), collect(SortedMap::entries(&reference)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Replays the same operations through the trait on both implementations.
    #[test]
    fn trait_operations_match(
        order in 3usize..12,
        ops in proptest::collection::vec(index_op_strategy(), TEST_SIZE),
    ) {
        let mut tree: BpTreeMap<i32, u64> = BpTreeMap::with_order(order).unwrap();
        let mut reference: BTreeMap<i32, u64> = BTreeMap::new();

        for op in &ops {
            prop_assert_eq!(observe(&mut tree, op), observe(&mut reference, op), "{:?}", op);
        }

        prop_assert_eq!(tree.size(), SortedMap::size(&reference));
        prop_assert_eq!(collect(tree.entries()), collect(SortedMap::entries(&reference)));
        prop_assert_eq!(tree.check_invariants(), Ok(()));
    }
}
