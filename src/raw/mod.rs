mod arena;
mod handle;
mod node;
mod raw_bptree_map;
mod validate;

pub(crate) use node::Node;
pub(crate) use raw_bptree_map::{Position, RawBpTreeMap};
