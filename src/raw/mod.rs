mod arena;
mod handle;
mod node;
mod raw_avl_tree;
mod raw_rb_tree;
mod raw_skip_list;

pub(crate) use handle::{Handle, Link};
pub use node::Color;
pub(crate) use raw_avl_tree::RawAvlTree;
pub(crate) use raw_rb_tree::RawRbTree;
pub(crate) use raw_skip_list::{MAX_LEVEL, RawSkipList};
