#![deny(unsafe_op_in_unsafe_fn)]

// not concurrent
pub mod non_concurrent;

// the word dictionary built on the red-black tree
pub mod dictionary;

pub use non_concurrent::rbtree::RBTree;
