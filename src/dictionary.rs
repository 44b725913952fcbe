//! A case-insensitive word → number dictionary on top of [`RBTree`], and the
//! line protocol the `rbdict` binary speaks.
//!
//! [`RBTree`]: crate::non_concurrent::rbtree::RBTree

mod command;
mod entry;

pub use command::{Command, ParseError, PersistFormat, Session};
pub use entry::{Dictionary, KeyEq, KeyLess, KeyValuePair, lower};
