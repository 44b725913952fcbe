//! Snapshot formats for [`RBTree`].
//!
//! Both formats are flat pre-order dumps of the node structure, colors
//! included, so a tree reads back with exactly the shape it was written with.
//! They are not interchangeable.

use log::debug;

use super::node::{Color, Link, NodeRef, Side};
use super::traverse::Nodes;
use super::{RBTree, RBTreeError, StrictOrder};

mod binary;
mod codec;
mod text;

pub use codec::{BinaryCodec, TextCursor, TextDecode, TextError};

/// No red-black tree with at most `usize::MAX` elements is deeper than this.
const MAX_DEPTH: usize = 2 * usize::BITS as usize;

/// A decoded subtree that is not part of any tree yet.
///
/// Freed on drop, so a reader that bails out halfway does not leak.
struct Detached<T>(Link<T>);

impl<T> Detached<T> {
    fn empty() -> Self {
        Self(None)
    }

    fn leaf(color: Color, value: T) -> Self {
        Self(Some(NodeRef::alloc(color, value)))
    }

    /// Hangs `child` under this subtree's root.
    fn attach(&mut self, side: Side, child: Detached<T>) {
        let root = self.0.expect("only leaves get children attached");
        // SAFETY: we own both subtrees; ownership of `child` moves into `root`.
        unsafe { root.attach(side, child.into_link()) };
    }

    fn into_link(mut self) -> Link<T> {
        self.0.take()
    }
}

impl<T> Drop for Detached<T> {
    fn drop(&mut self) {
        // SAFETY: a detached subtree is owned by nobody else.
        unsafe { NodeRef::free_subtree(self.0.take()) };
    }
}

impl<T, E, L: StrictOrder<T>> RBTree<T, E, L> {
    /// Replaces the contents of the tree with a decoded subtree.
    ///
    /// If `expected` is given it must match the number of decoded nodes. With
    /// `validate`, the new contents must also pass `check_invariants`. When a
    /// check fails the tree keeps its old contents.
    fn install(&mut self, subtree: Detached<T>, expected: Option<u64>, validate: bool) -> Result<(), RBTreeError> {
        let actual = Nodes::new(subtree.0).count();
        if let Some(expected) = expected {
            if expected != actual as u64 {
                return Err(RBTreeError::corrupt(format!(
                    "header promises {expected} elements but the stream holds {actual}"
                )));
            }
        }

        let old_size = self.size;
        let old_root = self.replace_root(subtree.into_link(), actual);
        if validate {
            if let Err(violation) = self.check_invariants() {
                let rejected = self.replace_root(old_root, old_size);
                drop(Detached(rejected));
                return Err(RBTreeError::corrupt(format!("decoded tree is not a valid red-black tree: {violation}")));
            }
        }
        drop(Detached(old_root));
        // unvalidated input may come with a red root
        self.restore_root_property();
        debug!("loaded tree with {actual} elements");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_rejects_count_mismatch() {
        let mut tree: RBTree<u32> = [1, 2].into_iter().collect();
        let decoded = Detached::leaf(Color::Black, 7);
        let err = tree.install(decoded, Some(2), true).unwrap_err();
        assert!(matches!(err, RBTreeError::CorruptStream { .. }));
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn install_rejects_invalid_tree() {
        let mut tree: RBTree<u32> = [1, 2].into_iter().collect();
        let mut decoded = Detached::leaf(Color::Black, 2);
        decoded.attach(Side::Left, Detached::leaf(Color::Black, 1));
        assert!(tree.install(decoded, None, true).is_err());
        assert_eq!(tree.len(), 2);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn install_without_validation() {
        let mut tree = RBTree::<u32>::new();
        let mut decoded = Detached::leaf(Color::Black, 2);
        decoded.attach(Side::Right, Detached::leaf(Color::Black, 3));
        tree.install(decoded, None, false).unwrap();
        assert_eq!(tree.len(), 2);
        assert!(tree.check_invariants().is_err());
    }

    #[test]
    fn install_blackens_red_root() {
        let mut tree = RBTree::<u32>::new();
        tree.install(Detached::leaf(Color::Red, 1), None, false).unwrap();
        assert_eq!(tree.root_color(), Some(Color::Black));
        assert_eq!(tree.check_invariants(), Ok(1));
    }
}
