//! A red-black tree with pluggable ordering and two snapshot formats.
//!
//! Children are owned through raw `NonNull` links that the tree allocates and
//! frees itself; the parent link is a plain back-reference used only to walk
//! upwards during rotations and fixups. Every node reachable from `root` is
//! owned by exactly one link, and all mutation goes through `&mut RBTree`, so
//! the node accessors in this module are only ever called while the tree
//! holds the only access to its nodes.

// PROVE: any node with height `h` has black height at least `h/2`
// PROVE: the subtree located at any node `x` contains at least `2^bh(x) - 1` nodes (use induction)
// LEMMA: An RBTree with `n` internal nodes has height at most `2*log₂(n+1)`

use std::marker::PhantomData;

mod error;
mod insert;
mod node;
pub mod persist;
pub mod policy;
mod remove;
mod rotate;
mod traverse;

pub use error::{InvariantViolation, RBTreeError};
pub use node::Color;
pub use persist::{BinaryCodec, TextCursor, TextDecode, TextError};
pub use policy::{EqualTo, Equivalence, FnPolicy, Less, StrictOrder};
pub use traverse::{Iter, Pretty};

use node::{Link, NodeRef, Side};

pub struct RBTree<T, E = EqualTo, L = Less> {
    root: Link<T>,
    size: usize,
    eq: E,
    less: L,
    // we own the nodes (and so their `T`s)
    _owns: PhantomData<Box<node::Node<T>>>,
}

// SAFETY: the tree owns every node exclusively, like a `Box<T>` would, and
// hands out `&T`/`T` only through `&self`/`&mut self`.
unsafe impl<T: Send, E: Send, L: Send> Send for RBTree<T, E, L> {}
unsafe impl<T: Sync, E: Sync, L: Sync> Sync for RBTree<T, E, L> {}

/// Where a value would go: either on an existing node or under a parent.
enum Slot<T> {
    Occupied(NodeRef<T>),
    Vacant(NodeRef<T>, Side),
}

impl<T, E: Default, L: Default> RBTree<T, E, L> {
    pub fn new() -> Self {
        Self::with_policies(E::default(), L::default())
    }
}

impl<T, E: Default, L: Default> Default for RBTree<T, E, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E, L> RBTree<T, E, L> {
    pub fn with_policies(eq: E, less: L) -> Self {
        Self {
            root: None,
            size: 0,
            eq,
            less,
            _owns: PhantomData,
        }
    }

    /// The amount of elements in the tree.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Drops every element. Clearing an empty tree does nothing.
    pub fn clear(&mut self) {
        let root = self.root.take();
        // SAFETY: the root was just unlinked from the tree, which owned it.
        unsafe { NodeRef::free_subtree(root) };
        self.size = 0;
    }

    /// The color of the root node, if any. Always `Black` for a valid tree.
    pub fn root_color(&self) -> Option<Color> {
        // SAFETY: the root is owned by `self`, which is borrowed.
        self.root.map(|root| unsafe { root.color() })
    }

    /// Swaps out the whole node structure. The old root is handed back.
    fn replace_root(&mut self, root: Link<T>, size: usize) -> Link<T> {
        self.size = size;
        std::mem::replace(&mut self.root, root)
    }
}

impl<T, E: Equivalence<T>, L: StrictOrder<T>> RBTree<T, E, L> {
    /// Ordered descent from the root.
    ///
    /// Complexity: O(log(n))
    fn locate(&self, value: &T) -> Option<Slot<T>> {
        let mut node = self.root?;
        loop {
            // SAFETY: `node` is reachable from the root, so it is alive.
            let current = unsafe { node.value() };
            if self.eq.equivalent(current, value) {
                return Some(Slot::Occupied(node));
            }
            let side = if self.less.less(current, value) { Side::Right } else { Side::Left };
            // SAFETY: same as above.
            match unsafe { node.child(side) } {
                Some(child) => node = child,
                None => return Some(Slot::Vacant(node, side)),
            }
        }
    }

    fn find_node(&self, value: &T) -> Result<NodeRef<T>, RBTreeError> {
        match self.locate(value) {
            Some(Slot::Occupied(node)) => Ok(node),
            _ => Err(RBTreeError::NotFound),
        }
    }

    /// Returns the stored element equivalent to `value`.
    ///
    /// Complexity: O(log(n))
    pub fn find(&self, value: &T) -> Result<&T, RBTreeError> {
        let node = self.find_node(value)?;
        // SAFETY: the node lives as long as the `&self` borrow does.
        Ok(unsafe { node.value() })
    }

    pub fn contains(&self, value: &T) -> bool {
        self.find_node(value).is_ok()
    }
}

impl<T, E, L> Drop for RBTree<T, E, L> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T, E: Equivalence<T>, L> PartialEq for RBTree<T, E, L> {
    fn eq(&self, other: &Self) -> bool {
        self.structural_eq(other)
    }
}

impl<T: std::fmt::Debug, E, L> std::fmt::Debug for RBTree<T, E, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RBTree")
            .field("size", &self.size)
            .field("root", &self.root)
            .finish()
    }
}
