use log::trace;

use super::RBTree;
use super::node::{NodeRef, Side};

impl<T, E, L> RBTree<T, E, L> {
    /// Puts `new` where `old` used to hang: under `old`'s parent, or at the root.
    ///
    /// SAFETY: both nodes must belong to this tree.
    pub(super) unsafe fn replace_in_parent(&mut self, old: NodeRef<T>, new: Option<NodeRef<T>>) {
        unsafe {
            let parent = old.parent();
            match old.side_in_parent() {
                Some(side) => parent.expect("a node with a side has a parent").set_child(side, new),
                None => self.root = new,
            }
            if let Some(new) = new {
                new.set_parent(parent);
            }
        }
    }

    /// Rotates the subtree at `node` so that its child on the `opposite` of
    /// `toward` becomes the subtree root. Returns that pivot.
    ///
    /// `rotate(node, Side::Left)` is a left rotation: the right child comes up.
    ///
    /// SAFETY: `node` must belong to this tree.
    unsafe fn rotate(&mut self, node: NodeRef<T>, toward: Side) -> NodeRef<T> {
        let up = toward.opposite();
        unsafe {
            let pivot = node
                .child(up)
                .expect("rotation requires a child on the side being lifted");
            trace!("rotate {toward:?} at node #{} (pivot #{})", node.id(), pivot.id());

            let middle = pivot.child(toward);
            node.attach(up, middle);

            self.replace_in_parent(node, Some(pivot));
            pivot.attach(toward, Some(node));
            pivot
        }
    }

    /// Left rotation: `node.right` becomes the subtree root.
    ///
    /// SAFETY: `node` must belong to this tree.
    pub(super) unsafe fn rotate_left(&mut self, node: NodeRef<T>) -> NodeRef<T> {
        unsafe { self.rotate(node, Side::Left) }
    }

    /// Right rotation: `node.left` becomes the subtree root.
    ///
    /// SAFETY: `node` must belong to this tree.
    pub(super) unsafe fn rotate_right(&mut self, node: NodeRef<T>) -> NodeRef<T> {
        unsafe { self.rotate(node, Side::Right) }
    }

    /// Rotates `node` down toward `side`.
    ///
    /// SAFETY: `node` must belong to this tree.
    pub(super) unsafe fn rotate_toward(&mut self, node: NodeRef<T>, side: Side) -> NodeRef<T> {
        match side {
            Side::Left => unsafe { self.rotate_left(node) },
            Side::Right => unsafe { self.rotate_right(node) },
        }
    }
}
