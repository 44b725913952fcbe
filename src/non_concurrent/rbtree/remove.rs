use log::{debug, trace, warn};

use super::node::{Color, NodeRef, Side, is_red};
use super::{Equivalence, RBTree, RBTreeError, StrictOrder};

impl<T, E: Equivalence<T>, L: StrictOrder<T>> RBTree<T, E, L> {
    /// Removes the element equivalent to `value` and hands it back.
    ///
    /// Fails with `EmptyTree` or `NotFound` without touching the tree.
    ///
    /// Complexity: O(log(n))
    pub fn remove(&mut self, value: &T) -> Result<T, RBTreeError> {
        if self.is_empty() {
            return Err(RBTreeError::EmptyTree);
        }
        let target = self.find_node(value)?;

        // SAFETY: `target` and everything we reach from it belong to this tree,
        // which we hold exclusively.
        let removed = unsafe {
            let doomed = match (target.left(), target.right()) {
                (Some(_), Some(right)) => {
                    // the successor's value moves up, the target's value goes
                    // down into the node that is about to be freed
                    let successor = leftmost(right);
                    std::mem::swap(target.value_mut(), successor.value_mut());
                    successor
                }
                _ => target,
            };
            self.unlink(doomed)
        };

        self.restore_root_property();
        self.size -= 1;
        debug!("removed element, size is now {}", self.size);
        Ok(removed)
    }

    /// Splices out a node with at most one child, then repairs black-height.
    ///
    /// SAFETY: `node` must belong to this tree and have at most one child.
    unsafe fn unlink(&mut self, node: NodeRef<T>) -> T {
        unsafe {
            debug_assert!(node.left().is_none() || node.right().is_none());
            let child = node.left().or(node.right());
            let parent = node.parent();
            let side = node.side_in_parent();
            let color = node.color();

            let kind = if node.has_no_kids() { "childless" } else { "one child" };
            trace!("unlinking node #{} ({color:?}, {kind})", node.id());
            self.replace_in_parent(node, child);
            let value = node.free();

            if let (Some(parent), Some(side), Color::Black) = (parent, side, color) {
                self.fix_black_height(parent, side);
            }
            value
        }
    }

    /// Restores the black-height on `side` of `parent`, which is one short.
    ///
    /// SAFETY: `parent` must belong to this tree.
    unsafe fn fix_black_height(&mut self, mut parent: NodeRef<T>, mut side: Side) {
        unsafe {
            loop {
                if let Some(child) = parent.child(side).filter(|c| c.color().is_red()) {
                    trace!("remove fixup at #{}: red child absorbs", child.id());
                    child.set_color(Color::Black);
                    return;
                }

                let far = side.opposite();
                let Some(sibling) = parent.child(far) else {
                    warn!("node #{} has no sibling for its short side, tree was not balanced", parent.id());
                    return;
                };

                if sibling.color().is_red() {
                    trace!("remove fixup at #{}: red sibling", parent.id());
                    self.rotate_toward(parent, side);
                    parent.set_color(Color::Red);
                    sibling.set_color(Color::Black);
                    continue;
                }

                if !is_red(sibling.left()) && !is_red(sibling.right()) {
                    trace!("remove fixup at #{}: black sibling, black children", parent.id());
                    sibling.set_color(Color::Red);
                    match (parent.parent(), parent.side_in_parent()) {
                        (Some(grandparent), Some(parent_side)) => {
                            parent = grandparent;
                            side = parent_side;
                            continue;
                        }
                        // the deficiency reached the root, where it costs nothing
                        _ => return,
                    }
                }

                if let Some(far_child) = sibling.child(far).filter(|c| c.color().is_red()) {
                    trace!("remove fixup at #{}: red far nephew", parent.id());
                    self.rotate_toward(parent, side);
                    sibling.set_color(parent.color());
                    parent.set_color(Color::Black);
                    far_child.set_color(Color::Black);
                    return;
                }

                trace!("remove fixup at #{}: red near nephew", parent.id());
                let nephew = self.rotate_toward(sibling, far);
                sibling.set_color(Color::Red);
                nephew.set_color(Color::Black);
            }
        }
    }
}

/// SAFETY: `node` must be alive.
unsafe fn leftmost<T>(mut node: NodeRef<T>) -> NodeRef<T> {
    while let Some(left) = unsafe { node.left() } {
        node = left;
    }
    node
}
