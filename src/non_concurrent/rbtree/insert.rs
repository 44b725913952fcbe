use log::{debug, trace, warn};

use super::node::{Color, NodeRef, is_red};
use super::{Equivalence, RBTree, RBTreeError, Slot, StrictOrder};

impl<T, E: Equivalence<T>, L: StrictOrder<T>> RBTree<T, E, L> {
    /// Inserts `value`, failing if an equivalent element is already present.
    ///
    /// On failure the tree is untouched and `value` is dropped.
    ///
    /// Complexity: O(log(n))
    pub fn insert(&mut self, value: T) -> Result<(), RBTreeError> {
        let node = match self.locate(&value) {
            None => {
                self.root = Some(NodeRef::alloc(Color::Black, value));
                self.size += 1;
                debug!("inserted root element, size is now {}", self.size);
                return Ok(());
            }
            Some(Slot::Occupied(_)) => return Err(RBTreeError::DuplicateKey),
            Some(Slot::Vacant(parent, side)) => {
                let leaf = NodeRef::alloc(Color::Red, value);
                // SAFETY: `parent` was found by descending from our root.
                unsafe { parent.attach(side, Some(leaf)) };
                leaf
            }
        };

        // SAFETY: `node` was just linked into this tree.
        unsafe { self.balance_from(node) };
        self.size += 1;
        debug!("inserted element, size is now {}", self.size);
        Ok(())
    }

    /// Walks the red-red violation at `node` up the tree until it is gone.
    ///
    /// SAFETY: `node` must belong to this tree.
    unsafe fn balance_from(&mut self, mut node: NodeRef<T>) {
        unsafe {
            while node.color().is_red() {
                let Some(parent) = node.parent().filter(|p| p.color().is_red()) else {
                    break;
                };
                let (Some(grandparent), Some(parent_side)) = (parent.parent(), parent.side_in_parent()) else {
                    warn!("red root #{} found during insert fixup, tree was not balanced", parent.id());
                    parent.set_color(Color::Black);
                    break;
                };
                let uncle = grandparent.child(parent_side.opposite());

                if is_red(uncle) {
                    trace!("insert fixup at #{}: red uncle", node.id());
                    parent.set_color(Color::Black);
                    if let Some(uncle) = uncle {
                        uncle.set_color(Color::Black);
                    }
                    grandparent.set_color(Color::Red);
                    node = grandparent;
                    continue;
                }

                let mut parent = parent;
                if node.side_in_parent() != Some(parent_side) {
                    trace!("insert fixup at #{}: triangle", node.id());
                    // the rotation swaps the roles of `node` and `parent`
                    self.rotate_toward(parent, parent_side);
                    parent = node;
                }

                trace!("insert fixup at #{}: line", parent.id());
                parent.set_color(Color::Black);
                grandparent.set_color(Color::Red);
                self.rotate_toward(grandparent, parent_side.opposite());
                node = parent;
            }

            self.restore_root_property();
        }
    }
}

impl<T, E, L> RBTree<T, E, L> {
    pub(super) fn restore_root_property(&mut self) {
        if let Some(root) = self.root {
            // SAFETY: the root belongs to this tree.
            unsafe { root.set_color(Color::Black) };
        }
    }
}

impl<T, E, L> FromIterator<T> for RBTree<T, E, L>
where
    E: Equivalence<T> + Default,
    L: StrictOrder<T> + Default,
{
    /// Builds a tree from `iter`, keeping the first of any equivalent elements.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T, E: Equivalence<T>, L: StrictOrder<T>> Extend<T> for RBTree<T, E, L> {
    /// Inserts every element, skipping ones already present.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            match self.insert(value) {
                Ok(()) | Err(RBTreeError::DuplicateKey) => {}
                Err(err) => warn!("skipping element: {err}"),
            }
        }
    }
}
