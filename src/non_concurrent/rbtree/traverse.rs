use std::fmt;
use std::marker::PhantomData;

use super::node::{Link, NodeLabel, NodeRef, Side};
use super::{Equivalence, InvariantViolation, RBTree, StrictOrder};

/// In-order walk over the nodes of a tree, using an explicit stack.
pub(super) struct Nodes<'a, T> {
    stack: Vec<NodeRef<T>>,
    _tree: PhantomData<&'a T>,
}

impl<T> Nodes<'_, T> {
    pub(super) fn new(root: Link<T>) -> Self {
        let mut nodes = Self { stack: Vec::new(), _tree: PhantomData };
        nodes.push_left_spine(root);
        nodes
    }

    fn push_left_spine(&mut self, mut link: Link<T>) {
        while let Some(node) = link {
            self.stack.push(node);
            // SAFETY: the tree is borrowed for `'a`.
            link = unsafe { node.left() };
        }
    }
}

impl<T> Iterator for Nodes<'_, T> {
    type Item = NodeRef<T>;

    fn next(&mut self) -> Option<NodeRef<T>> {
        let node = self.stack.pop()?;
        // SAFETY: the tree is borrowed for `'a`.
        self.push_left_spine(unsafe { node.right() });
        Some(node)
    }
}

/// Iterator over the elements of an [`RBTree`] in increasing order.
pub struct Iter<'a, T> {
    nodes: Nodes<'a, T>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.nodes.next()?;
        self.remaining = self.remaining.saturating_sub(1);
        // SAFETY: the tree outlives `'a` and cannot be mutated meanwhile.
        Some(unsafe { node.value() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, E, L> RBTree<T, E, L> {
    /// Full in-order traversal.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { nodes: self.nodes(), remaining: self.size }
    }

    pub(super) fn nodes(&self) -> Nodes<'_, T> {
        Nodes::new(self.root)
    }

    /// Number of nodes on the longest path from the root down. Zero when empty.
    pub fn height(&self) -> usize {
        // SAFETY: the tree is borrowed.
        unsafe { subtree_height(self.root) }
    }

    /// A `Display` adapter that draws the tree sideways, largest element on top.
    pub fn pretty(&self) -> Pretty<'_, T, E, L> {
        Pretty { tree: self }
    }
}

impl<'a, T, E, L> IntoIterator for &'a RBTree<T, E, L> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T, E: Equivalence<T>, L> RBTree<T, E, L> {
    /// Whether both trees have the same shape, the same colors, and
    /// equivalent elements in matching positions.
    pub fn structural_eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self.root, other.root)];
        while let Some(pair) = pending.pop() {
            match pair {
                (None, None) => {}
                (Some(a), Some(b)) => unsafe {
                    // SAFETY: both trees are borrowed.
                    if a.color() != b.color() || !self.eq.equivalent(a.value(), b.value()) {
                        return false;
                    }
                    pending.push((a.left(), b.left()));
                    pending.push((a.right(), b.right()));
                },
                _ => return false,
            }
        }
        true
    }
}

impl<T, E, L: StrictOrder<T>> RBTree<T, E, L> {
    /// Checks every red-black rule plus the parent links and the element count.
    ///
    /// Returns the black-height of the tree: the number of black nodes on any
    /// path from the root down to an absent child.
    pub fn check_invariants(&self) -> Result<usize, InvariantViolation> {
        let Some(root) = self.root else {
            return match self.size {
                0 => Ok(0),
                stored => Err(InvariantViolation::SizeMismatch { stored, actual: 0 }),
            };
        };

        // SAFETY: the tree is borrowed.
        unsafe {
            if root.color().is_red() {
                return Err(InvariantViolation::RedRoot);
            }
            if root.parent().is_some() {
                return Err(InvariantViolation::RootHasParent);
            }

            let (black_height, actual) = check_subtree(root)?;

            let mut previous: Option<&T> = None;
            for node in self.nodes() {
                let value = node.value();
                if let Some(previous) = previous {
                    if !self.less.less(previous, value) {
                        return Err(InvariantViolation::OutOfOrder { id: node.id() });
                    }
                }
                previous = Some(value);
            }

            if actual != self.size {
                return Err(InvariantViolation::SizeMismatch { stored: self.size, actual });
            }
            Ok(black_height)
        }
    }
}

/// Returns `(black-height, node count)` of the subtree at `node`.
///
/// SAFETY: `node` must be alive.
unsafe fn check_subtree<T>(node: NodeRef<T>) -> Result<(usize, usize), InvariantViolation> {
    unsafe {
        let mut heights = [0; 2];
        let mut count = 1;
        for (slot, side) in [Side::Left, Side::Right].into_iter().enumerate() {
            let Some(child) = node.child(side) else { continue };
            if child.parent() != Some(node) {
                return Err(InvariantViolation::BrokenParentLink { id: child.id() });
            }
            if node.color().is_red() && child.color().is_red() {
                return Err(InvariantViolation::RedRedEdge { id: node.id() });
            }
            let (height, nodes) = check_subtree(child)?;
            heights[slot] = height;
            count += nodes;
        }

        let [left, right] = heights;
        if left != right {
            return Err(InvariantViolation::BlackHeightMismatch { id: node.id(), left, right });
        }
        Ok((left + usize::from(node.color().is_black()), count))
    }
}

/// SAFETY: the subtree must be alive.
unsafe fn subtree_height<T>(link: Link<T>) -> usize {
    match link {
        None => 0,
        Some(node) => unsafe { 1 + subtree_height(node.left()).max(subtree_height(node.right())) },
    }
}

pub struct Pretty<'a, T, E, L> {
    tree: &'a RBTree<T, E, L>,
}

impl<T: fmt::Display, E, L> Pretty<'_, T, E, L> {
    /// Right subtree above, left subtree below, four columns per level.
    ///
    /// SAFETY: `node` must belong to the borrowed tree.
    unsafe fn write_subtree(f: &mut fmt::Formatter<'_>, node: NodeRef<T>, indent: usize) -> fmt::Result {
        unsafe {
            if let Some(right) = node.right() {
                Self::write_subtree(f, right, indent + 4)?;
                writeln!(f, "{:pad$} /", "", pad = indent)?;
            }
            let label = NodeLabel { value: node.value(), color: node.color() };
            writeln!(f, "{:pad$}{label}", "", pad = indent)?;
            if let Some(left) = node.left() {
                writeln!(f, "{:pad$} \\", "", pad = indent)?;
                Self::write_subtree(f, left, indent + 4)?;
            }
            Ok(())
        }
    }
}

impl<T: fmt::Display, E, L> fmt::Display for Pretty<'_, T, E, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tree.root {
            // SAFETY: the tree is borrowed for the whole call.
            Some(root) => unsafe { Self::write_subtree(f, root, 0) },
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::non_concurrent::rbtree::Color;
    use pretty_assertions::assert_eq;

    #[test]
    fn iteration_is_sorted() {
        let tree: RBTree<i64> = [5, -3, 12, 0, 7, 7, 100, -40].into_iter().collect();
        let items: Vec<_> = tree.iter().copied().collect();
        assert_eq!(items, vec![-40, -3, 0, 5, 7, 12, 100]);
        assert_eq!(tree.iter().size_hint(), (7, Some(7)));
        assert_eq!((&tree).into_iter().count(), 7);
    }

    #[test]
    fn empty_iteration() {
        let tree = RBTree::<u8>::new();
        assert_eq!(tree.iter().next(), None);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.check_invariants(), Ok(0));
        assert_eq!(tree.pretty().to_string(), "");
    }

    #[test]
    fn equal_trees() {
        let a: RBTree<u32> = (0..20).collect();
        let b: RBTree<u32> = (0..20).collect();
        assert!(a.structural_eq(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn same_elements_different_shape() {
        let a: RBTree<u32> = (0..20).collect();
        let b: RBTree<u32> = (0..20).rev().collect();
        assert!(a.iter().eq(b.iter()));
        assert!(!a.structural_eq(&b));
    }

    #[test]
    fn color_difference_breaks_equality() {
        let a: RBTree<u32> = [2, 1, 3].into_iter().collect();
        let b: RBTree<u32> = [2, 1, 3].into_iter().collect();
        unsafe { b.root.unwrap().left().unwrap().set_color(Color::Black) };
        assert_ne!(a, b);
    }

    #[test]
    fn empty_vs_nonempty() {
        let a = RBTree::<u32>::new();
        let b: RBTree<u32> = [1].into_iter().collect();
        assert!(a.structural_eq(&RBTree::new()));
        assert!(!a.structural_eq(&b));
        assert!(!b.structural_eq(&a));
    }

    #[test]
    fn pretty_prints_sideways() {
        let tree: RBTree<&str> = ["a", "b", "c"].into_iter().collect();
        let expected = "    (c, 1)\n /\n(b, 0)\n \\\n    (a, 1)\n";
        assert_eq!(tree.pretty().to_string(), expected);
    }

    #[test]
    fn detects_red_red_edge() {
        let tree: RBTree<u32> = [2, 1, 3, 0].into_iter().collect();
        unsafe { tree.root.unwrap().left().unwrap().set_color(Color::Red) };
        assert!(matches!(tree.check_invariants(), Err(InvariantViolation::RedRedEdge { .. })));
    }

    #[test]
    fn detects_black_height_mismatch() {
        let tree: RBTree<u32> = [2, 1, 3].into_iter().collect();
        unsafe { tree.root.unwrap().left().unwrap().set_color(Color::Black) };
        assert!(matches!(
            tree.check_invariants(),
            Err(InvariantViolation::BlackHeightMismatch { left: 1, right: 0, .. })
        ));
    }

    #[test]
    fn detects_out_of_order() {
        let mut tree: RBTree<u32> = [2, 1, 3].into_iter().collect();
        unsafe { *tree.root.unwrap().left().unwrap().value_mut() = 9 };
        assert!(matches!(tree.check_invariants(), Err(InvariantViolation::OutOfOrder { .. })));
        tree.clear();
    }

    #[test]
    fn detects_red_root() {
        let tree: RBTree<u32> = [1].into_iter().collect();
        unsafe { tree.root.unwrap().set_color(Color::Red) };
        assert_eq!(tree.check_invariants(), Err(InvariantViolation::RedRoot));
    }
}
