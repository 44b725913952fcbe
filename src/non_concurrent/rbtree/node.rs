use std::fmt;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of the diagnostic node ids. Ids only ever go up.
static NODE_COUNT: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Red = 1,
}

impl Color {
    pub fn is_red(self) -> bool {
        matches!(self, Self::Red)
    }

    pub fn is_black(self) -> bool {
        matches!(self, Self::Black)
    }

    pub(crate) fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Black),
            1 => Some(Self::Red),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    pub(crate) fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

pub(crate) struct Node<T> {
    pub(crate) color: Color,
    pub(crate) value: T,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
    // non-owning, only ever used to walk upwards
    pub(crate) parent: Link<T>,
    pub(crate) id: usize,
}

pub(crate) type Link<T> = Option<NodeRef<T>>;

/// A copyable handle to a heap node.
///
/// The tree that allocated the node is its only owner. A `NodeRef` is never
/// kept past the lifetime of that tree's `&mut` or `&` borrow, which is what
/// makes the `unsafe` accessors below sound at their call sites.
#[repr(transparent)]
pub(crate) struct NodeRef<T> {
    ptr: NonNull<Node<T>>,
}

impl<T> Clone for NodeRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeRef<T> {}

impl<T> PartialEq for NodeRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<T> Eq for NodeRef<T> {}

impl<T> NodeRef<T> {
    /// Allocates a detached node.
    pub(crate) fn alloc(color: Color, value: T) -> Self {
        let id = NODE_COUNT.fetch_add(1, Ordering::Relaxed) + 1;
        let node = Box::new(Node {
            color,
            value,
            left: None,
            right: None,
            parent: None,
            id,
        });
        Self { ptr: NonNull::from(Box::leak(node)) }
    }

    /// Frees a single node and hands back its value.
    ///
    /// SAFETY: `self` must come from `alloc`, must not have been freed, and
    /// must already be unlinked from every other node.
    pub(crate) unsafe fn free(self) -> T {
        // SAFETY: guaranteed by caller.
        let node = unsafe { Box::from_raw(self.ptr.as_ptr()) };
        node.value
    }

    /// Frees every node of the subtree rooted at `link`.
    ///
    /// Walks with an explicit stack, so the depth of the subtree does not matter.
    ///
    /// SAFETY: the subtree must be owned by the caller and nothing may use
    /// any of its nodes afterwards.
    pub(crate) unsafe fn free_subtree(link: Link<T>) {
        let mut pending: Vec<NodeRef<T>> = link.into_iter().collect();
        while let Some(node) = pending.pop() {
            // SAFETY: each node is reachable from exactly one owner link, so
            // it is pushed and freed exactly once.
            unsafe {
                pending.extend(node.left());
                pending.extend(node.right());
                drop(node.free());
            }
        }
    }

    #[inline]
    fn as_ptr(self) -> *mut Node<T> {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) unsafe fn value<'a>(self) -> &'a T {
        unsafe { &(*self.as_ptr()).value }
    }

    #[inline]
    pub(crate) unsafe fn value_mut<'a>(self) -> &'a mut T {
        unsafe { &mut (*self.as_ptr()).value }
    }

    #[inline]
    pub(crate) unsafe fn id(self) -> usize {
        unsafe { (*self.as_ptr()).id }
    }

    #[inline]
    pub(crate) unsafe fn color(self) -> Color {
        unsafe { (*self.as_ptr()).color }
    }

    #[inline]
    pub(crate) unsafe fn set_color(self, color: Color) {
        unsafe { (*self.as_ptr()).color = color }
    }

    #[inline]
    pub(crate) unsafe fn parent(self) -> Link<T> {
        unsafe { (*self.as_ptr()).parent }
    }

    #[inline]
    pub(crate) unsafe fn set_parent(self, parent: Link<T>) {
        unsafe { (*self.as_ptr()).parent = parent }
    }

    #[inline]
    pub(crate) unsafe fn left(self) -> Link<T> {
        unsafe { (*self.as_ptr()).left }
    }

    #[inline]
    pub(crate) unsafe fn right(self) -> Link<T> {
        unsafe { (*self.as_ptr()).right }
    }

    #[inline]
    pub(crate) unsafe fn child(self, side: Side) -> Link<T> {
        match side {
            Side::Left => unsafe { self.left() },
            Side::Right => unsafe { self.right() },
        }
    }

    #[inline]
    pub(crate) unsafe fn set_child(self, side: Side, child: Link<T>) {
        unsafe {
            match side {
                Side::Left => (*self.as_ptr()).left = child,
                Side::Right => (*self.as_ptr()).right = child,
            }
        }
    }

    /// Links `child` under `self` on `side`, fixing up the child's back-reference.
    #[inline]
    pub(crate) unsafe fn attach(self, side: Side, child: Link<T>) {
        unsafe {
            self.set_child(side, child);
            if let Some(child) = child {
                child.set_parent(Some(self));
            }
        }
    }

    /// Which side of its parent `self` hangs on, if it has a parent.
    #[inline]
    pub(crate) unsafe fn side_in_parent(self) -> Option<Side> {
        let parent = unsafe { self.parent() }?;
        if unsafe { parent.left() } == Some(self) {
            Some(Side::Left)
        } else {
            Some(Side::Right)
        }
    }

    #[inline]
    pub(crate) unsafe fn has_no_kids(self) -> bool {
        unsafe { self.left().is_none() && self.right().is_none() }
    }
}

/// Absent links count as black.
#[inline]
pub(crate) unsafe fn is_red<T>(link: Link<T>) -> bool {
    match link {
        Some(node) => unsafe { node.color() }.is_red(),
        None => false,
    }
}

/// Writes a node the way both the text format and the pretty printer show it.
pub(crate) struct NodeLabel<'a, T> {
    pub(crate) value: &'a T,
    pub(crate) color: Color,
}

impl<T: fmt::Display> fmt::Display for NodeLabel<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.value, self.color as u8)
    }
}

impl<T: fmt::Debug> fmt::Debug for NodeRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // SAFETY: handles are only formatted while their tree is borrowed.
        let node = unsafe { &*self.as_ptr() };
        f.debug_struct("Node")
            .field("id", &node.id)
            .field("value", &node.value)
            .field("color", &node.color)
            .field("left", &node.left)
            .field("right", &node.right)
            .finish()
    }
}
