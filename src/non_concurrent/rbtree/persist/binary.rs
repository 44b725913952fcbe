//! ```text
//! u64 element_count
//! pre-order, per slot:
//!   u8 present          // 0: absent, nothing follows for this slot
//!   u8 color            // 0: black, 1: red
//!   <element bytes>
//!   <left slot>
//!   <right slot>
//! ```
//!
//! All integers are native byte order.

use std::io::{Read, Write};

use super::super::node::{Color, Link, Side};
use super::super::{RBTree, RBTreeError, StrictOrder};
use super::{BinaryCodec, Detached, MAX_DEPTH};

const ABSENT: u8 = 0;
const PRESENT: u8 = 1;

impl<T: BinaryCodec, E, L> RBTree<T, E, L> {
    pub fn write_binary<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), RBTreeError> {
        (self.size as u64).encode(writer)?;

        let mut pending: Vec<Link<T>> = vec![self.root];
        while let Some(link) = pending.pop() {
            match link {
                None => ABSENT.encode(writer)?,
                Some(node) => {
                    PRESENT.encode(writer)?;
                    // SAFETY: the tree is borrowed.
                    unsafe {
                        (node.color() as u8).encode(writer)?;
                        node.value().encode(writer)?;
                        pending.push(node.right());
                        pending.push(node.left());
                    }
                }
            }
        }
        Ok(())
    }
}

impl<T: BinaryCodec, E: Default, L: StrictOrder<T> + Default> RBTree<T, E, L> {
    pub fn read_binary<R: Read + ?Sized>(reader: &mut R) -> Result<Self, RBTreeError> {
        let mut tree = Self::new();
        tree.load_binary(reader)?;
        Ok(tree)
    }
}

impl<T: BinaryCodec, E, L: StrictOrder<T>> RBTree<T, E, L> {
    /// Replaces the contents of the tree with a binary snapshot.
    ///
    /// Truncation, bad flag or color bytes, undecodable elements, a wrong
    /// element count and an unbalanced or unordered tree are all reported as
    /// `CorruptStream`, and leave the tree as it was.
    pub fn load_binary<R: Read + ?Sized>(&mut self, reader: &mut R) -> Result<(), RBTreeError> {
        let count = u64::decode(reader).map_err(|err| RBTreeError::from_read(err, "element count"))?;
        let root = read_subtree(reader, 0)?;
        self.install(root, Some(count), true)
    }
}

fn read_subtree<T: BinaryCodec, R: Read + ?Sized>(reader: &mut R, depth: usize) -> Result<Detached<T>, RBTreeError> {
    let flag = u8::decode(reader).map_err(|err| RBTreeError::from_read(err, "presence flag"))?;
    match flag {
        ABSENT => return Ok(Detached::empty()),
        PRESENT => {}
        other => return Err(RBTreeError::corrupt(format!("presence flag must be 0 or 1, got {other}"))),
    }
    if depth >= MAX_DEPTH {
        return Err(RBTreeError::corrupt("tree is deeper than any red-black tree can be"));
    }

    let color_byte = u8::decode(reader).map_err(|err| RBTreeError::from_read(err, "node color"))?;
    let color = Color::from_byte(color_byte)
        .ok_or_else(|| RBTreeError::corrupt(format!("color must be 0 or 1, got {color_byte}")))?;
    let value = T::decode(reader).map_err(|err| RBTreeError::from_read(err, "element"))?;

    let mut subtree = Detached::leaf(color, value);
    subtree.attach(Side::Left, read_subtree(reader, depth + 1)?);
    subtree.attach(Side::Right, read_subtree(reader, depth + 1)?);
    Ok(subtree)
}
