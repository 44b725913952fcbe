//! `(<element>, <color>)` per node in pre-order, `N` for every absent child.
//!
//! A three element tree reads `(b, 0)(a, 1)NN(c, 1)NN`.

use std::fmt::{Display, Write as _};
use std::io::{self, Read, Write};

use log::warn;

use super::super::node::{Color, Link, NodeLabel, Side};
use super::super::{RBTree, RBTreeError, StrictOrder};
use super::{Detached, MAX_DEPTH, TextCursor, TextDecode, TextError};

impl<T: Display + TextDecode, E, L> RBTree<T, E, L> {
    /// Writes the snapshot. Nothing is written if some element's text form
    /// would not read back as that one element, say a `String` with a space;
    /// that is reported as an `InvalidInput` I/O error.
    pub fn write_text<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), RBTreeError> {
        writer.write_all(self.to_text()?.as_bytes())?;
        Ok(())
    }

    pub fn to_text(&self) -> Result<String, RBTreeError> {
        let mut out = String::new();
        let mut pending: Vec<Link<T>> = vec![self.root];
        while let Some(link) = pending.pop() {
            match link {
                None => out.push('N'),
                Some(node) => {
                    // SAFETY: the tree is borrowed.
                    let (value, color, left, right) = unsafe { (node.value(), node.color(), node.left(), node.right()) };
                    let rendered = value.to_string();
                    if !T::reads_back(&rendered) {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidInput,
                            format!("element `{rendered}` cannot be read back from text"),
                        )
                        .into());
                    }
                    write!(out, "{}", NodeLabel { value: &rendered, color }).expect("writing to a String cannot fail");
                    pending.push(right);
                    pending.push(left);
                }
            }
        }
        Ok(out)
    }
}

impl<T: TextDecode, E: Default, L: StrictOrder<T> + Default> RBTree<T, E, L> {
    /// Strict read: anything malformed is `CorruptStream`.
    pub fn read_text<R: Read + ?Sized>(reader: &mut R) -> Result<Self, RBTreeError> {
        let mut tree = Self::new();
        tree.load_text(reader)?;
        Ok(tree)
    }

    /// Lenient read, see [`RBTree::load_text_lenient`].
    pub fn read_text_lenient<R: Read + ?Sized>(reader: &mut R) -> Result<Self, RBTreeError> {
        let mut tree = Self::new();
        tree.load_text_lenient(reader)?;
        Ok(tree)
    }
}

impl<T: TextDecode, E, L: StrictOrder<T>> RBTree<T, E, L> {
    /// Replaces the contents of the tree with a text snapshot.
    ///
    /// The snapshot must be well formed, have nothing but whitespace after
    /// it, and describe a valid red-black tree. Otherwise the tree is left as
    /// it was.
    pub fn load_text<R: Read + ?Sized>(&mut self, reader: &mut R) -> Result<(), RBTreeError> {
        let mut input = String::new();
        reader
            .read_to_string(&mut input)
            .map_err(|err| RBTreeError::from_read(err, "text snapshot"))?;

        let mut cursor = TextCursor::new(&input);
        let root = read_subtree_strict(&mut cursor, 0).map_err(|err| RBTreeError::corrupt(err.to_string()))?;
        if !cursor.is_at_end() {
            return Err(RBTreeError::corrupt(cursor.error("trailing data after tree").to_string()));
        }
        self.install(root, None, true)
    }

    /// Replaces the contents of the tree with a text snapshot, salvaging what
    /// it can.
    ///
    /// A node that fails to read is taken to be an absent subtree: whatever
    /// was decoded of it is dropped and reading carries on with the rest of
    /// the input. Only a failure of `reader` itself is reported. The result is
    /// not checked for balance.
    pub fn load_text_lenient<R: Read + ?Sized>(&mut self, reader: &mut R) -> Result<(), RBTreeError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let input = String::from_utf8_lossy(&bytes);

        let mut cursor = TextCursor::new(&input);
        let root = read_subtree_lenient(&mut cursor, 0);
        self.install(root, None, false)
    }
}

/// Reads the `(<element>, <color>)` part of a node, or `N`.
fn read_node<T: TextDecode>(cursor: &mut TextCursor<'_>) -> Result<Option<(T, Color)>, TextError> {
    match cursor.next_char() {
        Some('N') => return Ok(None),
        Some('(') => {}
        Some(c) => return Err(cursor.error(format!("expected `(` or `N`, found `{c}`"))),
        None => return Err(cursor.error("unexpected end of input")),
    }
    let value = T::decode_text(cursor)?;
    cursor.expect_char(',')?;
    let color = match cursor.next_char() {
        Some('0') => Color::Black,
        Some('1') => Color::Red,
        _ => return Err(cursor.error("color must be `0` or `1`")),
    };
    cursor.expect_char(')')?;
    Ok(Some((value, color)))
}

fn read_subtree_strict<T: TextDecode>(cursor: &mut TextCursor<'_>, depth: usize) -> Result<Detached<T>, TextError> {
    let Some((value, color)) = read_node(cursor)? else {
        return Ok(Detached::empty());
    };
    if depth >= MAX_DEPTH {
        return Err(cursor.error("tree is deeper than any red-black tree can be"));
    }
    let mut subtree = Detached::leaf(color, value);
    subtree.attach(Side::Left, read_subtree_strict(cursor, depth + 1)?);
    subtree.attach(Side::Right, read_subtree_strict(cursor, depth + 1)?);
    Ok(subtree)
}

fn read_subtree_lenient<T: TextDecode>(cursor: &mut TextCursor<'_>, depth: usize) -> Detached<T> {
    let (value, color) = match read_node(cursor) {
        Ok(Some(node)) => node,
        Ok(None) => return Detached::empty(),
        Err(err) => {
            warn!("dropping unreadable subtree: {err}");
            return Detached::empty();
        }
    };
    if depth >= MAX_DEPTH {
        warn!("dropping subtree nested deeper than {MAX_DEPTH} levels");
        return Detached::empty();
    }
    let mut subtree = Detached::leaf(color, value);
    subtree.attach(Side::Left, read_subtree_lenient(cursor, depth + 1));
    subtree.attach(Side::Right, read_subtree_lenient(cursor, depth + 1));
    subtree
}
