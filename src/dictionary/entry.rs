use std::fmt;
use std::io::{self, Read, Write};

use crate::non_concurrent::rbtree::{
    BinaryCodec, Equivalence, RBTree, StrictOrder, TextCursor, TextDecode, TextError,
};

/// A word and the number stored under it. Only the key takes part in
/// ordering and lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValuePair {
    pub key: String,
    pub value: u64,
}

impl KeyValuePair {
    /// Builds an entry, lower-casing the key.
    pub fn new(key: &str, value: u64) -> Self {
        Self { key: lower(key), value }
    }

    /// An entry that is only good for finding or removing `key`.
    pub fn probe(key: &str) -> Self {
        Self::new(key, 0)
    }
}

/// Keys are case-insensitive for ASCII letters; everything else is kept as is.
pub fn lower(key: &str) -> String {
    key.to_ascii_lowercase()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct KeyEq;

impl Equivalence<KeyValuePair> for KeyEq {
    fn equivalent(&self, a: &KeyValuePair, b: &KeyValuePair) -> bool {
        a.key == b.key
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct KeyLess;

impl StrictOrder<KeyValuePair> for KeyLess {
    fn less(&self, a: &KeyValuePair, b: &KeyValuePair) -> bool {
        a.key < b.key
    }
}

pub type Dictionary = RBTree<KeyValuePair, KeyEq, KeyLess>;

impl fmt::Display for KeyValuePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.value)
    }
}

impl TextDecode for KeyValuePair {
    fn decode_text(cursor: &mut TextCursor<'_>) -> Result<Self, TextError> {
        // keys never hold whitespace, but may hold `(`, `)` and `,`
        let key = cursor.token()?.to_owned();
        let value = cursor.parse()?;
        Ok(Self { key, value })
    }
}

/// `u64` key length, key bytes, `u64` value.
impl BinaryCodec for KeyValuePair {
    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        self.key.encode(writer)?;
        self.value.encode(writer)
    }

    fn decode<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let key = String::decode(reader)?;
        let value = u64::decode(reader)?;
        Ok(Self { key, value })
    }
}
