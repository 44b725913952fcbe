use std::io::{self, Read, Write};
use std::str::FromStr;

use thiserror::Error;

/// How an element writes itself into, and reads itself back from, the
/// binary snapshot format.
pub trait BinaryCodec: Sized {
    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()>;

    /// Truncated input must surface as `UnexpectedEof`, bytes that do not
    /// form a valid element as `InvalidData`.
    fn decode<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self>;
}

// fixed width, native byte order
macro_rules! int_codec {
    ($($int:ty),* $(,)?) => {$(
        impl BinaryCodec for $int {
            fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
                writer.write_all(&self.to_ne_bytes())
            }

            fn decode<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
                let mut bytes = [0; std::mem::size_of::<$int>()];
                reader.read_exact(&mut bytes)?;
                Ok(<$int>::from_ne_bytes(bytes))
            }
        }
    )*};
}

int_codec!(u8, u16, u32, u64, i8, i16, i32, i64);

impl BinaryCodec for bool {
    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        (*self as u8).encode(writer)
    }

    fn decode<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        match u8::decode(reader)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(io::Error::new(io::ErrorKind::InvalidData, format!("{other} is not a bool"))),
        }
    }
}

/// `u64` byte length, then the UTF-8 bytes.
impl BinaryCodec for String {
    fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        (self.len() as u64).encode(writer)?;
        writer.write_all(self.as_bytes())
    }

    fn decode<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let len = u64::decode(reader)?;
        // read through `take` so a bogus length cannot make us allocate it up front
        let mut bytes = Vec::new();
        Read::take(&mut *reader, len).read_to_end(&mut bytes)?;
        if (bytes.len() as u64) < len {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        String::from_utf8(bytes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at byte {position}")]
pub struct TextError {
    pub position: usize,
    pub message: String,
}

/// Token reader over the text snapshot format.
///
/// Tokens are separated by whitespace, which is otherwise ignored. A word
/// also ends at any of `(`, `)` and `,`, which are the format's own
/// punctuation.
pub struct TextCursor<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> TextCursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    pub fn error(&self, message: impl Into<String>) -> TextError {
        TextError { position: self.position, message: message.into() }
    }

    pub fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.position += rest.len() - rest.trim_start().len();
    }

    /// Whether only whitespace is left.
    pub fn is_at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.rest().is_empty()
    }

    pub fn peek_char(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.rest().chars().next()
    }

    pub fn next_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.position += c.len_utf8();
        Some(c)
    }

    pub fn expect_char(&mut self, expected: char) -> Result<(), TextError> {
        match self.next_char() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected `{expected}`, found `{c}`"))),
            None => Err(self.error(format!("expected `{expected}`, found end of input"))),
        }
    }

    pub fn word(&mut self) -> Result<&'a str, TextError> {
        self.take_until(|c| c.is_whitespace() || matches!(c, '(' | ')' | ','))
    }

    /// Like [`word`](Self::word), but only whitespace ends it, so the
    /// format's punctuation may appear inside.
    pub fn token(&mut self) -> Result<&'a str, TextError> {
        self.take_until(char::is_whitespace)
    }

    fn take_until(&mut self, stop: impl Fn(char) -> bool) -> Result<&'a str, TextError> {
        self.skip_whitespace();
        let rest = self.rest();
        let len = rest.find(stop).unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error("expected a word"));
        }
        self.position += len;
        Ok(&rest[..len])
    }

    pub fn parse<F: FromStr>(&mut self) -> Result<F, TextError> {
        let start = self.position;
        let word = self.word()?;
        word.parse().map_err(|_| TextError {
            position: start,
            message: format!("cannot parse `{word}` as {}", std::any::type_name::<F>()),
        })
    }
}

/// How an element reads itself back from the text snapshot format. Writing
/// goes through `Display`.
pub trait TextDecode: Sized {
    fn decode_text(cursor: &mut TextCursor<'_>) -> Result<Self, TextError>;

    /// Whether `rendered`, as produced by `Display`, reads back as exactly
    /// one element.
    fn reads_back(rendered: &str) -> bool {
        let mut cursor = TextCursor::new(rendered);
        Self::decode_text(&mut cursor).is_ok() && cursor.is_at_end()
    }
}

macro_rules! parsed_text {
    ($($ty:ty),* $(,)?) => {$(
        impl TextDecode for $ty {
            fn decode_text(cursor: &mut TextCursor<'_>) -> Result<Self, TextError> {
                cursor.parse()
            }
        }
    )*};
}

parsed_text!(u8, u16, u32, u64, i8, i16, i32, i64, bool);

impl TextDecode for String {
    fn decode_text(cursor: &mut TextCursor<'_>) -> Result<Self, TextError> {
        cursor.word().map(str::to_owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_codec() {
        let mut bytes = Vec::new();
        "héllo".to_owned().encode(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 8 + 6);
        assert_eq!(String::decode(&mut bytes.as_slice()).unwrap(), "héllo");
    }

    #[test]
    fn truncated_string() {
        let mut bytes = Vec::new();
        "abcdef".to_owned().encode(&mut bytes).unwrap();
        bytes.truncate(10);
        let err = String::decode(&mut bytes.as_slice()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn huge_length_does_not_allocate() {
        let bytes = u64::MAX.to_ne_bytes();
        let err = String::decode(&mut bytes.as_slice()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn invalid_utf8() {
        let mut bytes = 2u64.to_ne_bytes().to_vec();
        bytes.extend([0xff, 0xfe]);
        let err = String::decode(&mut bytes.as_slice()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn bad_bool_byte() {
        let err = bool::decode(&mut [7u8].as_slice()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn cursor_tokens() {
        let mut cursor = TextCursor::new("  (word 42, 1)N");
        assert_eq!(cursor.next_char(), Some('('));
        assert_eq!(cursor.word(), Ok("word"));
        assert_eq!(cursor.parse::<u64>(), Ok(42));
        assert_eq!(cursor.expect_char(','), Ok(()));
        assert_eq!(cursor.next_char(), Some('1'));
        assert_eq!(cursor.expect_char(')'), Ok(()));
        assert_eq!(cursor.peek_char(), Some('N'));
        assert!(!cursor.is_at_end());
        assert_eq!(cursor.next_char(), Some('N'));
        assert!(cursor.is_at_end());
        assert_eq!(cursor.next_char(), None);
    }

    #[test]
    fn token_keeps_punctuation() {
        let mut cursor = TextCursor::new(" a,(b) 7, 0)");
        assert_eq!(cursor.token(), Ok("a,(b)"));
        assert_eq!(cursor.parse::<u8>(), Ok(7));
        assert_eq!(cursor.next_char(), Some(','));
    }

    #[test]
    fn strings_with_separators_do_not_read_back() {
        assert!(String::reads_back("plain"));
        assert!(!String::reads_back("two words"));
        assert!(!String::reads_back("a,b"));
        assert!(!String::reads_back(""));
        assert!(u32::reads_back("17"));
    }

    #[test]
    fn cursor_errors_carry_position() {
        let mut cursor = TextCursor::new("abc, x");
        assert_eq!(cursor.parse::<u32>().unwrap_err().position, 0);
        let mut cursor = TextCursor::new("abc");
        cursor.word().unwrap();
        let err = cursor.expect_char(')').unwrap_err();
        assert_eq!(err.position, 3);
        assert!(err.to_string().contains("end of input"));
    }
}
