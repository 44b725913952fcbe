use std::io;

use thiserror::Error;

/// Everything a tree operation can report back to its caller.
///
/// None of these leave the tree in a modified state.
#[derive(Debug, Error)]
pub enum RBTreeError {
    #[error("no such element in tree")]
    NotFound,

    #[error("tree already has an element equal to the given one")]
    DuplicateKey,

    #[error("cannot remove from an empty tree")]
    EmptyTree,

    #[error("corrupt tree stream: {reason}")]
    CorruptStream { reason: String },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl RBTreeError {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptStream { reason: reason.into() }
    }

    /// Truncation and undecodable bytes are stream corruption; anything else
    /// is the reader's own failure.
    pub(crate) fn from_read(err: io::Error, what: &str) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Self::corrupt(format!("truncated while reading {what}")),
            io::ErrorKind::InvalidData => Self::corrupt(format!("invalid {what}: {err}")),
            _ => Self::Io(err),
        }
    }
}

/// The first red-black or structural rule that a tree was found to break.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("root is red")]
    RedRoot,

    #[error("root has a parent link")]
    RootHasParent,

    #[error("red node #{id} has a red child")]
    RedRedEdge { id: usize },

    #[error("black-height differs below node #{id}: {left} on the left, {right} on the right")]
    BlackHeightMismatch { id: usize, left: usize, right: usize },

    #[error("node #{id} is out of order")]
    OutOfOrder { id: usize },

    #[error("node #{id} has a stale parent link")]
    BrokenParentLink { id: usize },

    #[error("tree counts {stored} elements but holds {actual}")]
    SizeMismatch { stored: usize, actual: usize },
}
