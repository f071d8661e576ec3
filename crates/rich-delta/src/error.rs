//! Error types shared by every delta operation.

use thiserror::Error;

/// Reasons an operation or a decoded wire value is not well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("ZERO_LENGTH")]
    ZeroLength,
    #[error("EMPTY_INSERT")]
    EmptyInsert,
    #[error("TOMBSTONE_ON_INSERT: {0}")]
    TombstoneOnInsert(String),
    #[error("NOT_A_DOCUMENT")]
    NotADocument,
    #[error("INVALID_RANGE: {start}..{end}")]
    InvalidRange { start: usize, end: usize },
    #[error("MALFORMED: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeltaError {
    #[error("VALIDATION: {0}")]
    Validation(#[from] ValidationError),
    /// A split point landed inside an embed, which is always length 1.
    #[error("EMBED_SPLIT: offset {offset}")]
    EmbedSplit { offset: usize },
    /// The edit consumes more content than the document it targets provides.
    /// Local and remote state have diverged; the caller must resync.
    #[error("LENGTH_MISMATCH: expected at most {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

impl DeltaError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        DeltaError::Validation(ValidationError::Malformed(msg.into()))
    }
}

pub type DeltaResult<T> = Result<T, DeltaError>;
