//! Error Types
//!
//! Load-time failures are fatal; query-time failures are expected and
//! recoverable by the caller.

use std::io;
use thiserror::Error;

/// Failure to build an [`EmbeddingStore`](super::EmbeddingStore) from a dictionary.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid dictionary header: {0}")]
    InvalidHeader(String),

    #[error("Dictionary truncated: expected {expected} entries, read {read}")]
    Truncated { expected: usize, read: usize },

    #[error("Invalid word at entry {index}: {reason}")]
    InvalidWord { index: usize, reason: String },

    #[error("Non-finite component in vector for {word:?}")]
    InvalidVector { word: String },

    #[error("Duplicate word: {0}")]
    DuplicateWord(String),

    #[error("Dimension mismatch for {word:?}: expected {expected}, got {got}")]
    DimensionMismatch {
        word: String,
        expected: usize,
        got: usize,
    },

    #[error("Unexpected data after {0} entries")]
    TrailingData(usize),
}

/// Failure of a single similarity query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Word not found: {0}")]
    WordNotFound(String),

    #[error("None of the seed words are in the vocabulary")]
    NoValidSeedWords,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type LoadResult<T> = Result<T, LoadError>;
pub type QueryResult<T> = Result<T, QueryError>;
