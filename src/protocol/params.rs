//! Path Parameter Decoding
//!
//! Word sets arrive as one `+`-delimited path segment and result counts as
//! decimal text. Decoding lives here so the engine only sees structured input.

use crate::vector::{QueryError, QueryResult};

/// Separator between words in a multi-word path segment
pub const WORD_SEPARATOR: char = '+';

/// Parse a result count. Anything other than a non-negative decimal
/// integer is rejected.
pub fn parse_count(raw: &str) -> QueryResult<usize> {
    raw.parse::<usize>()
        .map_err(|_| QueryError::InvalidArgument(format!("invalid count {:?}", raw)))
}

/// Split a delimited segment exactly as received, keeping empty pieces so
/// the request can be echoed back unchanged.
pub fn split_words(raw: &str) -> Vec<String> {
    raw.split(WORD_SEPARATOR).map(str::to_string).collect()
}

/// The non-empty words of a split segment, as handed to the engine.
pub fn seed_words(words: &[String]) -> Vec<&str> {
    words
        .iter()
        .map(String::as_str)
        .filter(|w| !w.is_empty())
        .collect()
}
