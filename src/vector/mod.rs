//! Vector Module
//!
//! Embedding storage, dictionary loading and similarity queries.

mod embedding_store;
mod engine;
mod error;
mod loader;
mod similarity;

pub use embedding_store::EmbeddingStore;
pub use engine::{QuerySpec, ScoredPair, SimilarityEngine};
pub use error::{LoadError, LoadResult, QueryError, QueryResult};
pub use loader::read_dictionary;
pub use similarity::{dot_product, magnitude, normalize_vector};
