//! word2vec-api - Word Embedding Similarity Service
//!
//! Nearest-neighbour, analogy and pairwise similarity queries over a
//! pre-trained word2vec dictionary, loaded once and served read-only over
//! HTTP.

pub mod metrics;
pub mod protocol;
pub mod server;
pub mod vector;

pub use metrics::{Metrics, MetricsSnapshot};
pub use server::{Config, Server};
pub use vector::{
    EmbeddingStore, LoadError, QueryError, QuerySpec, ScoredPair, SimilarityEngine,
};
