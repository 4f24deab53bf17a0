//! Similarity Engine
//!
//! Stateless queries over an [`EmbeddingStore`]: pairwise similarity and
//! top-K nearest neighbours of a composed query vector.

use hashbrown::HashSet;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

use super::embedding_store::EmbeddingStore;
use super::error::{QueryError, QueryResult};
use super::similarity::{add_scaled, dot_product, normalize_vector};

/// A ranked result: vocabulary word and its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPair {
    pub word: String,
    pub score: f32,
}

/// Seed words and result count for a most-similar query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySpec {
    /// Words added to the query vector
    pub positives: Vec<String>,
    /// Words subtracted from the query vector
    pub negatives: Vec<String>,
    /// Maximum number of results
    pub top_k: usize,
}

impl QuerySpec {
    pub fn new(top_k: usize) -> Self {
        Self {
            top_k,
            ..Self::default()
        }
    }

    pub fn with_positive(mut self, word: impl Into<String>) -> Self {
        self.positives.push(word.into());
        self
    }

    pub fn with_negative(mut self, word: impl Into<String>) -> Self {
        self.negatives.push(word.into());
        self
    }

    pub fn with_positives<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.positives.extend(words.into_iter().map(Into::into));
        self
    }

    pub fn with_negatives<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.negatives.extend(words.into_iter().map(Into::into));
        self
    }
}

/// Query engine over a shared, immutable store.
///
/// Cloning is cheap; every clone reads the same store.
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    store: Arc<EmbeddingStore>,
}

impl SimilarityEngine {
    pub fn new(store: Arc<EmbeddingStore>) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &EmbeddingStore {
        &self.store
    }

    /// Cosine similarity between two vocabulary words.
    pub fn similarity(&self, x: &str, y: &str) -> QueryResult<f32> {
        let a = self.lookup(x)?;
        let b = self.lookup(y)?;
        Ok(dot_product(a, b).clamp(-1.0, 1.0))
    }

    /// Words nearest to `word` alone.
    pub fn distance(&self, word: &str, top_k: usize) -> QueryResult<Vec<ScoredPair>> {
        self.rank(&[word], &[], top_k)
    }

    /// Answers "`is` is to `to` as `what` is to ?" via `what + to - is`.
    pub fn analogy(
        &self,
        is: &str,
        to: &str,
        what: &str,
        top_k: usize,
    ) -> QueryResult<Vec<ScoredPair>> {
        self.rank(&[what, to], &[is], top_k)
    }

    /// Top-K words for a [`QuerySpec`].
    pub fn most_similar(&self, query: &QuerySpec) -> QueryResult<Vec<ScoredPair>> {
        let positives: Vec<&str> = query.positives.iter().map(String::as_str).collect();
        let negatives: Vec<&str> = query.negatives.iter().map(String::as_str).collect();
        self.rank(&positives, &negatives, query.top_k)
    }

    /// Top-K words closest to the sum of `positives` minus the sum of
    /// `negatives`.
    ///
    /// Seed words missing from the vocabulary are skipped; the query fails
    /// only when none of them resolve. Seed words never appear in the result.
    /// Ties keep vocabulary order.
    pub fn most_similar_words<P, N>(
        &self,
        positives: &[P],
        negatives: &[N],
        top_k: usize,
    ) -> QueryResult<Vec<ScoredPair>>
    where
        P: AsRef<str>,
        N: AsRef<str>,
    {
        let positives: Vec<&str> = positives.iter().map(AsRef::as_ref).collect();
        let negatives: Vec<&str> = negatives.iter().map(AsRef::as_ref).collect();
        self.rank(&positives, &negatives, top_k)
    }

    fn lookup(&self, word: &str) -> QueryResult<&[f32]> {
        self.store
            .get(word)
            .ok_or_else(|| QueryError::WordNotFound(word.to_string()))
    }

    fn rank(
        &self,
        positives: &[&str],
        negatives: &[&str],
        top_k: usize,
    ) -> QueryResult<Vec<ScoredPair>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let (query, excluded) = self.compose(positives, negatives)?;

        let mut scored: Vec<(usize, f32)> = self
            .store
            .entries()
            .enumerate()
            .filter(|(row, _)| !excluded.contains(row))
            .map(|(row, (_, vector))| (row, dot_product(&query, vector).clamp(-1.0, 1.0)))
            .collect();

        if scored.len() > top_k {
            scored.select_nth_unstable_by(top_k - 1, by_rank);
            scored.truncate(top_k);
        }
        scored.sort_unstable_by(by_rank);

        debug!(
            positives = ?positives,
            negatives = ?negatives,
            top_k,
            results = scored.len(),
            "Ranked query"
        );

        Ok(scored
            .into_iter()
            .filter_map(|(row, score)| {
                self.store.word_at(row).map(|word| ScoredPair {
                    word: word.to_string(),
                    score,
                })
            })
            .collect())
    }

    /// Sum the resolved seed vectors into a unit query vector and collect
    /// the rows to exclude from the ranking.
    fn compose(
        &self,
        positives: &[&str],
        negatives: &[&str],
    ) -> QueryResult<(Vec<f32>, HashSet<usize>)> {
        let mut query = vec![0f32; self.store.dimension()];
        let mut excluded = HashSet::new();

        let seeds = positives
            .iter()
            .map(|w| (*w, 1.0))
            .chain(negatives.iter().map(|w| (*w, -1.0)));
        for (word, sign) in seeds {
            if let (Some(row), Some(vector)) = (self.store.position(word), self.store.get(word)) {
                add_scaled(&mut query, vector, sign);
                excluded.insert(row);
            }
        }

        if excluded.is_empty() {
            return Err(QueryError::NoValidSeedWords);
        }

        normalize_vector(&mut query);
        Ok((query, excluded))
    }
}

/// Higher score first, then earlier vocabulary row.
fn by_rank(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}
