//! Embedding Store
//!
//! Immutable vocabulary -> unit-length vector table, built once at startup.
//! Vectors live in one contiguous row-major buffer; the word index maps a
//! word to its row.

use hashbrown::HashMap;
use std::path::Path;

use super::error::{LoadError, LoadResult};
use super::loader;
use super::similarity::normalize_vector;

/// Read-only embedding table.
///
/// Every vector is normalized to unit L2 length on insertion, so cosine
/// similarity between two stored vectors is their dot product. The store is
/// never mutated after construction and can be shared freely across threads
/// behind an `Arc`.
#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    /// Words in load order
    words: Vec<String>,
    /// Word -> row
    index: HashMap<String, usize>,
    /// `words.len() * dimension` components
    data: Vec<f32>,
    dimension: usize,
}

impl EmbeddingStore {
    /// Load a word2vec binary dictionary from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> LoadResult<Self> {
        loader::load_file(path.as_ref())
    }

    /// Build a store from in-memory `(word, vector)` pairs.
    ///
    /// Applies the same validation as [`EmbeddingStore::load`]: every vector
    /// must have `dimension` components and words must be unique.
    pub fn from_entries<I, W, V>(dimension: usize, entries: I) -> LoadResult<Self>
    where
        I: IntoIterator<Item = (W, V)>,
        W: Into<String>,
        V: AsRef<[f32]>,
    {
        let entries = entries.into_iter();
        let mut builder = StoreBuilder::new(dimension, entries.size_hint().0)?;
        for (word, vector) in entries {
            builder.push(word.into(), vector.as_ref())?;
        }
        Ok(builder.build())
    }

    /// Vector dimension shared by every entry
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of vocabulary entries
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Exact, case-sensitive lookup of a word's unit vector.
    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.index.get(word).map(|&row| self.row(row))
    }

    /// Row number of a word in load order
    pub fn position(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    /// Check if a word is in the vocabulary
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Word stored at a row
    pub fn word_at(&self, row: usize) -> Option<&str> {
        self.words.get(row).map(String::as_str)
    }

    /// All entries in load order. Each call starts a fresh pass.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = (&str, &[f32])> + '_ {
        self.words
            .iter()
            .map(String::as_str)
            .zip(self.data.chunks_exact(self.dimension))
    }

    #[inline]
    fn row(&self, row: usize) -> &[f32] {
        let start = row * self.dimension;
        &self.data[start..start + self.dimension]
    }
}

/// Incremental construction used by the dictionary loader and
/// [`EmbeddingStore::from_entries`].
pub(crate) struct StoreBuilder {
    words: Vec<String>,
    index: HashMap<String, usize>,
    data: Vec<f32>,
    dimension: usize,
}

/// Upper bound on components reserved up front from an untrusted size hint.
const MAX_PREALLOCATED_COMPONENTS: usize = 1 << 26;

impl StoreBuilder {
    pub(crate) fn new(dimension: usize, capacity: usize) -> LoadResult<Self> {
        if dimension == 0 {
            return Err(LoadError::InvalidHeader(
                "dimension must be positive".to_string(),
            ));
        }
        let rows = capacity.min(MAX_PREALLOCATED_COMPONENTS / dimension);
        Ok(Self {
            words: Vec::with_capacity(rows),
            index: HashMap::with_capacity(rows),
            data: Vec::with_capacity(rows * dimension),
            dimension,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.words.len()
    }

    /// Append an entry, normalizing its vector to unit length.
    pub(crate) fn push(&mut self, word: String, vector: &[f32]) -> LoadResult<()> {
        if vector.len() != self.dimension {
            return Err(LoadError::DimensionMismatch {
                word,
                expected: self.dimension,
                got: vector.len(),
            });
        }
        if !vector.iter().all(|x| x.is_finite()) {
            return Err(LoadError::InvalidVector { word });
        }
        if self.index.contains_key(word.as_str()) {
            return Err(LoadError::DuplicateWord(word));
        }

        let start = self.data.len();
        self.data.extend_from_slice(vector);
        normalize_vector(&mut self.data[start..]);

        self.index.insert(word.clone(), self.words.len());
        self.words.push(word);
        Ok(())
    }

    pub(crate) fn build(mut self) -> EmbeddingStore {
        self.data.shrink_to_fit();
        EmbeddingStore {
            words: self.words,
            index: self.index,
            data: self.data,
            dimension: self.dimension,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> EmbeddingStore {
        let entries: Vec<(&str, Vec<f32>)> = vec![
            ("king", vec![1.0, 0.0]),
            ("queen", vec![0.9, 0.1]),
            ("man", vec![0.0, 1.0]),
            ("woman", vec![0.0, 0.9]),
        ];
        EmbeddingStore::from_entries(2, entries).unwrap()
    }

    #[test]
    fn test_lookup_and_len() {
        let store = sample_store();
        assert_eq!(store.len(), 4);
        assert_eq!(store.dimension(), 2);
        assert!(store.contains("queen"));
        assert_eq!(store.get("king").unwrap(), &[1.0, 0.0]);
        assert!(store.get("prince").is_none());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let store = sample_store();
        assert!(store.get("King").is_none());
    }

    #[test]
    fn test_vectors_are_unit_length() {
        let store = sample_store();
        for (_, v) in store.entries() {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-6);
        }
        // woman [0, 0.9] becomes [0, 1]
        assert_eq!(store.get("woman").unwrap(), &[0.0, 1.0]);
    }

    #[test]
    fn test_entries_keep_load_order_and_restart() {
        let store = sample_store();
        let first: Vec<&str> = store.entries().map(|(w, _)| w).collect();
        assert_eq!(first, vec!["king", "queen", "man", "woman"]);
        assert_eq!(store.entries().len(), 4);
        let second: Vec<&str> = store.entries().map(|(w, _)| w).collect();
        assert_eq!(first, second);
        assert_eq!(store.position("man"), Some(2));
        assert_eq!(store.word_at(1), Some("queen"));
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = EmbeddingStore::from_entries(3, vec![("a", vec![1.0f32, 0.0])]);
        assert!(matches!(
            result,
            Err(LoadError::DimensionMismatch {
                expected: 3,
                got: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_word() {
        let result =
            EmbeddingStore::from_entries(1, vec![("a", vec![1.0f32]), ("a", vec![2.0f32])]);
        assert!(matches!(result, Err(LoadError::DuplicateWord(w)) if w == "a"));
    }

    #[test]
    fn test_non_finite_components_rejected() {
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let result = EmbeddingStore::from_entries(
                2,
                vec![("a", vec![1.0f32, 0.0]), ("bad", vec![bad, 1.0])],
            );
            assert!(matches!(result, Err(LoadError::InvalidVector { word }) if word == "bad"));
        }
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let result = EmbeddingStore::from_entries(0, Vec::<(&str, Vec<f32>)>::new());
        assert!(matches!(result, Err(LoadError::InvalidHeader(_))));
    }
}
