//! Response Bodies
//!
//! Every endpoint echoes its request parameters next to the result. Failed
//! or malformed requests are answered with the same shape and an empty
//! result.

use serde::Serialize;

use crate::vector::ScoredPair;

/// `GET /distance/{word}/{count}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceResponse {
    pub specified_word: String,
    pub words: Vec<ScoredPair>,
}

impl DistanceResponse {
    pub fn empty(specified_word: String) -> Self {
        Self {
            specified_word,
            words: Vec::new(),
        }
    }
}

/// `GET /analogy/{is}/{to}/{what}/{count}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalogyResponse {
    pub is: String,
    pub to: String,
    pub what: String,
    pub words: Vec<ScoredPair>,
}

impl AnalogyResponse {
    pub fn empty(is: String, to: String, what: String) -> Self {
        Self {
            is,
            to,
            what,
            words: Vec::new(),
        }
    }
}

/// `GET /mostSimilarity/{positives}/{negatives}/{count}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MostSimilarityResponse {
    pub positive_words: Vec<String>,
    pub negative_words: Vec<String>,
    pub words: Vec<ScoredPair>,
}

impl MostSimilarityResponse {
    pub fn empty(positive_words: Vec<String>, negative_words: Vec<String>) -> Self {
        Self {
            positive_words,
            negative_words,
            words: Vec::new(),
        }
    }
}

/// `GET /similarity/{x}/{y}`
///
/// The score field is serialized as `similary` to stay compatible with
/// existing clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResponse {
    pub specified_words: [String; 2],
    #[serde(rename = "similary")]
    pub similarity: f32,
}

impl SimilarityResponse {
    pub fn empty(x: String, y: String) -> Self {
        Self {
            specified_words: [x, y],
            similarity: 0.0,
        }
    }
}

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub vocabulary_size: usize,
    pub dimension: usize,
    pub uptime_secs: u64,
    pub started_at: String,
    pub version: &'static str,
}
