//! HTTP Wire Format
//!
//! JSON response bodies and decoding of URL path parameters.

mod params;
mod response;

pub use params::{parse_count, seed_words, split_words, WORD_SEPARATOR};
pub use response::{
    AnalogyResponse, DistanceResponse, HealthResponse, MostSimilarityResponse,
    SimilarityResponse,
};
