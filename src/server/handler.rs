//! Request Handlers
//!
//! Decodes path parameters, runs queries on the blocking pool and answers
//! every request with `200 OK`. Malformed input and engine failures become
//! empty results.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, error};

use crate::metrics::{Metrics, MetricsSnapshot};
use crate::protocol::{
    parse_count, seed_words, split_words, AnalogyResponse, DistanceResponse, HealthResponse,
    MostSimilarityResponse, SimilarityResponse,
};
use crate::vector::{QueryResult, SimilarityEngine};

/// State shared by all handlers
pub struct AppState {
    engine: SimilarityEngine,
    metrics: Arc<Metrics>,
    /// Bounds concurrent vocabulary scans
    permits: Arc<Semaphore>,
    started: Instant,
    started_at: DateTime<Utc>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        engine: SimilarityEngine,
        metrics: Arc<Metrics>,
        max_concurrent_queries: usize,
    ) -> Self {
        Self {
            engine,
            metrics,
            permits: Arc::new(Semaphore::new(max_concurrent_queries.max(1))),
            started: Instant::now(),
            started_at: Utc::now(),
        }
    }

    pub fn engine(&self) -> &SimilarityEngine {
        &self.engine
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Run a query off the async runtime. `None` means the caller should
    /// answer with an empty result.
    async fn dispatch<T, F>(&self, endpoint: &'static str, query: F) -> Option<T>
    where
        F: FnOnce(&SimilarityEngine) -> QueryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let start = Instant::now();

        let outcome = match self.permits.clone().acquire_owned().await {
            Ok(permit) => {
                let engine = self.engine.clone();
                let task = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    query(&engine)
                });
                match task.await {
                    Ok(Ok(value)) => Some(value),
                    Ok(Err(e)) => {
                        debug!(endpoint, error = %e, "Query failed");
                        None
                    }
                    Err(e) => {
                        error!(endpoint, error = %e, "Query task failed");
                        None
                    }
                }
            }
            Err(e) => {
                error!(endpoint, error = %e, "Query limiter closed");
                None
            }
        };

        let elapsed = start.elapsed();
        self.metrics
            .record_request(endpoint, elapsed, outcome.is_none());
        debug!(endpoint, latency = ?elapsed, "Request served");
        outcome
    }

    /// Record a request rejected before reaching the engine.
    fn reject(&self, endpoint: &'static str, reason: impl Display) {
        debug!(endpoint, reason = %reason, "Malformed request");
        self.metrics.record_request(endpoint, Duration::ZERO, true);
    }
}

/// `GET /distance/{word}/{count}`
pub async fn distance(
    State(state): State<SharedState>,
    params: Result<Path<(String, String)>, PathRejection>,
) -> Json<DistanceResponse> {
    const ENDPOINT: &str = "distance";

    let Path((word, count)) = match params {
        Ok(p) => p,
        Err(e) => {
            state.reject(ENDPOINT, e);
            return Json(DistanceResponse::empty(String::new()));
        }
    };
    let top_k = match parse_count(&count) {
        Ok(k) => k,
        Err(e) => {
            state.reject(ENDPOINT, e);
            return Json(DistanceResponse::empty(word));
        }
    };

    let seed = word.clone();
    let words = state
        .dispatch(ENDPOINT, move |engine| engine.distance(&seed, top_k))
        .await
        .unwrap_or_default();

    Json(DistanceResponse {
        specified_word: word,
        words,
    })
}

/// `GET /analogy/{is}/{to}/{what}/{count}`
pub async fn analogy(
    State(state): State<SharedState>,
    params: Result<Path<(String, String, String, String)>, PathRejection>,
) -> Json<AnalogyResponse> {
    const ENDPOINT: &str = "analogy";

    let Path((is, to, what, count)) = match params {
        Ok(p) => p,
        Err(e) => {
            state.reject(ENDPOINT, e);
            return Json(AnalogyResponse::empty(
                String::new(),
                String::new(),
                String::new(),
            ));
        }
    };
    let top_k = match parse_count(&count) {
        Ok(k) => k,
        Err(e) => {
            state.reject(ENDPOINT, e);
            return Json(AnalogyResponse::empty(is, to, what));
        }
    };

    let (a, b, c) = (is.clone(), to.clone(), what.clone());
    let words = state
        .dispatch(ENDPOINT, move |engine| engine.analogy(&a, &b, &c, top_k))
        .await
        .unwrap_or_default();

    Json(AnalogyResponse {
        is,
        to,
        what,
        words,
    })
}

/// `GET /mostSimilarity/{positives}/{negatives}/{count}`
pub async fn most_similarity(
    State(state): State<SharedState>,
    params: Result<Path<(String, String, String)>, PathRejection>,
) -> Json<MostSimilarityResponse> {
    const ENDPOINT: &str = "most_similarity";

    let Path((positives, negatives, count)) = match params {
        Ok(p) => p,
        Err(e) => {
            state.reject(ENDPOINT, e);
            return Json(MostSimilarityResponse::empty(Vec::new(), Vec::new()));
        }
    };
    let positive_words = split_words(&positives);
    let negative_words = split_words(&negatives);

    let top_k = match parse_count(&count) {
        Ok(k) => k,
        Err(e) => {
            state.reject(ENDPOINT, e);
            return Json(MostSimilarityResponse::empty(positive_words, negative_words));
        }
    };

    let (pos, neg) = (positive_words.clone(), negative_words.clone());
    let words = state
        .dispatch(ENDPOINT, move |engine| {
            let positives = seed_words(&pos);
            let negatives = seed_words(&neg);
            engine.most_similar_words(positives.as_slice(), negatives.as_slice(), top_k)
        })
        .await
        .unwrap_or_default();

    Json(MostSimilarityResponse {
        positive_words,
        negative_words,
        words,
    })
}

/// `GET /similarity/{x}/{y}`
pub async fn similarity(
    State(state): State<SharedState>,
    params: Result<Path<(String, String)>, PathRejection>,
) -> Json<SimilarityResponse> {
    const ENDPOINT: &str = "similarity";

    let Path((x, y)) = match params {
        Ok(p) => p,
        Err(e) => {
            state.reject(ENDPOINT, e);
            return Json(SimilarityResponse::empty(String::new(), String::new()));
        }
    };

    let (a, b) = (x.clone(), y.clone());
    let similarity = state
        .dispatch(ENDPOINT, move |engine| engine.similarity(&a, &b))
        .await
        .unwrap_or(0.0);

    Json(SimilarityResponse {
        specified_words: [x, y],
        similarity,
    })
}

/// `GET /health`
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let store = state.engine.store();
    Json(HealthResponse {
        status: "ok",
        vocabulary_size: store.len(),
        dimension: store.dimension(),
        uptime_secs: state.started.elapsed().as_secs(),
        started_at: state.started_at.to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /stats`
pub async fn stats(State(state): State<SharedState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
