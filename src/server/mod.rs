//! Server Module
//!
//! HTTP front end for the similarity engine.

mod config;
mod handler;

pub use config::Config;
pub use handler::{AppState, SharedState};

use axum::http::Method;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::metrics::Metrics;
use crate::vector::{EmbeddingStore, SimilarityEngine};

/// Build the route table over shared state.
pub fn router(state: SharedState, cors: bool) -> Router {
    let router = Router::new()
        .route("/distance/{word}/{count}", get(handler::distance))
        .route("/analogy/{is}/{to}/{what}/{count}", get(handler::analogy))
        .route(
            "/mostSimilarity/{positives}/{negatives}/{count}",
            get(handler::most_similarity),
        )
        .route("/similarity/{x}/{y}", get(handler::similarity))
        .route("/health", get(handler::health))
        .route("/stats", get(handler::stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET]),
        )
    } else {
        router
    }
}

/// word2vec query server
pub struct Server {
    config: Config,
    state: SharedState,
}

impl Server {
    /// Create a server over an already loaded store
    pub fn new(config: Config, store: Arc<EmbeddingStore>) -> Self {
        let state = AppState::new(
            SimilarityEngine::new(store),
            Arc::new(Metrics::new()),
            config.max_concurrent_queries,
        );
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// Route table for this server
    pub fn router(&self) -> Router {
        router(self.state.clone(), self.config.cors)
    }

    /// Run the server until Ctrl-C
    pub async fn run(self) -> std::io::Result<()> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr).await?;

        info!(
            "word2vec server listening on {} ({} words, dimension {})",
            addr,
            self.state.engine().store().len(),
            self.state.engine().store().dimension()
        );

        let metrics = self.state.metrics().clone();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped. {}", metrics.summary());
        Ok(())
    }

    /// Get the query engine
    pub fn engine(&self) -> &SimilarityEngine {
        self.state.engine()
    }

    /// Get metrics reference
    pub fn metrics(&self) -> &Arc<Metrics> {
        self.state.metrics()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
