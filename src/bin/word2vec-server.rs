//! word2vec Server Binary
//!
//! Loads the dictionary once, then serves similarity queries over HTTP.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use word2vec_api::{Config, EmbeddingStore, Server};

/// word2vec Server - Word Similarity and Analogy Queries
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// word2vec binary dictionary
    #[arg(short, long, default_value = "wikipedia.bin")]
    dictionary: PathBuf,

    /// Bind address
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// Port number
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Maximum concurrent vocabulary scans (0 = number of CPU cores)
    #[arg(long, default_value_t = 0)]
    max_concurrent_queries: usize,

    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("word2vec_api=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let config = Config::default()
        .with_bind(&args.bind)
        .with_port(args.port)
        .with_dictionary(&args.dictionary)
        .with_max_concurrent_queries(args.max_concurrent_queries)
        .with_cors(!args.no_cors);

    info!("Loading dictionary {}", config.dictionary.display());

    // A partially loaded store must never serve traffic
    let path = config.dictionary.clone();
    let store = match tokio::task::spawn_blocking(move || EmbeddingStore::load(path)).await? {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to load dictionary {}: {}", config.dictionary.display(), e);
            return Err(e.into());
        }
    };

    info!(
        "Starting word2vec server on {} with {} concurrent queries",
        config.addr(),
        config.max_concurrent_queries
    );

    let server = Server::new(config, Arc::new(store));
    server.run().await?;

    Ok(())
}
