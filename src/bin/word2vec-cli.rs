//! word2vec CLI
//!
//! Runs similarity queries directly against a dictionary file, without a
//! server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use word2vec_api::{EmbeddingStore, QuerySpec, ScoredPair, SimilarityEngine};

/// word2vec CLI - Offline Similarity Queries
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// word2vec binary dictionary
    #[arg(short, long, default_value = "wikipedia.bin")]
    dictionary: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Words closest to a single word
    Distance {
        word: String,
        /// Number of results
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },

    /// IS is to TO as WHAT is to ?
    Analogy {
        is: String,
        to: String,
        what: String,
        /// Number of results
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },

    /// Words closest to the sum of positives minus the sum of negatives
    MostSimilar {
        /// Comma-separated words to add
        #[arg(short, long, value_delimiter = ',')]
        positive: Vec<String>,
        /// Comma-separated words to subtract
        #[arg(short = 'm', long, value_delimiter = ',')]
        negative: Vec<String>,
        /// Number of results
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },

    /// Cosine similarity between two words
    Similarity { x: String, y: String },

    /// Vocabulary size and dimension
    Info,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let start = Instant::now();
    let store = EmbeddingStore::load(&args.dictionary)?;
    eprintln!(
        "Loaded {} words (dimension {}) in {:.2?}",
        store.len(),
        store.dimension(),
        start.elapsed()
    );

    let engine = SimilarityEngine::new(Arc::new(store));

    match args.command {
        Command::Distance { word, count } => {
            print_pairs(&engine.distance(&word, count)?);
        }
        Command::Analogy {
            is,
            to,
            what,
            count,
        } => {
            print_pairs(&engine.analogy(&is, &to, &what, count)?);
        }
        Command::MostSimilar {
            positive,
            negative,
            count,
        } => {
            let query = QuerySpec::new(count)
                .with_positives(positive)
                .with_negatives(negative);
            print_pairs(&engine.most_similar(&query)?);
        }
        Command::Similarity { x, y } => {
            println!("{:.6}", engine.similarity(&x, &y)?);
        }
        Command::Info => {
            println!("words:     {}", engine.store().len());
            println!("dimension: {}", engine.store().dimension());
        }
    }

    Ok(())
}

fn print_pairs(pairs: &[ScoredPair]) {
    if pairs.is_empty() {
        println!("(no results)");
        return;
    }
    let width = pairs.iter().map(|p| p.word.chars().count()).max().unwrap_or(0);
    for (rank, pair) in pairs.iter().enumerate() {
        println!("{:>3}. {:<width$}  {:.6}", rank + 1, pair.word, pair.score, width = width);
    }
}
