//! Command-line argument parsing for the `sieve` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use sieve::config::Config;

/// Sieve - exact embedding retrieval with cross-encoder reranking
#[derive(Parser, Debug)]
#[command(name = "sieve")]
#[command(version)]
#[command(about = "Build, query and inspect a persisted retrieval index", long_about = None)]
pub struct Args {
    /// Index directory (overrides SIEVE_INDEX_PATH)
    #[arg(long, global = true, value_name = "DIR")]
    pub index_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Encode a JSON corpus and persist the index
    Build {
        /// JSON array of documents
        #[arg(value_name = "CORPUS")]
        corpus: PathBuf,
    },

    /// Retrieve and rerank against the persisted index
    Query {
        /// Query text; multiple words are joined with spaces
        #[arg(value_name = "TEXT", required = true, num_args = 1..)]
        text: Vec<String>,

        /// Candidates fetched from the index (overrides SIEVE_TOP_K)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Documents kept after reranking (overrides SIEVE_RERANK_TOP_K)
        #[arg(short = 'n', long)]
        rerank_top_k: Option<usize>,
    },

    /// Describe the persisted index
    Stats,
}

impl Args {
    /// Applies command-line overrides on top of the environment config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.index_path {
            config.index_path = path.clone();
        }
        if let Commands::Query {
            top_k,
            rerank_top_k,
            ..
        } = &self.command
        {
            if let Some(k) = top_k {
                config.top_k = *k;
            }
            if let Some(k) = rerank_top_k {
                config.rerank_top_k = *k;
            }
        }
    }
}
