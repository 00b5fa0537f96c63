//! Sieve command-line entrypoint.
//!
//! ```text
//! sieve build <corpus.json>   encode a corpus and persist the index
//! sieve query <text...>       retrieve and rerank against the persisted index
//! sieve stats                 describe the persisted index
//! ```

mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use mimalloc::MiMalloc;

use sieve::config::Config;
use sieve::document::load_corpus;
use sieve::embedding::{
    Embedder, HttpEmbedder, HttpEmbedderConfig, SentenceConfig, SentenceEmbedder,
};
use sieve::index::EmbeddingIndex;
use sieve::rerank::Reranker;
use sieve::retrieval::RetrievalEngine;
use sieve::scoring::{
    CrossEncoder, CrossEncoderConfig, CrossScorer, HttpCrossScorer, HttpScorerConfig,
};

use cli::{Args, Commands};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut config = Config::from_env()?;
    args.apply(&mut config);
    config.validate()?;

    match &args.command {
        Commands::Build { corpus } => run_build(&config, corpus).await,
        Commands::Query { text, .. } => run_query(&config, &text.join(" ")).await,
        Commands::Stats => run_stats(&config).await,
    }
}

async fn run_build(config: &Config, corpus_path: &Path) -> anyhow::Result<()> {
    let corpus = load_corpus(corpus_path)
        .with_context(|| format!("failed to read corpus {}", corpus_path.display()))?;
    let embedder = build_embedder(config)?;

    tracing::info!(
        corpus = %corpus_path.display(),
        documents = corpus.len(),
        field = %config.encode_field,
        metric = %config.metric,
        embedder = embedder.name(),
        "Building index"
    );

    let index = EmbeddingIndex::new(config.index_config());
    index.build(&corpus, embedder.as_ref()).await?;
    let paths = index.persist(&config.index_path)?;

    println!(
        "indexed {} documents ({} dims) into {}",
        index.len(),
        index.dimension().unwrap_or_default(),
        paths.native.display()
    );
    Ok(())
}

async fn run_query(config: &Config, query: &str) -> anyhow::Result<()> {
    let index = Arc::new(EmbeddingIndex::new(config.index_config()));
    index
        .load(&config.index_path)
        .await
        .with_context(|| format!("failed to load index from {}", config.index_path.display()))?;

    let engine = RetrievalEngine::new(index, build_embedder(config)?);
    let candidates = engine.retrieve(query, config.top_k).await?;

    let reranker = Reranker::with_config(build_scorer(config)?, config.reranker_config())?;
    let ranked = reranker
        .rerank_scored(query, &candidates, config.rerank_top_k)
        .await?;

    for (rank, candidate) in ranked.iter().enumerate() {
        println!(
            "{:>2}. {:.4}  {}  {}",
            rank + 1,
            candidate.score,
            candidate.document.id,
            candidate.document.title
        );
    }
    Ok(())
}

async fn run_stats(config: &Config) -> anyhow::Result<()> {
    let index = EmbeddingIndex::new(config.index_config());
    index
        .load(&config.index_path)
        .await
        .with_context(|| format!("failed to load index from {}", config.index_path.display()))?;

    let stats = index.stats();
    println!("state:      {}", stats.state);
    println!("documents:  {}", stats.documents);
    println!("dimension:  {}", stats.dimension.unwrap_or_default());
    println!("metric:     {}", stats.metric);
    Ok(())
}

fn build_embedder(config: &Config) -> anyhow::Result<Arc<dyn Embedder>> {
    if let Some(url) = &config.embedder_url {
        let http_config = HttpEmbedderConfig::new(url.clone()).with_batch_size(config.batch_size);
        return Ok(Arc::new(HttpEmbedder::new(http_config)?));
    }

    let sentence_config = match &config.model_path {
        Some(path) => SentenceConfig::new(path.clone()),
        None => {
            tracing::warn!("No SIEVE_MODEL_PATH configured, running embedder in stub mode");
            SentenceConfig::stub()
        }
    };
    Ok(Arc::new(SentenceEmbedder::load(sentence_config)?))
}

fn build_scorer(config: &Config) -> anyhow::Result<Arc<dyn CrossScorer>> {
    if let Some(url) = &config.reranker_url {
        return Ok(Arc::new(HttpCrossScorer::new(HttpScorerConfig::new(url.clone()))?));
    }

    let encoder_config = match &config.reranker_path {
        Some(path) => CrossEncoderConfig::new(path.clone()),
        None => {
            tracing::warn!("No SIEVE_RERANKER_PATH configured, reranking with lexical stub");
            CrossEncoderConfig::stub()
        }
    };
    Ok(Arc::new(CrossEncoder::load(encoder_config)?))
}
