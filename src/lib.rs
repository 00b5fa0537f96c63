//! Sieve library crate (used by the `sieve` binary and integration tests).
//!
//! A two-stage retrieval pipeline: an exact [`EmbeddingIndex`] over a
//! document corpus narrows a query to candidates, then a [`Reranker`] reorders
//! them with a cross-scoring model.
//!
//! ## Core Types
//! - [`Document`], [`EncodeField`] - Corpus records and the field an index encodes
//! - [`EmbeddingIndex`], [`IndexConfig`], [`Metric`] - Build, search, persist and load
//! - [`RetrievalEngine`], [`SearchResult`] - Query encoding plus first-stage search
//! - [`Reranker`], [`RerankerConfig`] - Second-stage reordering
//!
//! ## Capabilities
//! - [`Embedder`]: [`SentenceEmbedder`] (local BERT or stub), [`HttpEmbedder`]
//! - [`CrossScorer`]: [`CrossEncoder`] (local BERT or stub), [`HttpCrossScorer`]
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod document;
pub mod embedding;
pub mod hashing;
pub mod index;
pub mod rerank;
pub mod retrieval;
pub mod scoring;
pub mod storage;

pub use config::{Config, ConfigError};
pub use document::{Document, DocumentError, DocumentMetadata, EncodeField, load_corpus};
pub use embedding::{
    Embedder, EmbeddingError, HttpEmbedder, HttpEmbedderConfig, SENTENCE_EMBEDDING_DIM,
    SentenceConfig, SentenceEmbedder,
};
#[cfg(any(test, feature = "mock"))]
pub use embedding::{MockBehavior, MockEmbedder};
pub use index::{
    EmbeddingIndex, IndexConfig, IndexError, IndexResult, IndexSnapshot, IndexState, IndexStats,
    Metric, PersistenceError, SearchHit,
};
pub use rerank::{RerankError, RerankResult, RerankedCandidate, Reranker, RerankerConfig};
pub use retrieval::{RetrievalEngine, RetrievalError, RetrievalResult, SearchResult};
#[cfg(any(test, feature = "mock"))]
pub use scoring::MockScorer;
pub use scoring::{
    CrossEncoder, CrossEncoderConfig, CrossScorer, HttpCrossScorer, HttpScorerConfig, ScorerError,
};
pub use storage::{ArtifactWriter, MappedArtifact, StorageError};
