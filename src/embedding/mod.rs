//! Text embedding capability and its adapters.
//!
//! - [`Embedder`] is the capability consumed by the index and retrieval engine.
//! - [`sentence`] runs a local BERT encoder (or a token-hashing stub).
//! - [`http`] calls a remote embedding server.

/// BERT model wrappers shared with the cross-encoder.
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
/// Remote embedder.
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
/// Local sentence embedder.
pub mod sentence;
mod traits;
/// Tokenizer loading and vector helpers.
pub mod utils;

pub use error::EmbeddingError;
pub use http::{HttpEmbedder, HttpEmbedderConfig};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockBehavior, MockEmbedder};
pub use sentence::{SENTENCE_EMBEDDING_DIM, SENTENCE_MAX_SEQ_LEN, SentenceConfig, SentenceEmbedder};
pub use traits::Embedder;
