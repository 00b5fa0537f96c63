//! Cross-scoring capability: relevance of a (query, text) pair.
//!
//! [`CrossScorer`] is what the [`Reranker`](crate::rerank::Reranker) consumes.
//! [`CrossEncoder`] runs a local BERT classifier (or a lexical stub) and
//! [`HttpCrossScorer`] calls a remote rerank server.

pub mod cross_encoder;
pub mod error;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod traits;


pub use cross_encoder::{CrossEncoder, CrossEncoderConfig};
pub use error::ScorerError;
pub use http::{HttpCrossScorer, HttpScorerConfig, parse_rerank_response};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockScorer;
pub use traits::CrossScorer;
