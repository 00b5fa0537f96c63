use std::path::PathBuf;
use thiserror::Error;

use crate::embedding::EmbeddingError;

/// Failures of a [`CrossScorer`](super::CrossScorer) adapter.
#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("no cross-encoder model at {path}")]
    ModelNotFound { path: PathBuf },

    #[error("could not load cross-encoder: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("cross-encoder forward pass failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("tokenizer error: {reason}")]
    TokenizationFailed { reason: String },

    #[error("bad scorer settings: {reason}")]
    InvalidConfig { reason: String },

    #[error("POST {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unusable scorer output: {reason}")]
    MalformedResponse { reason: String },
}

impl From<candle_core::Error> for ScorerError {
    fn from(err: candle_core::Error) -> Self {
        Self::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

/// The cross-encoder shares model loading with the sentence encoder.
impl From<EmbeddingError> for ScorerError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::ModelNotFound { path } => Self::ModelNotFound { path },
            EmbeddingError::ModelLoadFailed { reason } => Self::ModelLoadFailed { reason },
            EmbeddingError::TokenizationFailed { reason } => Self::TokenizationFailed { reason },
            EmbeddingError::InvalidConfig { reason } => Self::InvalidConfig { reason },
            EmbeddingError::Http { url, source } => Self::Http { url, source },
            EmbeddingError::MalformedResponse { reason } => Self::MalformedResponse { reason },
            EmbeddingError::InferenceFailed { reason } => Self::InferenceFailed { reason },
        }
    }
}
