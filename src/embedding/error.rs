use std::path::PathBuf;
use thiserror::Error;

/// Failures of an [`Embedder`](super::Embedder) adapter.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("no encoder model at {path}")]
    ModelNotFound { path: PathBuf },

    #[error("could not load encoder model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("encoder forward pass failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("tokenizer error: {reason}")]
    TokenizationFailed { reason: String },

    #[error("bad embedder settings: {reason}")]
    InvalidConfig { reason: String },

    #[error("POST {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The adapter answered, but not with one finite vector per input.
    #[error("unusable embedder output: {reason}")]
    MalformedResponse { reason: String },
}

impl From<candle_core::Error> for EmbeddingError {
    fn from(err: candle_core::Error) -> Self {
        Self::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for EmbeddingError {
    fn from(err: std::io::Error) -> Self {
        Self::ModelLoadFailed {
            reason: format!("reading model files: {err}"),
        }
    }
}
