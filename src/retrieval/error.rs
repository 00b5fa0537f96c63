use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::index::IndexError;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("failed to encode query '{query}': {source}")]
    Embedding {
        query: String,
        #[source]
        source: EmbeddingError,
    },

    #[error("no document loaded for position {position}; attach an id map first")]
    DocumentUnavailable { position: usize },
}

impl RetrievalError {
    pub(crate) fn embedding(query: &str, source: EmbeddingError) -> Self {
        RetrievalError::Embedding {
            query: query.to_string(),
            source,
        }
    }
}

pub type RetrievalResult<T> = Result<T, RetrievalError>;
