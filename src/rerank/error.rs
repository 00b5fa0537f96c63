use thiserror::Error;

use crate::scoring::ScorerError;

#[derive(Debug, Error)]
pub enum RerankError {
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("cross-scorer failed for query '{query}': {source}")]
    Scoring {
        query: String,
        #[source]
        source: ScorerError,
    },
}

impl RerankError {
    pub(crate) fn scoring(query: &str, source: ScorerError) -> Self {
        RerankError::Scoring {
            query: query.to_string(),
            source,
        }
    }
}

pub type RerankResult<T> = Result<T, RerankError>;
