use async_trait::async_trait;
use futures_util::future::try_join_all;

use super::error::ScorerError;

/// (query, text) -> relevance capability used by the reranker.
///
/// Higher is more relevant. Scores are only compared within one call, so any
/// monotone scale (logits, probabilities) works.
#[async_trait]
pub trait CrossScorer: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    async fn score(&self, query: &str, text: &str) -> Result<f32, ScorerError>;

    /// Scores every text against `query`, preserving input order.
    async fn score_batch(&self, query: &str, texts: &[&str]) -> Result<Vec<f32>, ScorerError> {
        try_join_all(texts.iter().map(|text| self.score(query, text))).await
    }
}
