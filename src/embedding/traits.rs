use async_trait::async_trait;

use super::error::EmbeddingError;

/// Text -> vector capability consumed by the index and the retrieval engine.
///
/// Implementations must be deterministic for a fixed configuration and return
/// exactly one vector per input text, all of the same dimension.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Output dimension, when known before the first call.
    fn dimension(&self) -> Option<usize> {
        None
    }

    /// Encodes a batch of texts.
    async fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Encodes a single text.
    async fn encode_one(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.encode(&[text]).await?;
        if vectors.len() != 1 {
            return Err(EmbeddingError::MalformedResponse {
                reason: format!("expected 1 vector, got {}", vectors.len()),
            });
        }
        Ok(vectors.remove(0))
    }
}
