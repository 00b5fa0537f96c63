//! Remote embedder speaking the text-embeddings-inference `/embed` protocol.

pub mod config;


pub use config::{DEFAULT_HTTP_TIMEOUT, HttpEmbedderConfig};

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::embedding::error::EmbeddingError;
use crate::embedding::traits::Embedder;

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [&'a str],
    normalize: bool,
}

/// [`Embedder`] backed by an HTTP embedding server.
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    client: Client,
    config: HttpEmbedderConfig,
}

impl HttpEmbedder {
    pub fn new(config: HttpEmbedderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::InvalidConfig {
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpEmbedderConfig {
        &self.config
    }

    async fn post_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let url = self.config.embed_url();
        let http_err = |source| EmbeddingError::Http {
            url: url.clone(),
            source,
        };

        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest {
                inputs: texts,
                normalize: self.config.normalize,
            })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_err)?;

        let body = response.text().await.map_err(http_err)?;
        parse_embed_response(&body, texts.len())
    }
}

/// Decodes an `/embed` response body, checking one vector per input.
pub fn parse_embed_response(body: &str, expected: usize) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let vectors: Vec<Vec<f32>> =
        serde_json::from_str(body).map_err(|e| EmbeddingError::MalformedResponse {
            reason: format!("invalid embed response: {}", e),
        })?;

    if vectors.len() != expected {
        return Err(EmbeddingError::MalformedResponse {
            reason: format!("expected {} vectors, got {}", expected, vectors.len()),
        });
    }

    Ok(vectors)
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn name(&self) -> &str {
        "http"
    }

    async fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.config.batch_size) {
            debug!(
                url = %self.config.base_url,
                batch = chunk.len(),
                "Requesting remote embeddings"
            );
            vectors.extend(self.post_batch(chunk).await?);
        }
        Ok(vectors)
    }
}
