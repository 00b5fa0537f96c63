//! Remote cross-scorer speaking the text-embeddings-inference `/rerank` protocol.

#[cfg(test)]
mod tests;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embedding::http::DEFAULT_HTTP_TIMEOUT;
use crate::scoring::error::ScorerError;
use crate::scoring::traits::CrossScorer;

#[derive(Debug, Clone)]
pub struct HttpScorerConfig {
    /// Server root; `/rerank` is appended.
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for HttpScorerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl HttpScorerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), ScorerError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ScorerError::InvalidConfig {
                reason: format!("base_url must be an http(s) URL, got '{}'", self.base_url),
            });
        }
        if self.timeout.is_zero() {
            return Err(ScorerError::InvalidConfig {
                reason: "timeout must be non-zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn rerank_url(&self) -> String {
        format!("{}/rerank", self.base_url)
    }
}

#[derive(Debug, Serialize)]
struct RerankRequest<'a> {
    query: &'a str,
    texts: &'a [&'a str],
    raw_scores: bool,
}

#[derive(Debug, Deserialize)]
struct RerankEntry {
    index: usize,
    score: f32,
}

/// [`CrossScorer`] backed by an HTTP rerank server.
#[derive(Debug, Clone)]
pub struct HttpCrossScorer {
    client: Client,
    config: HttpScorerConfig,
}

impl HttpCrossScorer {
    pub fn new(config: HttpScorerConfig) -> Result<Self, ScorerError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScorerError::InvalidConfig {
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpScorerConfig {
        &self.config
    }
}

/// Maps a `/rerank` response back to input order.
///
/// The server may return entries sorted by score; every input index must
/// appear exactly once.
pub fn parse_rerank_response(body: &str, expected: usize) -> Result<Vec<f32>, ScorerError> {
    let entries: Vec<RerankEntry> =
        serde_json::from_str(body).map_err(|e| ScorerError::MalformedResponse {
            reason: format!("invalid rerank response: {}", e),
        })?;

    if entries.len() != expected {
        return Err(ScorerError::MalformedResponse {
            reason: format!("expected {} scores, got {}", expected, entries.len()),
        });
    }

    let mut scores: Vec<Option<f32>> = vec![None; expected];
    for entry in entries {
        let Some(slot) = scores.get_mut(entry.index) else {
            return Err(ScorerError::MalformedResponse {
                reason: format!("index {} out of range ({} texts)", entry.index, expected),
            });
        };
        if slot.replace(entry.score).is_some() {
            return Err(ScorerError::MalformedResponse {
                reason: format!("duplicate index {} in rerank response", entry.index),
            });
        }
    }

    // Length and uniqueness checks above guarantee every slot is filled.
    Ok(scores.into_iter().flatten().collect())
}

#[async_trait]
impl CrossScorer for HttpCrossScorer {
    fn name(&self) -> &str {
        "http"
    }

    async fn score(&self, query: &str, text: &str) -> Result<f32, ScorerError> {
        let mut scores = self.score_batch(query, &[text]).await?;
        scores.pop().ok_or_else(|| ScorerError::MalformedResponse {
            reason: "rerank response was empty".to_string(),
        })
    }

    async fn score_batch(&self, query: &str, texts: &[&str]) -> Result<Vec<f32>, ScorerError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let url = self.config.rerank_url();
        debug!(url = %url, num_texts = texts.len(), "Requesting remote rerank scores");

        let http_err = |source| ScorerError::Http {
            url: url.clone(),
            source,
        };

        let response = self
            .client
            .post(&url)
            .json(&RerankRequest {
                query,
                texts,
                raw_scores: false,
            })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_err)?;

        let body = response.text().await.map_err(http_err)?;
        parse_rerank_response(&body, texts.len())
    }
}
