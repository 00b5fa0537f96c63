use std::time::Duration;

use crate::embedding::error::EmbeddingError;

/// Default request timeout for remote embedders.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`HttpEmbedder`](super::HttpEmbedder).
#[derive(Debug, Clone)]
pub struct HttpEmbedderConfig {
    /// Server root, e.g. `http://localhost:8080` (the `/embed` route is appended).
    pub base_url: String,
    pub timeout: Duration,
    /// Texts per request.
    pub batch_size: usize,
    /// Asks the server for unit-length vectors.
    pub normalize: bool,
}

impl Default for HttpEmbedderConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: DEFAULT_HTTP_TIMEOUT,
            batch_size: crate::constants::DEFAULT_BATCH_SIZE,
            normalize: true,
        }
    }
}

impl HttpEmbedderConfig {
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

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!("base_url must be an http(s) URL, got '{}'", self.base_url),
            });
        }
        if self.batch_size == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "batch_size must be greater than zero".to_string(),
            });
        }
        if self.timeout.is_zero() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "timeout must be non-zero".to_string(),
            });
        }
        Ok(())
    }

    /// Full URL of the embed route.
    pub fn embed_url(&self) -> String {
        format!("{}/embed", self.base_url)
    }
}
