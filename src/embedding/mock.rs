use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::embedding::error::EmbeddingError;
use crate::embedding::sentence::{SentenceConfig, SentenceEmbedder};
use crate::embedding::traits::Embedder;

/// How a [`MockEmbedder`] answers `encode`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MockBehavior {
    #[default]
    Normal,
    /// Every call fails with `InferenceFailed`.
    Fail,
    /// Returns one vector fewer than requested.
    DropLast,
}

/// Counting embedder for tests.
///
/// Falls back to the token-hashing stub for any text without an explicit
/// vector registered through [`MockEmbedder::with_vector`].
pub struct MockEmbedder {
    fallback: SentenceEmbedder,
    overrides: RwLock<HashMap<String, Vec<f32>>>,
    behavior: RwLock<MockBehavior>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    texts_seen: AtomicUsize,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        let config = SentenceConfig::stub().with_embedding_dim(dimension.max(1));
        let fallback = match SentenceEmbedder::load(config) {
            Ok(embedder) => embedder,
            Err(e) => panic!("stub embedder must load: {e}"),
        };

        Self {
            fallback,
            overrides: RwLock::new(HashMap::new()),
            behavior: RwLock::new(MockBehavior::Normal),
            delay: None,
            calls: AtomicUsize::new(0),
            texts_seen: AtomicUsize::new(0),
        }
    }

    /// Pins the vector returned for `text`.
    pub fn with_vector(self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.overrides.write().insert(text.into(), vector);
        self
    }

    pub fn with_behavior(self, behavior: MockBehavior) -> Self {
        *self.behavior.write() = behavior;
        self
    }

    /// Sleeps before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.write() = behavior;
    }

    pub fn set_vector(&self, text: impl Into<String>, vector: Vec<f32>) {
        self.overrides.write().insert(text.into(), vector);
    }

    /// Number of `encode` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Total number of texts passed to `encode`.
    pub fn texts_seen(&self) -> usize {
        self.texts_seen.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    fn name(&self) -> &str {
        "mock"
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.fallback.embedding_dim())
    }

    async fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts_seen.fetch_add(texts.len(), Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let behavior = *self.behavior.read();
        if behavior == MockBehavior::Fail {
            return Err(EmbeddingError::InferenceFailed {
                reason: "mock embedder failure".to_string(),
            });
        }

        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            let pinned = self.overrides.read().get(*text).cloned();
            match pinned {
                Some(vector) => vectors.push(vector),
                None => vectors.push(self.fallback.embed(text)?),
            }
        }

        if behavior == MockBehavior::DropLast {
            vectors.pop();
        }

        Ok(vectors)
    }
}
