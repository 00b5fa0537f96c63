use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::scoring::error::ScorerError;
use crate::scoring::traits::CrossScorer;

/// Table-driven scorer for tests: returns the score registered for a text,
/// or `default_score` for anything else.
pub struct MockScorer {
    scores: RwLock<HashMap<String, f32>>,
    default_score: f32,
    fail: bool,
    calls: AtomicUsize,
    pairs_scored: AtomicUsize,
}

impl Default for MockScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockScorer {
    pub fn new() -> Self {
        Self {
            scores: RwLock::new(HashMap::new()),
            default_score: 0.0,
            fail: false,
            calls: AtomicUsize::new(0),
            pairs_scored: AtomicUsize::new(0),
        }
    }

    /// A scorer whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn with_score(self, text: impl Into<String>, score: f32) -> Self {
        self.scores.write().insert(text.into(), score);
        self
    }

    pub fn with_default_score(mut self, score: f32) -> Self {
        self.default_score = score;
        self
    }

    /// Number of `score`/`score_batch` calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn pairs_scored(&self) -> usize {
        self.pairs_scored.load(Ordering::SeqCst)
    }

    fn lookup(&self, text: &str) -> Result<f32, ScorerError> {
        if self.fail {
            return Err(ScorerError::InferenceFailed {
                reason: "mock scorer failure".to_string(),
            });
        }
        Ok(self
            .scores
            .read()
            .get(text)
            .copied()
            .unwrap_or(self.default_score))
    }
}

#[async_trait]
impl CrossScorer for MockScorer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn score(&self, _query: &str, text: &str) -> Result<f32, ScorerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pairs_scored.fetch_add(1, Ordering::SeqCst);
        self.lookup(text)
    }

    async fn score_batch(&self, _query: &str, texts: &[&str]) -> Result<Vec<f32>, ScorerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pairs_scored.fetch_add(texts.len(), Ordering::SeqCst);
        texts.iter().map(|text| self.lookup(text)).collect()
    }
}
