//! Second-stage reranking of retrieved candidates with a [`CrossScorer`].
//!
//! Candidates are scored against their document text, sorted by cross score
//! (ties keep retrieval order) and trimmed to `top_k`.

pub mod config;
pub mod error;


pub use config::RerankerConfig;
pub use error::{RerankError, RerankResult};

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::document::Document;
use crate::retrieval::SearchResult;
use crate::scoring::{CrossScorer, ScorerError};

/// A candidate after reranking, with both scores kept for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct RerankedCandidate {
    pub document: Arc<Document>,
    /// Cross-scorer relevance.
    pub score: f32,
    /// Similarity from the retrieval stage.
    pub retrieval_score: f32,
    /// Zero-based rank in the retrieval output.
    pub retrieval_rank: usize,
    /// Corpus position in the index.
    pub position: usize,
}

pub struct Reranker {
    scorer: Arc<dyn CrossScorer>,
    config: RerankerConfig,
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("scorer", &self.scorer.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Reranker {
    pub fn new(scorer: Arc<dyn CrossScorer>) -> Self {
        Self {
            scorer,
            config: RerankerConfig::default(),
        }
    }

    pub fn with_config(scorer: Arc<dyn CrossScorer>, config: RerankerConfig) -> RerankResult<Self> {
        config.validate()?;
        Ok(Self { scorer, config })
    }

    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }

    pub fn scorer(&self) -> &Arc<dyn CrossScorer> {
        &self.scorer
    }

    /// Reorders `candidates` by cross score and returns the best `top_k` documents.
    pub async fn rerank(
        &self,
        query: &str,
        candidates: &[SearchResult],
        top_k: usize,
    ) -> RerankResult<Vec<Arc<Document>>> {
        Ok(self
            .rerank_scored(query, candidates, top_k)
            .await?
            .into_iter()
            .map(|c| c.document)
            .collect())
    }

    /// Like [`rerank`](Self::rerank), keeping scores and retrieval ranks.
    pub async fn rerank_scored(
        &self,
        query: &str,
        candidates: &[SearchResult],
        top_k: usize,
    ) -> RerankResult<Vec<RerankedCandidate>> {
        if top_k == 0 {
            return Err(RerankError::InvalidArgument {
                reason: "top_k must be greater than zero".to_string(),
            });
        }
        if candidates.is_empty() {
            debug!("No candidates to rerank");
            return Ok(Vec::new());
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(candidates.len());
        let unique: Vec<(usize, &SearchResult)> = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| seen.insert(c.document.id.as_str()))
            .collect();

        let texts: Vec<&str> = unique.iter().map(|(_, c)| c.document.rerank_text()).collect();

        debug!(
            query_len = query.len(),
            num_candidates = candidates.len(),
            unique = unique.len(),
            scorer = self.scorer.name(),
            "Reranking candidates"
        );

        let scores = self
            .scorer
            .score_batch(query, &texts)
            .await
            .map_err(|e| RerankError::scoring(query, e))?;

        if scores.len() != unique.len() {
            return Err(RerankError::scoring(
                query,
                ScorerError::MalformedResponse {
                    reason: format!("expected {} scores, got {}", unique.len(), scores.len()),
                },
            ));
        }

        let mut reranked = Vec::with_capacity(unique.len());
        for ((rank, candidate), score) in unique.into_iter().zip(scores) {
            if !score.is_finite() {
                return Err(RerankError::scoring(
                    query,
                    ScorerError::MalformedResponse {
                        reason: format!(
                            "non-finite score {} for document '{}'",
                            score, candidate.document.id
                        ),
                    },
                ));
            }
            if self.config.min_score.is_some_and(|min| score <= min) {
                continue;
            }
            reranked.push(RerankedCandidate {
                document: Arc::clone(&candidate.document),
                score,
                retrieval_score: candidate.score,
                retrieval_rank: rank,
                position: candidate.position,
            });
        }

        reranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.retrieval_rank.cmp(&b.retrieval_rank))
        });
        reranked.truncate(top_k);

        debug!(
            kept = reranked.len(),
            top_score = reranked.first().map(|c| c.score),
            "Reranking complete"
        );
        Ok(reranked)
    }
}
