//! Query -> ranked documents over an [`EmbeddingIndex`].

pub mod error;
pub mod types;


pub use error::{RetrievalError, RetrievalResult};
pub use types::SearchResult;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::document::Document;
use crate::embedding::utils::l2_normalize;
use crate::embedding::{Embedder, EmbeddingError};
use crate::index::{EmbeddingIndex, IndexError, IndexSnapshot, SearchHit};

/// Encodes queries with the same embedder the index was built with and
/// resolves hits to documents.
///
/// An engine created with [`with_corpus`](Self::with_corpus) builds its index
/// on first use; later calls reuse it.
pub struct RetrievalEngine {
    index: Arc<EmbeddingIndex>,
    embedder: Arc<dyn Embedder>,
    pending_corpus: Mutex<Option<Arc<[Document]>>>,
}

impl std::fmt::Debug for RetrievalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalEngine")
            .field("index", &self.index)
            .field("embedder", &self.embedder.name())
            .field("lazy_build_pending", &self.pending_corpus.lock().is_some())
            .finish()
    }
}

impl RetrievalEngine {
    pub fn new(index: Arc<EmbeddingIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            index,
            embedder,
            pending_corpus: Mutex::new(None),
        }
    }

    /// Engine whose index is built from `corpus` on the first retrieval.
    pub fn with_corpus(
        index: Arc<EmbeddingIndex>,
        embedder: Arc<dyn Embedder>,
        corpus: Vec<Document>,
    ) -> Self {
        Self {
            index,
            embedder,
            pending_corpus: Mutex::new(Some(corpus.into())),
        }
    }

    pub fn index(&self) -> &Arc<EmbeddingIndex> {
        &self.index
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Runs the pending lazy build, if any. Returns `true` if this call built.
    pub async fn prepare(&self) -> RetrievalResult<bool> {
        if self.index.is_built() {
            self.pending_corpus.lock().take();
            return Ok(false);
        }

        let pending = self.pending_corpus.lock().clone();
        let Some(corpus) = pending else {
            return Ok(false);
        };

        let built = self
            .index
            .ensure_built(&corpus, self.embedder.as_ref())
            .await?;
        self.pending_corpus.lock().take();

        if built {
            info!(documents = corpus.len(), "Lazy index build complete");
        }
        Ok(built)
    }

    async fn active_snapshot(&self) -> RetrievalResult<Arc<IndexSnapshot>> {
        self.prepare().await?;
        Ok(self.index.snapshot().ok_or(IndexError::NotBuilt)?)
    }

    /// Top `top_k` documents for `query`, most relevant first.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> RetrievalResult<Vec<SearchResult>> {
        check_top_k(top_k)?;
        let snapshot = self.active_snapshot().await?;

        let vector = self
            .embedder
            .encode_one(query)
            .await
            .map_err(|e| RetrievalError::embedding(query, e))?;

        let results = search_snapshot(&snapshot, query, vector, top_k)?;
        debug!(
            query_len = query.len(),
            top_k,
            hits = results.len(),
            top_score = results.first().map(|r| r.score),
            "Retrieved candidates"
        );
        Ok(results)
    }

    /// Retrieves for several queries with a single embedder call.
    pub async fn retrieve_batch(
        &self,
        queries: &[&str],
        top_k: usize,
    ) -> RetrievalResult<Vec<Vec<SearchResult>>> {
        check_top_k(top_k)?;
        if queries.is_empty() {
            return Ok(Vec::new());
        }
        let snapshot = self.active_snapshot().await?;

        let vectors = self.embedder.encode(queries).await.map_err(|e| {
            RetrievalError::embedding(queries.first().copied().unwrap_or_default(), e)
        })?;

        if vectors.len() != queries.len() {
            let query = queries.first().copied().unwrap_or_default();
            return Err(RetrievalError::embedding(
                query,
                EmbeddingError::MalformedResponse {
                    reason: format!(
                        "expected {} query vectors, got {}",
                        queries.len(),
                        vectors.len()
                    ),
                },
            ));
        }

        debug!(queries = queries.len(), top_k, "Retrieving batch");

        queries
            .iter()
            .zip(vectors)
            .map(|(query, vector)| search_snapshot(&snapshot, query, vector, top_k))
            .collect()
    }
}

fn check_top_k(top_k: usize) -> RetrievalResult<()> {
    if top_k == 0 {
        return Err(IndexError::InvalidArgument {
            reason: "top_k must be greater than zero".to_string(),
        }
        .into());
    }
    Ok(())
}

fn search_snapshot(
    snapshot: &IndexSnapshot,
    query: &str,
    mut vector: Vec<f32>,
    top_k: usize,
) -> RetrievalResult<Vec<SearchResult>> {
    if vector.iter().any(|v| !v.is_finite()) {
        return Err(RetrievalError::embedding(
            query,
            EmbeddingError::MalformedResponse {
                reason: "query vector contains non-finite values".to_string(),
            },
        ));
    }
    l2_normalize(&mut vector);

    let hits = snapshot.search(&vector, top_k)?;
    resolve(snapshot, hits)
}

fn resolve(snapshot: &IndexSnapshot, hits: Vec<SearchHit>) -> RetrievalResult<Vec<SearchResult>> {
    hits.into_iter()
        .map(|hit| {
            let document = snapshot
                .document(hit.position)
                .cloned()
                .ok_or(RetrievalError::DocumentUnavailable {
                    position: hit.position,
                })?;
            Ok(SearchResult::new(hit.position, hit.score, document))
        })
        .collect()
}
