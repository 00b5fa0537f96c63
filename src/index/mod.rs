//! Exact embedding index with atomic snapshot swaps.
//!
//! Every successful build or load produces a fresh immutable [`IndexSnapshot`]
//! that replaces the active one under a short write lock. Readers clone the
//! `Arc` and search without holding any lock, so a concurrent rebuild is
//! observed as either the old or the new snapshot.
//!
//! # Example
//!
//! ```ignore
//! let index = EmbeddingIndex::new(IndexConfig::default());
//! index.build(&corpus, &embedder).await?;
//! let hits = index.search(&query_vector, 5)?;
//! index.persist("./.index")?;
//! ```

pub mod config;
pub mod error;
pub mod flat;
pub mod persist;
pub mod types;


pub use config::{IndexConfig, Metric};
pub use error::{IndexError, IndexResult, PersistenceError, PersistenceResult};
pub use flat::FlatVectors;
pub use persist::{ArtifactPaths, NativeIndex, read_raw_vectors};
pub use types::{IndexState, IndexStats, SearchHit, SnapshotOrigin};

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::document::Document;
use crate::embedding::utils::l2_normalize;
use crate::embedding::{Embedder, EmbeddingError};

/// Immutable searchable state: vectors, metric and (optionally) documents.
#[derive(Debug)]
pub struct IndexSnapshot {
    vectors: Arc<FlatVectors>,
    metric: Metric,
    documents: Option<Arc<[Arc<Document>]>>,
    origin: SnapshotOrigin,
    activated_at: DateTime<Utc>,
}

impl IndexSnapshot {
    fn new(
        vectors: Arc<FlatVectors>,
        metric: Metric,
        documents: Option<Arc<[Arc<Document>]>>,
        origin: SnapshotOrigin,
    ) -> Self {
        Self {
            vectors,
            metric,
            documents,
            origin,
            activated_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.vectors.dimension()
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn origin(&self) -> SnapshotOrigin {
        self.origin
    }

    pub fn vectors(&self) -> &FlatVectors {
        &self.vectors
    }

    pub fn has_documents(&self) -> bool {
        self.documents.is_some()
    }

    /// Document at `position`; `None` when out of range or no id map is loaded.
    pub fn document(&self, position: usize) -> Option<&Arc<Document>> {
        self.documents.as_ref()?.get(position)
    }

    /// Top `top_k` hits for `query`, ordered by score desc then position asc.
    pub fn search(&self, query: &[f32], top_k: usize) -> IndexResult<Vec<SearchHit>> {
        if top_k == 0 {
            return Err(IndexError::invalid("top_k must be greater than zero"));
        }
        if query.len() != self.dimension() {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension(),
                actual: query.len(),
                position: None,
            });
        }
        if query.iter().any(|v| !v.is_finite()) {
            return Err(IndexError::invalid("query vector contains non-finite values"));
        }

        Ok(self.vectors.top_k(query, self.metric, top_k))
    }
}

/// Clears the building flag when a build or load ends, successful or not.
struct BuildingGuard<'a>(&'a AtomicBool);

impl<'a> BuildingGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for BuildingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Embedding index over a corpus of [`Document`]s.
///
/// Only one build/load runs at a time; searches are lock-free against the
/// active snapshot and may run concurrently with a rebuild.
pub struct EmbeddingIndex {
    config: IndexConfig,
    active: RwLock<Option<Arc<IndexSnapshot>>>,
    build_lock: Mutex<()>,
    building: AtomicBool,
}

impl std::fmt::Debug for EmbeddingIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingIndex")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("len", &self.len())
            .finish()
    }
}

impl Default for EmbeddingIndex {
    fn default() -> Self {
        Self::new(IndexConfig::default())
    }
}

impl EmbeddingIndex {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            active: RwLock::new(None),
            build_lock: Mutex::new(()),
            building: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn state(&self) -> IndexState {
        if self.building.load(Ordering::SeqCst) {
            IndexState::Building
        } else if self.active.read().is_some() {
            IndexState::Built
        } else {
            IndexState::Empty
        }
    }

    /// `true` once a snapshot is active (also while a rebuild runs).
    pub fn is_built(&self) -> bool {
        self.active.read().is_some()
    }

    /// The active snapshot. Hold on to it to keep search and document lookups consistent.
    pub fn snapshot(&self) -> Option<Arc<IndexSnapshot>> {
        self.active.read().clone()
    }

    pub fn search(&self, query: &[f32], top_k: usize) -> IndexResult<Vec<SearchHit>> {
        self.snapshot().ok_or(IndexError::NotBuilt)?.search(query, top_k)
    }

    pub fn document(&self, position: usize) -> Option<Arc<Document>> {
        self.snapshot()?.document(position).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dimension(&self) -> Option<usize> {
        self.snapshot().map(|s| s.dimension())
    }

    /// Metric of the active snapshot, or the configured one before any build.
    pub fn metric(&self) -> Metric {
        self.snapshot()
            .map(|s| s.metric())
            .unwrap_or(self.config.metric)
    }

    pub fn has_documents(&self) -> bool {
        self.snapshot().is_some_and(|s| s.has_documents())
    }

    pub fn stats(&self) -> IndexStats {
        let snapshot = self.snapshot();
        IndexStats {
            state: self.state(),
            documents: snapshot.as_ref().map(|s| s.len()).unwrap_or(0),
            dimension: snapshot.as_ref().map(|s| s.dimension()),
            metric: snapshot
                .as_ref()
                .map(|s| s.metric())
                .unwrap_or(self.config.metric),
            has_documents: snapshot.as_ref().is_some_and(|s| s.has_documents()),
            origin: snapshot.as_ref().map(|s| s.origin()),
            activated_at: snapshot.as_ref().map(|s| s.activated_at),
        }
    }

    fn activate(&self, snapshot: IndexSnapshot) {
        *self.active.write() = Some(Arc::new(snapshot));
    }

    /// Encodes the corpus and swaps in the result. On failure the previous
    /// snapshot stays active.
    pub async fn build(&self, corpus: &[Document], embedder: &dyn Embedder) -> IndexResult<()> {
        let _lock = self.build_lock.lock().await;
        self.build_locked(corpus, embedder).await
    }

    /// Builds only if no snapshot is active. Returns `true` if this call built.
    ///
    /// Racing callers serialize on the build lock, so the corpus is encoded once.
    pub async fn ensure_built(
        &self,
        corpus: &[Document],
        embedder: &dyn Embedder,
    ) -> IndexResult<bool> {
        let _lock = self.build_lock.lock().await;
        if self.is_built() {
            debug!("Index already built, skipping build");
            return Ok(false);
        }
        self.build_locked(corpus, embedder).await?;
        Ok(true)
    }

    async fn build_locked(&self, corpus: &[Document], embedder: &dyn Embedder) -> IndexResult<()> {
        self.config.validate()?;
        let _building = BuildingGuard::enter(&self.building);
        let started = Instant::now();

        info!(
            documents = corpus.len(),
            field = %self.config.encode_field,
            metric = %self.config.metric,
            embedder = embedder.name(),
            "Building embedding index"
        );

        let vectors = self.encode_corpus(corpus, embedder).await?;
        let documents: Arc<[Arc<Document>]> = corpus.iter().cloned().map(Arc::new).collect();

        let snapshot = IndexSnapshot::new(
            Arc::new(vectors),
            self.config.metric,
            Some(documents),
            SnapshotOrigin::Built,
        );
        let (count, dimension) = (snapshot.len(), snapshot.dimension());
        self.activate(snapshot);

        info!(
            documents = count,
            dimension,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Embedding index built"
        );
        Ok(())
    }

    async fn encode_corpus(
        &self,
        corpus: &[Document],
        embedder: &dyn Embedder,
    ) -> IndexResult<FlatVectors> {
        if corpus.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }

        let field = self.config.encode_field;
        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(corpus.len());
        let mut texts = Vec::with_capacity(corpus.len());

        for (position, document) in corpus.iter().enumerate() {
            if let Some(first) = seen.insert(document.id.as_str(), position) {
                return Err(IndexError::DuplicateDocumentId {
                    id: document.id.clone(),
                    first,
                    second: position,
                });
            }
            let text = document
                .encoding_text(field)
                .ok_or_else(|| IndexError::MissingField {
                    document_id: document.id.clone(),
                    field,
                })?;
            texts.push(text);
        }

        let mut dimension: Option<usize> = None;
        let mut data: Vec<f32> = Vec::new();

        for (batch_no, batch) in texts.chunks(self.config.batch_size).enumerate() {
            let offset = batch_no * self.config.batch_size;
            let batch_docs = &corpus[offset..offset + batch.len()];

            debug!(offset, batch = batch.len(), "Encoding corpus batch");

            let context = || {
                format!(
                    "encoding documents {}..{} (first id '{}')",
                    offset,
                    offset + batch.len(),
                    batch_docs[0].id
                )
            };

            let vectors = embedder
                .encode(batch)
                .await
                .map_err(|source| IndexError::Capability {
                    context: context(),
                    source,
                })?;

            if vectors.len() != batch.len() {
                return Err(IndexError::Capability {
                    context: context(),
                    source: EmbeddingError::MalformedResponse {
                        reason: format!(
                            "expected {} vectors, got {}",
                            batch.len(),
                            vectors.len()
                        ),
                    },
                });
            }

            for (i, (mut vector, document)) in vectors.into_iter().zip(batch_docs).enumerate() {
                let position = offset + i;
                let malformed = |reason: &str| IndexError::MalformedEmbedding {
                    document_id: document.id.clone(),
                    reason: reason.to_string(),
                };

                if vector.is_empty() {
                    return Err(malformed("zero-length vector"));
                }
                if vector.iter().any(|v| !v.is_finite()) {
                    return Err(malformed("non-finite component"));
                }

                let expected = *dimension.get_or_insert(vector.len());
                if vector.len() != expected {
                    return Err(IndexError::DimensionMismatch {
                        expected,
                        actual: vector.len(),
                        position: Some(position),
                    });
                }

                if data.is_empty() {
                    data.reserve(corpus.len() * expected);
                }
                l2_normalize(&mut vector);
                data.extend_from_slice(&vector);
            }
        }

        dimension
            .and_then(|d| FlatVectors::new(d, data))
            .ok_or(IndexError::EmptyCorpus)
    }

    /// Writes the three index artifacts into `dir`.
    pub fn persist<P: AsRef<Path>>(&self, dir: P) -> IndexResult<ArtifactPaths> {
        let dir = dir.as_ref();
        let snapshot = self.snapshot().ok_or(IndexError::NotBuilt)?;
        let documents = snapshot
            .documents
            .as_ref()
            .ok_or(PersistenceError::DocumentsUnavailable)?;

        let paths = persist::write_artifacts(dir, &snapshot.vectors, snapshot.metric, documents)?;

        info!(
            dir = %dir.display(),
            documents = snapshot.len(),
            dimension = snapshot.dimension(),
            "Embedding index persisted"
        );
        Ok(paths)
    }

    /// Loads the native structure and the id map from `dir`.
    pub async fn load<P: AsRef<Path>>(&self, dir: P) -> IndexResult<()> {
        let paths = ArtifactPaths::in_dir(dir);
        let _lock = self.build_lock.lock().await;
        let _building = BuildingGuard::enter(&self.building);

        let (metric, vectors) = persist::read_native(&paths.native)?;
        let documents: Arc<[Arc<Document>]> =
            persist::read_id_map(&paths.id_map, vectors.len())?.into();

        self.warn_on_metric_override(metric);
        let count = vectors.len();
        self.activate(IndexSnapshot::new(
            Arc::new(vectors),
            metric,
            Some(documents),
            SnapshotOrigin::Loaded,
        ));

        info!(path = %paths.native.display(), documents = count, "Embedding index loaded");
        Ok(())
    }

    /// Loads only the native structure: searches return positions and scores,
    /// [`document`](Self::document) returns `None` until an id map is attached.
    pub async fn load_native<P: AsRef<Path>>(&self, dir: P) -> IndexResult<()> {
        let paths = ArtifactPaths::in_dir(dir);
        let _lock = self.build_lock.lock().await;
        let _building = BuildingGuard::enter(&self.building);

        let (metric, vectors) = persist::read_native(&paths.native)?;

        self.warn_on_metric_override(metric);
        let count = vectors.len();
        self.activate(IndexSnapshot::new(
            Arc::new(vectors),
            metric,
            None,
            SnapshotOrigin::LoadedNative,
        ));

        info!(
            path = %paths.native.display(),
            vectors = count,
            "Embedding index loaded without documents"
        );
        Ok(())
    }

    /// Resolves documents onto the active snapshot from an `id_map.json` file.
    pub async fn attach_id_map<P: AsRef<Path>>(&self, path: P) -> IndexResult<()> {
        let path = path.as_ref();
        let _lock = self.build_lock.lock().await;
        let current = self.snapshot().ok_or(IndexError::NotBuilt)?;

        let documents: Arc<[Arc<Document>]> = persist::read_id_map(path, current.len())?.into();

        self.activate(IndexSnapshot::new(
            Arc::clone(&current.vectors),
            current.metric,
            Some(documents),
            SnapshotOrigin::Loaded,
        ));

        info!(path = %path.display(), documents = current.len(), "Id map attached");
        Ok(())
    }

    fn warn_on_metric_override(&self, loaded: Metric) {
        if loaded != self.config.metric {
            warn!(
                configured = %self.config.metric,
                loaded = %loaded,
                "Persisted index uses a different metric than configured"
            );
        }
    }
}
