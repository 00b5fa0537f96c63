//! Integration tests for persisting and reloading an index.

mod common;

use std::fs;
use std::sync::Arc;

use common::fixtures::{TAX_TITLE, VISA_TITLE, built_index, sample_corpus, stub_embedder};
use sieve::constants::{ID_MAP_FILENAME, NATIVE_INDEX_FILENAME, VECTORS_FILENAME};
use sieve::embedding::Embedder;
use sieve::index::{
    EmbeddingIndex, IndexConfig, IndexError, IndexState, Metric, PersistenceError,
    SnapshotOrigin, read_raw_vectors,
};
use sieve::retrieval::RetrievalEngine;
use tempfile::TempDir;

#[tokio::test]
async fn test_persist_writes_all_artifacts() {
    let dir = TempDir::new().expect("tempdir");
    let embedder = stub_embedder();
    let index = built_index(&sample_corpus(), embedder.as_ref()).await;

    let paths = index.persist(dir.path()).expect("persist");

    assert_eq!(paths.vectors, dir.path().join(VECTORS_FILENAME));
    assert_eq!(paths.native, dir.path().join(NATIVE_INDEX_FILENAME));
    assert_eq!(paths.id_map, dir.path().join(ID_MAP_FILENAME));

    let dimension = index.dimension().expect("dimension");
    let raw = fs::metadata(&paths.vectors).expect("vectors metadata");
    assert_eq!(raw.len() as usize, 3 * dimension * std::mem::size_of::<f32>());

    let id_map: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&paths.id_map).expect("read id map"))
            .expect("id map json");
    assert_eq!(id_map["0"]["title"], VISA_TITLE);
    assert_eq!(id_map["2"]["title"], TAX_TITLE);
}

#[tokio::test]
async fn test_raw_vectors_match_index() {
    let dir = TempDir::new().expect("tempdir");
    let embedder = stub_embedder();
    let index = built_index(&sample_corpus(), embedder.as_ref()).await;
    let paths = index.persist(dir.path()).expect("persist");

    let dimension = index.dimension().expect("dimension");
    let raw = read_raw_vectors(&paths.vectors, dimension).expect("raw vectors");
    let snapshot = index.snapshot().expect("snapshot");

    assert_eq!(raw.len(), 3);
    assert_eq!(raw.as_slice(), snapshot.vectors().as_slice());
}

#[tokio::test]
async fn test_round_trip_reproduces_results() {
    let dir = TempDir::new().expect("tempdir");
    let embedder = stub_embedder();
    let original = built_index(&sample_corpus(), embedder.as_ref()).await;
    original.persist(dir.path()).expect("persist");

    let restored = Arc::new(EmbeddingIndex::new(IndexConfig::default()));
    restored.load(dir.path()).await.expect("load");
    assert_eq!(restored.state(), IndexState::Built);
    assert_eq!(restored.stats().origin, Some(SnapshotOrigin::Loaded));

    let before = RetrievalEngine::new(original, Arc::clone(&embedder));
    let after = RetrievalEngine::new(restored, embedder);

    for query in ["student visa", "working holiday", "tax return", "guide"] {
        let expected = before.retrieve(query, 3).await.expect("retrieve original");
        let actual = after.retrieve(query, 3).await.expect("retrieve restored");
        assert_eq!(expected, actual, "results differ for '{}'", query);
    }
}

#[tokio::test]
async fn test_load_uses_persisted_metric() {
    let dir = TempDir::new().expect("tempdir");
    let embedder = stub_embedder();

    let l2 = EmbeddingIndex::new(IndexConfig::default().with_metric(Metric::L2));
    l2.build(&sample_corpus(), embedder.as_ref()).await.expect("build");
    l2.persist(dir.path()).expect("persist");

    let restored = EmbeddingIndex::new(IndexConfig::default());
    restored.load(dir.path()).await.expect("load");
    assert_eq!(restored.metric(), Metric::L2);

    let query = embedder.encode_one("student visa").await.expect("encode");
    let hits = restored.search(&query, 3).expect("search");
    assert_eq!(hits[0].position, 0);
    assert!(hits.iter().all(|h| h.score <= 0.0));
}

#[tokio::test]
async fn test_native_load_then_attach_id_map() {
    let dir = TempDir::new().expect("tempdir");
    let embedder = stub_embedder();
    let original = built_index(&sample_corpus(), embedder.as_ref()).await;
    let paths = original.persist(dir.path()).expect("persist");

    let index = EmbeddingIndex::default();
    index.load_native(dir.path()).await.expect("load native");
    assert!(!index.has_documents());
    assert!(index.document(0).is_none());

    let query = embedder.encode_one("student visa").await.expect("encode");
    let hits = index.search(&query, 1).expect("search");
    assert_eq!(hits[0].position, 0);
    assert_eq!(index.stats().origin, Some(SnapshotOrigin::LoadedNative));

    index.attach_id_map(&paths.id_map).await.expect("attach");
    assert!(index.has_documents());
    assert_eq!(index.document(0).expect("document").title, VISA_TITLE);
    assert_eq!(index.stats().origin, Some(SnapshotOrigin::Loaded));
}

#[tokio::test]
async fn test_native_only_index_cannot_persist() {
    let source = TempDir::new().expect("tempdir");
    let target = TempDir::new().expect("tempdir");
    let embedder = stub_embedder();
    built_index(&sample_corpus(), embedder.as_ref())
        .await
        .persist(source.path())
        .expect("persist");

    let index = EmbeddingIndex::default();
    index.load_native(source.path()).await.expect("load native");

    assert!(matches!(
        index.persist(target.path()),
        Err(IndexError::Persistence(PersistenceError::DocumentsUnavailable))
    ));
}

#[tokio::test]
async fn test_persist_before_build() {
    let dir = TempDir::new().expect("tempdir");
    let index = EmbeddingIndex::default();
    assert!(matches!(index.persist(dir.path()), Err(IndexError::NotBuilt)));
}

#[tokio::test]
async fn test_load_missing_directory() {
    let dir = TempDir::new().expect("tempdir");
    let index = EmbeddingIndex::default();

    let result = index.load(dir.path().join("nothing-here")).await;
    assert!(matches!(
        result,
        Err(IndexError::Persistence(PersistenceError::MissingArtifact { .. }))
    ));
    assert_eq!(index.state(), IndexState::Empty);
}

#[tokio::test]
async fn test_truncated_id_map_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let embedder = stub_embedder();
    let original = built_index(&sample_corpus(), embedder.as_ref()).await;
    let paths = original.persist(dir.path()).expect("persist");

    let mut id_map: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(&paths.id_map).expect("read"))
            .expect("parse id map");
    id_map.remove("1");
    fs::write(&paths.id_map, serde_json::to_vec(&id_map).expect("encode")).expect("write");

    let index = EmbeddingIndex::default();
    assert!(matches!(
        index.load(dir.path()).await,
        Err(IndexError::Persistence(PersistenceError::IdMapMismatch { .. }))
    ));
}

#[tokio::test]
async fn test_failed_load_keeps_active_snapshot() {
    let good = TempDir::new().expect("tempdir");
    let bad = TempDir::new().expect("tempdir");
    let embedder = stub_embedder();
    let index = built_index(&sample_corpus(), embedder.as_ref()).await;
    index.persist(good.path()).expect("persist");

    fs::write(bad.path().join(NATIVE_INDEX_FILENAME), b"not an index").expect("write");
    fs::copy(
        good.path().join(ID_MAP_FILENAME),
        bad.path().join(ID_MAP_FILENAME),
    )
    .expect("copy id map");

    assert!(index.load(bad.path()).await.is_err());
    assert_eq!(index.state(), IndexState::Built);
    assert_eq!(index.stats().origin, Some(SnapshotOrigin::Built));
    assert_eq!(index.len(), 3);
}
