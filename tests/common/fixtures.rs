//! Test fixtures for integration tests.

use std::sync::Arc;

use sieve::document::Document;
use sieve::embedding::{Embedder, SentenceEmbedder};
use sieve::index::{EmbeddingIndex, IndexConfig};

pub const VISA_TITLE: &str = "Student Visa Guide";
pub const HOLIDAY_TITLE: &str = "Working Holiday Guide";
pub const TAX_TITLE: &str = "Tax Return Basics";

/// The three-document corpus used throughout the pipeline tests.
pub fn sample_corpus() -> Vec<Document> {
    prefixed_corpus("doc")
}

/// Same titles as [`sample_corpus`], ids prefixed so snapshots can be told apart.
pub fn prefixed_corpus(prefix: &str) -> Vec<Document> {
    vec![
        Document::with_id(
            format!("{prefix}-visa"),
            VISA_TITLE,
            "How to apply for a student visa, including documents and processing times.",
        )
        .with_questions(["Which visa do I need to study abroad?"]),
        Document::with_id(
            format!("{prefix}-holiday"),
            HOLIDAY_TITLE,
            "Working holiday visas let young travellers work while they explore.",
        )
        .with_questions(["Can I work on a holiday visa?"]),
        Document::with_id(
            format!("{prefix}-tax"),
            TAX_TITLE,
            "Filing your first tax return: deadlines, deductions and forms.",
        )
        .with_questions(["When is the tax return deadline?"]),
    ]
}

pub fn stub_embedder() -> Arc<dyn Embedder> {
    Arc::new(SentenceEmbedder::stub().expect("stub embedder"))
}

/// Builds an index over `corpus` with the default (title) configuration.
pub async fn built_index(corpus: &[Document], embedder: &dyn Embedder) -> Arc<EmbeddingIndex> {
    let index = Arc::new(EmbeddingIndex::new(IndexConfig::default()));
    index.build(corpus, embedder).await.expect("build index");
    index
}

pub fn titles(documents: &[Arc<Document>]) -> Vec<&str> {
    documents.iter().map(|d| d.title.as_str()).collect()
}
