use std::sync::Arc;

use crate::document::Document;

/// One retrieved candidate. Higher `score` = more relevant.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Corpus position in the index.
    pub position: usize,
    pub score: f32,
    pub document: Arc<Document>,
}

impl SearchResult {
    pub fn new(position: usize, score: f32, document: Arc<Document>) -> Self {
        Self {
            position,
            score,
            document,
        }
    }

    pub fn id(&self) -> &str {
        &self.document.id
    }
}
