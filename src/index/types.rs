use std::fmt;

use chrono::{DateTime, Utc};

use crate::index::config::Metric;

/// Lifecycle of an [`EmbeddingIndex`](super::EmbeddingIndex).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    Empty,
    /// A build or load is running. Searches keep using the previous snapshot, if any.
    Building,
    Built,
}

impl fmt::Display for IndexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IndexState::Empty => "empty",
            IndexState::Building => "building",
            IndexState::Built => "built",
        };
        f.write_str(s)
    }
}

/// One search hit: corpus position and similarity (higher = more relevant).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub position: usize,
    pub score: f32,
}

/// Where the active snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOrigin {
    Built,
    Loaded,
    LoadedNative,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexStats {
    pub state: IndexState,
    pub documents: usize,
    pub dimension: Option<usize>,
    pub metric: Metric,
    pub has_documents: bool,
    pub origin: Option<SnapshotOrigin>,
    pub activated_at: Option<DateTime<Utc>>,
}
