use std::path::PathBuf;
use thiserror::Error;

use crate::document::EncodeField;
use crate::embedding::EmbeddingError;
use crate::storage::{MmapError, StorageError};

/// Failures reading or writing index artifacts.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing index artifact: {path}")]
    MissingArtifact { path: PathBuf },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Mmap(#[from] MmapError),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("invalid id map JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("vector checksum mismatch in {path}")]
    ChecksumMismatch { path: PathBuf },

    #[error("unsupported index format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("corrupt artifact {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("id map does not match index: {reason}")]
    IdMapMismatch { reason: String },

    #[error("index has no documents loaded; attach an id map before persisting")]
    DocumentsUnavailable,
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("cannot build an index from an empty corpus")]
    EmptyCorpus,

    #[error("duplicate document id '{id}' at positions {first} and {second}")]
    DuplicateDocumentId {
        id: String,
        first: usize,
        second: usize,
    },

    #[error("document '{document_id}' has no {field} to encode")]
    MissingField {
        document_id: String,
        field: EncodeField,
    },

    #[error("dimension mismatch: expected {expected}, got {actual} (position: {position:?})")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        position: Option<usize>,
    },

    #[error("index has not been built")]
    NotBuilt,

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("embedder failed while {context}: {source}")]
    Capability {
        context: String,
        #[source]
        source: EmbeddingError,
    },

    #[error("embedder returned a malformed vector for document '{document_id}': {reason}")]
    MalformedEmbedding { document_id: String, reason: String },
}

impl IndexError {
    /// `true` when the embedding capability failed or misbehaved.
    pub fn is_capability(&self) -> bool {
        matches!(
            self,
            IndexError::Capability { .. } | IndexError::MalformedEmbedding { .. }
        )
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        IndexError::InvalidArgument {
            reason: reason.into(),
        }
    }
}

pub type IndexResult<T> = Result<T, IndexError>;
