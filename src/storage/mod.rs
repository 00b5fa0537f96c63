//! Storage primitives for index artifacts (staged writes and mmap reads).

pub mod error;
pub mod mmap;
pub mod writer;

pub use error::StorageError;
pub use mmap::{MappedArtifact, MmapError, MmapResult};
pub use writer::ArtifactWriter;
