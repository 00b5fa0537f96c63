//! Cross-cutting, shared constants.
//!
//! Defaults here are consumed by the component configs; prefer changing a config
//! value at runtime over editing a constant.

/// Output dimension of the stub embedder (matches MiniLM-class sentence encoders).
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Token budget for the sentence encoder.
pub const DEFAULT_MAX_SEQ_LEN: usize = 256;

/// Token budget for the (query, document) pair fed to the cross-encoder.
pub const CROSS_ENCODER_MAX_SEQ_LEN: usize = 512;

/// Texts per embedder call during index builds.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Candidates fetched from the index before reranking.
pub const DEFAULT_RETRIEVAL_TOP_K: usize = 20;

/// Documents kept after reranking.
pub const DEFAULT_RERANK_TOP_K: usize = 5;

/// Version stamped into the native index artifact.
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Raw row-major little-endian `f32` vectors.
pub const VECTORS_FILENAME: &str = "vectors.f32";

/// rkyv-archived native index structure.
pub const NATIVE_INDEX_FILENAME: &str = "index.rkyv";

/// Human-readable position -> document map.
pub const ID_MAP_FILENAME: &str = "id_map.json";
