//! On-disk index artifacts.
//!
//! A persisted index directory holds:
//! - `vectors.f32`: raw row-major little-endian vectors;
//! - `index.rkyv`: [`NativeIndex`] (version, metric, shape, checksum, vectors);
//! - `id_map.json`: `{"0": {document}, "1": {document}, ...}`.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rkyv::rancor::Error as RkyvError;
use rkyv::{Archive, Deserialize, Serialize};
use tracing::debug;

use crate::constants::{
    ID_MAP_FILENAME, INDEX_FORMAT_VERSION, NATIVE_INDEX_FILENAME, VECTORS_FILENAME,
};
use crate::document::Document;
use crate::hashing::checksum;
use crate::index::config::Metric;
use crate::index::error::{PersistenceError, PersistenceResult};
use crate::index::flat::FlatVectors;
use crate::storage::{ArtifactWriter, MappedArtifact};

/// Native index structure, archived with rkyv.
#[derive(Archive, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NativeIndex {
    pub version: u32,
    pub metric: u8,
    pub dimension: u32,
    pub count: u64,
    /// BLAKE3 of the little-endian vector bytes.
    pub checksum: [u8; 32],
    pub vectors: Vec<f32>,
}

/// File locations of the three artifacts inside an index directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub vectors: PathBuf,
    pub native: PathBuf,
    pub id_map: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            vectors: dir.join(VECTORS_FILENAME),
            native: dir.join(NATIVE_INDEX_FILENAME),
            id_map: dir.join(ID_MAP_FILENAME),
        }
    }
}

/// Writes all three artifacts; nothing is renamed into place unless every
/// artifact was staged.
pub fn write_artifacts(
    dir: &Path,
    vectors: &FlatVectors,
    metric: Metric,
    documents: &[Arc<Document>],
) -> PersistenceResult<ArtifactPaths> {
    if documents.len() != vectors.len() {
        return Err(PersistenceError::IdMapMismatch {
            reason: format!(
                "{} documents for {} vectors",
                documents.len(),
                vectors.len()
            ),
        });
    }

    let raw = vectors.to_le_bytes();
    let native = NativeIndex {
        version: INDEX_FORMAT_VERSION,
        metric: metric.code(),
        dimension: vectors.dimension() as u32,
        count: vectors.len() as u64,
        checksum: checksum(&raw),
        vectors: vectors.as_slice().to_vec(),
    };
    let native_bytes = rkyv::to_bytes::<RkyvError>(&native)
        .map_err(|e| PersistenceError::Serialization(format!("{:?}", e)))?;

    let id_map: BTreeMap<usize, &Document> = documents
        .iter()
        .enumerate()
        .map(|(position, doc)| (position, doc.as_ref()))
        .collect();
    let id_map_bytes = serde_json::to_vec_pretty(&id_map)
        .map_err(|e| PersistenceError::Serialization(e.to_string()))?;

    let mut writer = ArtifactWriter::new(dir)?;
    writer.stage(VECTORS_FILENAME, &raw)?;
    writer.stage(NATIVE_INDEX_FILENAME, &native_bytes)?;
    writer.stage(ID_MAP_FILENAME, &id_map_bytes)?;
    writer.commit()?;

    debug!(
        dir = %dir.display(),
        count = vectors.len(),
        dimension = vectors.dimension(),
        "Index artifacts written"
    );

    Ok(ArtifactPaths::in_dir(dir))
}

fn require_file(path: &Path) -> PersistenceResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PersistenceError::MissingArtifact {
            path: path.to_path_buf(),
        })
    }
}

/// Reads and validates the native structure.
pub fn read_native(path: &Path) -> PersistenceResult<(Metric, FlatVectors)> {
    require_file(path)?;

    let artifact = MappedArtifact::open(path)?;
    let archived = artifact.access_archived::<ArchivedNativeIndex>()?;
    let native = rkyv::deserialize::<NativeIndex, RkyvError>(archived)
        .map_err(|e| PersistenceError::Serialization(format!("{:?}", e)))?;

    if native.version != INDEX_FORMAT_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: native.version,
            expected: INDEX_FORMAT_VERSION,
        });
    }

    let corrupt = |reason: String| PersistenceError::Corrupt {
        path: path.to_path_buf(),
        reason,
    };

    let metric = Metric::from_code(native.metric)
        .ok_or_else(|| corrupt(format!("unknown metric code {}", native.metric)))?;

    let dimension = native.dimension as usize;
    let expected_len = (native.count as usize)
        .checked_mul(dimension)
        .ok_or_else(|| corrupt("vector shape overflows".to_string()))?;
    if native.count == 0 || expected_len != native.vectors.len() {
        return Err(corrupt(format!(
            "header says {} x {} but {} values are stored",
            native.count,
            dimension,
            native.vectors.len()
        )));
    }

    let vectors = FlatVectors::new(dimension, native.vectors)
        .ok_or_else(|| corrupt("zero dimension".to_string()))?;

    if checksum(&vectors.to_le_bytes()) != native.checksum {
        return Err(PersistenceError::ChecksumMismatch {
            path: path.to_path_buf(),
        });
    }

    Ok((metric, vectors))
}

/// Reads the raw vector artifact on its own.
pub fn read_raw_vectors(path: &Path, dimension: usize) -> PersistenceResult<FlatVectors> {
    require_file(path)?;

    let bytes = std::fs::read(path).map_err(|e| PersistenceError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    FlatVectors::from_le_bytes(&bytes, dimension).ok_or_else(|| PersistenceError::Corrupt {
        path: path.to_path_buf(),
        reason: format!(
            "{} bytes is not a whole number of {}-dimensional f32 rows",
            bytes.len(),
            dimension
        ),
    })
}

/// Reads the id map and checks it is a bijection onto `0..expected_len`
/// with unique document ids.
pub fn read_id_map(path: &Path, expected_len: usize) -> PersistenceResult<Vec<Arc<Document>>> {
    require_file(path)?;

    let content = std::fs::read_to_string(path).map_err(|e| PersistenceError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let raw: BTreeMap<String, Document> =
        serde_json::from_str(&content).map_err(|e| PersistenceError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;

    if raw.len() != expected_len {
        return Err(PersistenceError::IdMapMismatch {
            reason: format!("{} entries for {} vectors", raw.len(), expected_len),
        });
    }

    let mut slots: Vec<Option<Arc<Document>>> = vec![None; expected_len];
    let mut seen_ids: HashMap<String, usize> = HashMap::with_capacity(expected_len);

    for (key, document) in raw {
        let position = key
            .parse::<usize>()
            .ok()
            .filter(|p| p.to_string() == key && *p < expected_len)
            .ok_or_else(|| PersistenceError::IdMapMismatch {
                reason: format!("invalid position key '{}'", key),
            })?;

        if let Some(first) = seen_ids.insert(document.id.clone(), position) {
            return Err(PersistenceError::IdMapMismatch {
                reason: format!(
                    "document id '{}' appears at positions {} and {}",
                    document.id, first, position
                ),
            });
        }

        slots[position] = Some(Arc::new(document));
    }

    // Keys are distinct canonical integers below `expected_len` and there are
    // exactly `expected_len` of them, so every slot is filled.
    Ok(slots.into_iter().flatten().collect())
}
