pub mod error;


pub use error::{MmapError, MmapResult};

use std::fs::File;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use memmap2::{Mmap, MmapOptions};
use rkyv::Portable;
use rkyv::api::high::{HighValidator, access};
use rkyv::bytecheck::CheckBytes;
use rkyv::rancor::Error as RkyvError;

pub const RKYV_ALIGNMENT: usize = 16;

/// Read-only memory map over a persisted artifact.
///
/// Cloning shares the mapping. The file must not be modified while mapped;
/// artifacts are only ever replaced by rename, which leaves existing mappings intact.
#[derive(Clone)]
pub struct MappedArtifact {
    inner: Arc<Mmap>,
    path: Arc<PathBuf>,
}

impl std::fmt::Debug for MappedArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedArtifact")
            .field("path", &self.path)
            .field("len", &self.len())
            .finish()
    }
}

impl MappedArtifact {
    pub fn open<P: AsRef<Path>>(path: P) -> MmapResult<Self> {
        Self::open_with(path, false)
    }

    /// Opens the artifact, optionally pre-faulting every page (`MAP_POPULATE`).
    pub fn open_with<P: AsRef<Path>>(path: P, populate: bool) -> MmapResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;

        if file.metadata()?.len() == 0 {
            return Err(MmapError::EmptyFile {
                path: path.to_path_buf(),
            });
        }

        let mut opts = MmapOptions::new();
        if populate {
            opts.populate();
        }

        // SAFETY: the file is opened read-only and artifacts are replaced by
        // rename, never rewritten in place.
        let mmap = unsafe { opts.map(&file)? };

        Ok(Self {
            inner: Arc::new(mmap),
            path: Arc::new(path.to_path_buf()),
        })
    }

    pub fn as_slice(&self) -> &[u8] {
        self.inner.deref()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validates and returns the archived root stored in the mapping.
    pub fn access_archived<T>(&self) -> MmapResult<&T>
    where
        T: Portable + for<'a> CheckBytes<HighValidator<'a, RkyvError>>,
    {
        let data = self.as_slice();

        if !(data.as_ptr() as usize).is_multiple_of(RKYV_ALIGNMENT) {
            return Err(MmapError::AlignmentError {
                alignment: RKYV_ALIGNMENT,
            });
        }

        access::<T, RkyvError>(data).map_err(|e| MmapError::ValidationFailed(format!("{:?}", e)))
    }
}
