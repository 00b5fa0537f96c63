//! Staged artifact writes: everything goes to `*.tmp` first, then all files are
//! renamed into place together.


use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::storage::error::StorageError;

const TEMP_SUFFIX: &str = "tmp";

/// Collects staged files and publishes them with [`ArtifactWriter::commit`].
///
/// Dropping an uncommitted writer removes its temp files.
#[derive(Debug)]
pub struct ArtifactWriter {
    dir: PathBuf,
    staged: Vec<(PathBuf, PathBuf)>,
    committed: bool,
}

impl ArtifactWriter {
    /// Creates a writer rooted at `dir` (created if missing).
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| StorageError::Io {
            path: dir.clone(),
            source: e,
        })?;

        Ok(Self {
            dir,
            staged: Vec::new(),
            committed: false,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `data` to a temp sibling of `file_name` and fsyncs it.
    pub fn stage(&mut self, file_name: &str, data: &[u8]) -> Result<(), StorageError> {
        let final_path = self.dir.join(file_name);
        let temp_path = self.dir.join(format!("{}.{}", file_name, TEMP_SUFFIX));

        let write = || -> std::io::Result<()> {
            let mut file = File::create(&temp_path)?;
            file.write_all(data)?;
            file.sync_all()
        };
        write().map_err(|e| StorageError::WriteFailed {
            path: temp_path.clone(),
            source: e,
        })?;

        debug!(path = %temp_path.display(), bytes = data.len(), "Staged artifact");
        self.staged.push((temp_path, final_path));
        Ok(())
    }

    /// Renames every staged file into place and returns the final paths.
    pub fn commit(mut self) -> Result<Vec<PathBuf>, StorageError> {
        let mut published = Vec::with_capacity(self.staged.len());

        for (temp_path, final_path) in &self.staged {
            fs::rename(temp_path, final_path).map_err(|e| StorageError::Io {
                path: final_path.clone(),
                source: e,
            })?;
            published.push(final_path.clone());
        }

        self.committed = true;
        Ok(published)
    }
}

impl Drop for ArtifactWriter {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for (temp_path, _) in &self.staged {
            if temp_path.exists()
                && let Err(e) = fs::remove_file(temp_path)
            {
                warn!(path = %temp_path.display(), error = %e, "Failed to remove staged artifact");
            }
        }
    }
}
