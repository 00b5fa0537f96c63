use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MmapError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot mmap empty file: {path}")]
    EmptyFile { path: PathBuf },

    #[error("rkyv validation failed: {0}")]
    ValidationFailed(String),

    #[error("mapping is not aligned to {alignment} bytes")]
    AlignmentError { alignment: usize },
}

pub type MmapResult<T> = Result<T, MmapError>;
