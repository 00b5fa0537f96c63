//! Errors from reading `SIEVE_*` settings.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name}='{value}' is not a whole number: {source}")]
    NumberParseError {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Parsed, but outside what the pipeline accepts.
    #[error("{name}='{value}' rejected: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("configured path {path} does not exist")]
    PathNotFound { path: PathBuf },

    #[error("configured path {path} exists but is not a directory")]
    NotADirectory { path: PathBuf },
}
