//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `SIEVE_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::path::PathBuf;

use crate::constants::{DEFAULT_BATCH_SIZE, DEFAULT_RERANK_TOP_K, DEFAULT_RETRIEVAL_TOP_K};
use crate::document::EncodeField;
use crate::index::{IndexConfig, Metric};
use crate::rerank::RerankerConfig;

/// Pipeline configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `SIEVE_*` overrides on top of defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the persisted index artifacts. Default: `./.index`.
    pub index_path: PathBuf,

    /// Sentence-encoder model directory. Unset means the stub embedder.
    pub model_path: Option<PathBuf>,

    /// Cross-encoder model directory. Unset means the lexical stub scorer.
    pub reranker_path: Option<PathBuf>,

    /// Remote embedding server; takes precedence over `model_path`.
    pub embedder_url: Option<String>,

    /// Remote rerank server; takes precedence over `reranker_path`.
    pub reranker_url: Option<String>,

    /// Document field encoded into the index. Default: `title`.
    pub encode_field: EncodeField,

    /// Similarity metric. Default: inner product.
    pub metric: Metric,

    /// Candidates fetched from the index. Default: `20`.
    pub top_k: usize,

    /// Documents kept after reranking. Default: `5`.
    pub rerank_top_k: usize,

    /// Texts per embedder call during builds. Default: `32`.
    pub batch_size: usize,

    /// Reranked candidates must score above this. Unset keeps every candidate.
    pub rerank_min_score: Option<f32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("./.index"),
            model_path: None,
            reranker_path: None,
            embedder_url: None,
            reranker_url: None,
            encode_field: EncodeField::default(),
            metric: Metric::default(),
            top_k: DEFAULT_RETRIEVAL_TOP_K,
            rerank_top_k: DEFAULT_RERANK_TOP_K,
            batch_size: DEFAULT_BATCH_SIZE,
            rerank_min_score: None,
        }
    }
}

impl Config {
    pub const ENV_INDEX_PATH: &'static str = "SIEVE_INDEX_PATH";
    pub const ENV_MODEL_PATH: &'static str = "SIEVE_MODEL_PATH";
    pub const ENV_RERANKER_PATH: &'static str = "SIEVE_RERANKER_PATH";
    pub const ENV_EMBEDDER_URL: &'static str = "SIEVE_EMBEDDER_URL";
    pub const ENV_RERANKER_URL: &'static str = "SIEVE_RERANKER_URL";
    pub const ENV_ENCODE_FIELD: &'static str = "SIEVE_ENCODE_FIELD";
    pub const ENV_METRIC: &'static str = "SIEVE_METRIC";
    pub const ENV_TOP_K: &'static str = "SIEVE_TOP_K";
    pub const ENV_RERANK_TOP_K: &'static str = "SIEVE_RERANK_TOP_K";
    pub const ENV_BATCH_SIZE: &'static str = "SIEVE_BATCH_SIZE";
    pub const ENV_RERANK_MIN_SCORE: &'static str = "SIEVE_RERANK_MIN_SCORE";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let encode_field = match Self::parse_optional_string_from_env(Self::ENV_ENCODE_FIELD) {
            Some(value) => value.parse().map_err(|reason| ConfigError::InvalidValue {
                name: Self::ENV_ENCODE_FIELD,
                value,
                reason,
            })?,
            None => defaults.encode_field,
        };

        let metric = match Self::parse_optional_string_from_env(Self::ENV_METRIC) {
            Some(value) => value.parse().map_err(|reason| ConfigError::InvalidValue {
                name: Self::ENV_METRIC,
                value,
                reason,
            })?,
            None => defaults.metric,
        };

        let config = Self {
            index_path: Self::parse_path_from_env(Self::ENV_INDEX_PATH, defaults.index_path),
            model_path: Self::parse_optional_string_from_env(Self::ENV_MODEL_PATH)
                .map(PathBuf::from),
            reranker_path: Self::parse_optional_string_from_env(Self::ENV_RERANKER_PATH)
                .map(PathBuf::from),
            embedder_url: Self::parse_optional_string_from_env(Self::ENV_EMBEDDER_URL),
            reranker_url: Self::parse_optional_string_from_env(Self::ENV_RERANKER_URL),
            encode_field,
            metric,
            top_k: Self::parse_count_from_env(Self::ENV_TOP_K, defaults.top_k)?,
            rerank_top_k: Self::parse_count_from_env(
                Self::ENV_RERANK_TOP_K,
                defaults.rerank_top_k,
            )?,
            batch_size: Self::parse_count_from_env(Self::ENV_BATCH_SIZE, defaults.batch_size)?,
            rerank_min_score: Self::parse_score_from_env(Self::ENV_RERANK_MIN_SCORE)?,
        };

        Ok(config)
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.index_path.exists() && !self.index_path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.index_path.clone(),
            });
        }

        for path in [&self.model_path, &self.reranker_path].into_iter().flatten() {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if self.rerank_top_k > self.top_k {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_RERANK_TOP_K,
                value: self.rerank_top_k.to_string(),
                reason: format!("cannot exceed {} ({})", Self::ENV_TOP_K, self.top_k),
            });
        }

        Ok(())
    }

    /// Index settings derived from this configuration.
    pub fn index_config(&self) -> IndexConfig {
        IndexConfig::new(self.encode_field)
            .with_metric(self.metric)
            .with_batch_size(self.batch_size)
    }

    /// Reranker settings derived from this configuration.
    pub fn reranker_config(&self) -> RerankerConfig {
        RerankerConfig {
            min_score: self.rerank_min_score,
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        Self::parse_optional_string_from_env(var_name)
            .map(PathBuf::from)
            .unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Positive integer; zero is rejected.
    fn parse_count_from_env(var_name: &'static str, default: usize) -> Result<usize, ConfigError> {
        let Some(value) = Self::parse_optional_string_from_env(var_name) else {
            return Ok(default);
        };

        let parsed: usize = value.parse().map_err(|e| ConfigError::NumberParseError {
            name: var_name,
            value: value.clone(),
            source: e,
        })?;

        if parsed == 0 {
            return Err(ConfigError::InvalidValue {
                name: var_name,
                value,
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(parsed)
    }

    /// Finite float, or `None` when unset.
    fn parse_score_from_env(var_name: &'static str) -> Result<Option<f32>, ConfigError> {
        let Some(value) = Self::parse_optional_string_from_env(var_name) else {
            return Ok(None);
        };

        match value.parse::<f32>() {
            Ok(score) if score.is_finite() => Ok(Some(score)),
            Ok(_) => Err(ConfigError::InvalidValue {
                name: var_name,
                value,
                reason: "must be finite".to_string(),
            }),
            Err(e) => Err(ConfigError::InvalidValue {
                name: var_name,
                reason: e.to_string(),
                value,
            }),
        }
    }
}
