use std::fmt;
use std::str::FromStr;

use crate::document::EncodeField;
use crate::index::error::{IndexError, IndexResult};

/// Similarity measure used for search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Metric {
    /// Dot product; equals cosine similarity for unit vectors.
    #[default]
    InnerProduct,
    /// Squared Euclidean distance, exposed negated so higher is better.
    L2,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::InnerProduct => "ip",
            Metric::L2 => "l2",
        }
    }

    /// Stable on-disk code.
    pub fn code(&self) -> u8 {
        match self {
            Metric::InnerProduct => 0,
            Metric::L2 => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Metric::InnerProduct),
            1 => Some(Metric::L2),
            _ => None,
        }
    }

    /// Similarity of two equal-length vectors; higher = more relevant.
    #[inline]
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::InnerProduct => a.iter().zip(b).map(|(x, y)| x * y).sum(),
            Metric::L2 => -a
                .iter()
                .zip(b)
                .map(|(x, y)| {
                    let d = x - y;
                    d * d
                })
                .sum::<f32>(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ip" | "inner_product" | "dot" | "cosine" => Ok(Metric::InnerProduct),
            "l2" | "euclidean" => Ok(Metric::L2),
            other => Err(format!("unknown metric '{}' (expected ip or l2)", other)),
        }
    }
}

/// How an [`EmbeddingIndex`](super::EmbeddingIndex) builds and scores.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexConfig {
    /// Document field encoded at build time.
    pub encode_field: EncodeField,
    pub metric: Metric,
    /// Documents per embedder call during a build.
    pub batch_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            encode_field: EncodeField::default(),
            metric: Metric::default(),
            batch_size: crate::constants::DEFAULT_BATCH_SIZE,
        }
    }
}

impl IndexConfig {
    pub fn new(encode_field: EncodeField) -> Self {
        Self {
            encode_field,
            ..Default::default()
        }
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn validate(&self) -> IndexResult<()> {
        if self.batch_size == 0 {
            return Err(IndexError::invalid("batch_size must be greater than zero"));
        }
        Ok(())
    }
}
