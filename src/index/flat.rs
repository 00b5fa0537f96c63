//! Row-major vector storage with exact top-k search.

use std::cmp::Ordering;

use crate::index::config::Metric;
use crate::index::types::SearchHit;

/// Dense `count x dimension` matrix of `f32`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatVectors {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatVectors {
    /// Wraps row-major data. Returns `None` unless `dimension > 0` and the
    /// data length is a multiple of it.
    pub fn new(dimension: usize, data: Vec<f32>) -> Option<Self> {
        if dimension == 0 || !data.len().is_multiple_of(dimension) {
            return None;
        }
        Some(Self { dimension, data })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn row(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dimension)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Little-endian byte image of the matrix.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    /// Inverse of [`FlatVectors::to_le_bytes`].
    pub fn from_le_bytes(bytes: &[u8], dimension: usize) -> Option<Self> {
        if !bytes.len().is_multiple_of(4) {
            return None;
        }
        let data = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Self::new(dimension, data)
    }

    /// Exact top-k by brute force: score desc, ties by position asc.
    ///
    /// `query.len()` must equal [`dimension`](Self::dimension).
    pub fn top_k(&self, query: &[f32], metric: Metric, k: usize) -> Vec<SearchHit> {
        let mut hits: Vec<SearchHit> = self
            .rows()
            .enumerate()
            .map(|(position, row)| SearchHit {
                position,
                score: metric.score(query, row),
            })
            .collect();

        let k = k.min(hits.len());
        if k == 0 {
            return Vec::new();
        }

        if k < hits.len() {
            hits.select_nth_unstable_by(k - 1, rank_order);
            hits.truncate(k);
        }
        hits.sort_unstable_by(rank_order);
        hits
    }
}

/// Scores are finite here, so `partial_cmp` is total and `-0.0 == 0.0`.
#[inline]
fn rank_order(a: &SearchHit, b: &SearchHit) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.position.cmp(&b.position))
}
