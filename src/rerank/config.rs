use crate::rerank::error::{RerankError, RerankResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RerankerConfig {
    /// Drop candidates whose cross score does not exceed this value.
    pub min_score: Option<f32>,
}

impl RerankerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }

    pub fn validate(&self) -> RerankResult<()> {
        if let Some(min) = self.min_score
            && !min.is_finite()
        {
            return Err(RerankError::InvalidArgument {
                reason: format!("min_score must be finite, got {}", min),
            });
        }
        Ok(())
    }
}
