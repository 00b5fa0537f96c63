use std::path::PathBuf;

use crate::scoring::error::ScorerError;

pub const MAX_SEQ_LEN: usize = crate::constants::CROSS_ENCODER_MAX_SEQ_LEN;

/// Configuration for [`CrossEncoder`](super::CrossEncoder). No model path means stub mode.
#[derive(Debug, Clone)]
pub struct CrossEncoderConfig {
    pub model_path: Option<PathBuf>,

    pub max_seq_len: usize,

    /// Pairs per forward pass.
    pub batch_size: usize,
}

impl Default for CrossEncoderConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            max_seq_len: MAX_SEQ_LEN,
            batch_size: crate::constants::DEFAULT_BATCH_SIZE,
        }
    }
}

impl CrossEncoderConfig {
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
            ..Default::default()
        }
    }

    pub fn stub() -> Self {
        Self::default()
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn validate(&self) -> Result<(), ScorerError> {
        if self.batch_size == 0 {
            return Err(ScorerError::InvalidConfig {
                reason: "batch_size must be greater than zero".to_string(),
            });
        }

        if self.max_seq_len == 0 {
            return Err(ScorerError::InvalidConfig {
                reason: "max_seq_len must be greater than zero".to_string(),
            });
        }

        if let Some(ref path) = self.model_path
            && path.as_os_str().is_empty()
        {
            return Err(ScorerError::InvalidConfig {
                reason: "model_path cannot be empty when provided".to_string(),
            });
        }

        Ok(())
    }
}
