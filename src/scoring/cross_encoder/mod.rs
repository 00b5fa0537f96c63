//! Local cross-encoder: a BERT sequence classifier over `(query, text)` pairs.
//!
//! Without a model path the encoder runs in stub mode and scores pairs by
//! lexical overlap, which keeps ordering tests meaningful without weights.

pub mod config;

#[cfg(test)]
mod tests;

pub use config::{CrossEncoderConfig, MAX_SEQ_LEN};

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::embedding::bert::{BertClassifier, CONFIG_FILENAME, WEIGHTS_FILENAME};
use crate::embedding::device::select_device;
use crate::embedding::utils::load_batch_tokenizer;
use crate::scoring::error::ScorerError;
use crate::scoring::traits::CrossScorer;

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "do", "does", "did", "to", "of",
    "in", "for", "on", "with", "at", "by", "from", "as", "and", "or", "but", "if", "how", "what",
    "which", "who", "when", "where", "why", "can", "i", "my", "it", "its", "this", "that",
];

struct LoadedModel {
    model: BertClassifier,
    tokenizer: Tokenizer,
    device: Device,
}

pub struct CrossEncoder {
    config: CrossEncoderConfig,
    loaded: Option<Arc<LoadedModel>>,
}

impl std::fmt::Debug for CrossEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossEncoder")
            .field(
                "device",
                &self.loaded.as_ref().map(|m| format!("{:?}", m.device)),
            )
            .field("config", &self.config)
            .field("model_loaded", &self.is_model_loaded())
            .finish()
    }
}

impl CrossEncoder {
    pub fn load(config: CrossEncoderConfig) -> Result<Self, ScorerError> {
        config.validate()?;

        let Some(model_path) = config.model_path.clone() else {
            warn!("No cross-encoder model path configured, operating in stub mode");
            return Ok(Self {
                config,
                loaded: None,
            });
        };

        if !model_path.is_dir() {
            return Err(ScorerError::ModelNotFound { path: model_path });
        }

        for required in [CONFIG_FILENAME, WEIGHTS_FILENAME] {
            if !model_path.join(required).is_file() {
                return Err(ScorerError::ModelLoadFailed {
                    reason: format!("Missing {} in {}", required, model_path.display()),
                });
            }
        }

        let device = select_device()?;
        debug!(?device, "Selected compute device for cross-encoder");

        info!(model_path = %model_path.display(), "Loading cross-encoder model");

        let model = BertClassifier::load(&model_path, &device).map_err(|e| {
            ScorerError::ModelLoadFailed {
                reason: format!("Failed to load BERT classifier: {}", e),
            }
        })?;
        let tokenizer = load_batch_tokenizer(&model_path, config.max_seq_len)?;

        info!(
            max_seq_len = config.max_seq_len,
            "Cross-encoder model loaded successfully"
        );

        Ok(Self {
            config,
            loaded: Some(Arc::new(LoadedModel {
                model,
                tokenizer,
                device,
            })),
        })
    }

    pub fn stub() -> Result<Self, ScorerError> {
        Self::load(CrossEncoderConfig::stub())
    }

    pub fn is_model_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn config(&self) -> &CrossEncoderConfig {
        &self.config
    }

    /// Scores a batch of texts against one query, preserving input order.
    pub fn score_pairs(&self, query: &str, texts: &[&str]) -> Result<Vec<f32>, ScorerError> {
        debug!(
            query_len = query.len(),
            num_candidates = texts.len(),
            model_loaded = self.is_model_loaded(),
            "Scoring query-candidate pairs"
        );

        let Some(loaded) = &self.loaded else {
            return Ok(texts
                .iter()
                .map(|text| lexical_score(query, text))
                .collect());
        };

        model_scores(loaded, query, texts, self.config.batch_size)
    }
}

fn model_scores(
    loaded: &LoadedModel,
    query: &str,
    texts: &[&str],
    batch_size: usize,
) -> Result<Vec<f32>, ScorerError> {
    let mut scores = Vec::with_capacity(texts.len());
    for chunk in texts.chunks(batch_size) {
        scores.extend(forward_pairs(loaded, query, chunk)?);
    }
    Ok(scores)
}

fn forward_pairs(
    loaded: &LoadedModel,
    query: &str,
    texts: &[&str],
) -> Result<Vec<f32>, ScorerError> {
    let pairs: Vec<(&str, &str)> = texts.iter().map(|text| (query, *text)).collect();
    let encodings =
        loaded
            .tokenizer
            .encode_batch(pairs, true)
            .map_err(|e| ScorerError::TokenizationFailed {
                reason: e.to_string(),
            })?;

    let batch = encodings.len();
    let seq_len = encodings.first().map(|e| e.get_ids().len()).unwrap_or(0);

    let mut ids = Vec::with_capacity(batch * seq_len);
    let mut type_ids = Vec::with_capacity(batch * seq_len);
    let mut mask = Vec::with_capacity(batch * seq_len);
    for encoding in &encodings {
        ids.extend_from_slice(encoding.get_ids());
        type_ids.extend_from_slice(encoding.get_type_ids());
        mask.extend_from_slice(encoding.get_attention_mask());
    }

    let ids = Tensor::from_vec(ids, (batch, seq_len), &loaded.device)?;
    let type_ids = Tensor::from_vec(type_ids, (batch, seq_len), &loaded.device)?;
    let mask = Tensor::from_vec(mask, (batch, seq_len), &loaded.device)?;

    let logits = loaded
        .model
        .forward(&ids, &type_ids, Some(&mask))
        .map_err(|e| ScorerError::InferenceFailed {
            reason: e.to_string(),
        })?;

    Ok(logits.flatten_all()?.to_vec1::<f32>()?)
}

fn content_words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Recall/Jaccard blend of content words, squashed into (0, 1).
fn lexical_score(query: &str, text: &str) -> f32 {
    let query_words = content_words(query);
    if query_words.is_empty() {
        return 0.0;
    }
    let text_words = content_words(text);

    let shared = query_words.intersection(&text_words).count() as f32;
    let recall = shared / query_words.len() as f32;
    let union = query_words.union(&text_words).count() as f32;
    let jaccard = if union > 0.0 { shared / union } else { 0.0 };

    let blended = 0.6 * recall + 0.4 * jaccard;
    1.0 / (1.0 + (-8.0 * (blended - 0.5)).exp())
}

#[async_trait]
impl CrossScorer for CrossEncoder {
    fn name(&self) -> &str {
        if self.is_model_loaded() {
            "cross-encoder"
        } else {
            "cross-encoder-stub"
        }
    }

    async fn score(&self, query: &str, text: &str) -> Result<f32, ScorerError> {
        let mut scores = self.score_batch(query, &[text]).await?;
        scores.pop().ok_or_else(|| ScorerError::InferenceFailed {
            reason: "cross-encoder produced no score".to_string(),
        })
    }

    async fn score_batch(&self, query: &str, texts: &[&str]) -> Result<Vec<f32>, ScorerError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        let Some(loaded) = &self.loaded else {
            return self.score_pairs(query, texts);
        };

        debug!(
            query_len = query.len(),
            num_candidates = texts.len(),
            "Scoring query-candidate pairs on blocking pool"
        );

        let loaded = Arc::clone(loaded);
        let batch_size = self.config.batch_size;
        let query = query.to_string();
        let texts: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        tokio::task::spawn_blocking(move || {
            let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
            model_scores(&loaded, &query, &refs, batch_size)
        })
        .await
        .map_err(|e| ScorerError::InferenceFailed {
            reason: format!("scoring task failed: {}", e),
        })?
    }
}
