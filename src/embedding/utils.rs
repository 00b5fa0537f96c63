use std::path::Path;

use tokenizers::{PaddingParams, Tokenizer, TruncationParams};

use super::error::EmbeddingError;

pub const TOKENIZER_FILENAME: &str = "tokenizer.json";

/// Loads `tokenizer.json` from a file path.
pub fn load_tokenizer(path: &Path) -> Result<Tokenizer, EmbeddingError> {
    Tokenizer::from_file(path).map_err(|e| EmbeddingError::TokenizationFailed {
        reason: format!("failed to load tokenizer {}: {}", path.display(), e),
    })
}

/// Loads the tokenizer from `model_dir`, truncating inputs to `max_len` tokens.
pub fn load_tokenizer_with_truncation(
    model_dir: &Path,
    max_len: usize,
) -> Result<Tokenizer, EmbeddingError> {
    let mut tokenizer = load_tokenizer(&model_dir.join(TOKENIZER_FILENAME))?;

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: max_len,
            ..Default::default()
        }))
        .map_err(|e| EmbeddingError::TokenizationFailed {
            reason: e.to_string(),
        })?;

    Ok(tokenizer)
}

/// Like [`load_tokenizer_with_truncation`], and pads each batch to its longest member.
pub fn load_batch_tokenizer(model_dir: &Path, max_len: usize) -> Result<Tokenizer, EmbeddingError> {
    let mut tokenizer = load_tokenizer_with_truncation(model_dir, max_len)?;
    tokenizer.with_padding(Some(PaddingParams::default()));
    Ok(tokenizer)
}

/// Scales `vector` to unit length in place; a zero vector is left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_normalize_unit_length() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_l2_normalize_zero_vector() {
        let mut v = vec![0.0; 4];
        l2_normalize(&mut v);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_l2_normalize_idempotent() {
        let mut v = vec![1.0, 2.0, 2.0];
        l2_normalize(&mut v);
        let once = v.clone();
        l2_normalize(&mut v);
        for (a, b) in once.iter().zip(&v) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_load_tokenizer_missing_file() {
        let result = load_tokenizer(Path::new("/nonexistent/tokenizer.json"));
        assert!(matches!(
            result,
            Err(EmbeddingError::TokenizationFailed { .. })
        ));
    }
}
