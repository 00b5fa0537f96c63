use super::*;

#[test]
fn test_config_default_is_stub() {
    let config = CrossEncoderConfig::default();
    assert!(config.model_path.is_none());
    assert_eq!(config.max_seq_len, MAX_SEQ_LEN);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_empty_path_rejected() {
    let config = CrossEncoderConfig::new("");
    assert!(matches!(
        config.validate(),
        Err(ScorerError::InvalidConfig { .. })
    ));
}

#[test]
fn test_config_zero_batch_rejected() {
    let config = CrossEncoderConfig::stub().with_batch_size(0);
    assert!(config.validate().is_err());
}

#[test]
fn test_stub_loads() {
    let encoder = CrossEncoder::stub().expect("stub should load");
    assert!(!encoder.is_model_loaded());
    assert_eq!(encoder.name(), "cross-encoder-stub");
    assert!(format!("{:?}", encoder).contains("CrossEncoder"));
}

#[test]
fn test_missing_model_dir() {
    let result = CrossEncoder::load(CrossEncoderConfig::new("/nonexistent/cross-encoder"));
    assert!(matches!(result, Err(ScorerError::ModelNotFound { .. })));
}

#[test]
fn test_model_dir_without_weights() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("config.json"), "{}").expect("write config");
    let result = CrossEncoder::load(CrossEncoderConfig::new(dir.path()));
    assert!(matches!(result, Err(ScorerError::ModelLoadFailed { .. })));
}

#[test]
fn test_lexical_score_prefers_overlap() {
    let related = lexical_score("renew student visa", "How to renew your student visa online");
    let unrelated = lexical_score("renew student visa", "Filing income tax returns");
    assert!(related > unrelated);
    assert!((0.0..=1.0).contains(&related));
}

#[test]
fn test_lexical_score_stop_words_only() {
    assert_eq!(lexical_score("what is the", "anything at all"), 0.0);
}

#[tokio::test]
async fn test_score_batch_matches_single_scores() {
    let encoder = CrossEncoder::stub().expect("stub should load");
    let texts = ["student visa guide", "tax filing", "visa fees"];
    let batch = encoder
        .score_batch("student visa", &texts)
        .await
        .expect("score batch");
    assert_eq!(batch.len(), 3);

    for (text, expected) in texts.iter().zip(&batch) {
        let single = encoder.score("student visa", text).await.expect("score");
        assert_eq!(single, *expected);
    }
}

#[tokio::test]
async fn test_score_batch_empty() {
    let encoder = CrossEncoder::stub().expect("stub should load");
    let scores = encoder.score_batch("query", &[]).await.expect("score batch");
    assert!(scores.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_scoring_matches_sequential() {
    let encoder = Arc::new(CrossEncoder::stub().expect("stub should load"));
    let texts = ["student visa guide", "tax filing", "visa fees"];
    let expected = encoder.score_pairs("student visa", &texts).expect("score pairs");

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let encoder = Arc::clone(&encoder);
            tokio::spawn(async move { encoder.score_batch("student visa", &texts).await })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.expect("join").expect("score batch"), expected);
    }
}
