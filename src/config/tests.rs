use super::*;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_sieve_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var(Config::ENV_INDEX_PATH);
        env::remove_var(Config::ENV_MODEL_PATH);
        env::remove_var(Config::ENV_RERANKER_PATH);
        env::remove_var(Config::ENV_EMBEDDER_URL);
        env::remove_var(Config::ENV_RERANKER_URL);
        env::remove_var(Config::ENV_ENCODE_FIELD);
        env::remove_var(Config::ENV_METRIC);
        env::remove_var(Config::ENV_TOP_K);
        env::remove_var(Config::ENV_RERANK_TOP_K);
        env::remove_var(Config::ENV_BATCH_SIZE);
        env::remove_var(Config::ENV_RERANK_MIN_SCORE);
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.index_path, PathBuf::from("./.index"));
    assert!(config.model_path.is_none());
    assert!(config.reranker_path.is_none());
    assert_eq!(config.encode_field, EncodeField::Title);
    assert_eq!(config.metric, Metric::InnerProduct);
    assert_eq!(config.top_k, 20);
    assert_eq!(config.rerank_top_k, 5);
    assert_eq!(config.batch_size, 32);
    assert!(config.rerank_min_score.is_none());
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_sieve_env();

    let config = Config::from_env().expect("should parse with defaults");
    assert_eq!(config, Config::default());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_sieve_env();

    let config = with_env_vars(
        &[
            ("SIEVE_INDEX_PATH", "/tmp/sieve-index"),
            ("SIEVE_ENCODE_FIELD", "text"),
            ("SIEVE_METRIC", "l2"),
            ("SIEVE_TOP_K", "50"),
            ("SIEVE_RERANK_TOP_K", "10"),
            ("SIEVE_BATCH_SIZE", "8"),
            ("SIEVE_EMBEDDER_URL", "http://localhost:8081"),
        ],
        Config::from_env,
    )
    .expect("should parse overrides");

    assert_eq!(config.index_path, PathBuf::from("/tmp/sieve-index"));
    assert_eq!(config.encode_field, EncodeField::Text);
    assert_eq!(config.metric, Metric::L2);
    assert_eq!(config.top_k, 50);
    assert_eq!(config.rerank_top_k, 10);
    assert_eq!(config.batch_size, 8);
    assert_eq!(config.embedder_url.as_deref(), Some("http://localhost:8081"));
    assert!(config.reranker_url.is_none());
}

#[test]
#[serial]
fn test_blank_values_fall_back() {
    clear_sieve_env();

    let config = with_env_vars(
        &[("SIEVE_MODEL_PATH", "   "), ("SIEVE_TOP_K", "")],
        Config::from_env,
    )
    .expect("blank values are ignored");

    assert!(config.model_path.is_none());
    assert_eq!(config.top_k, 20);
}

#[test]
#[serial]
fn test_invalid_number() {
    clear_sieve_env();

    let result = with_env_vars(&[("SIEVE_TOP_K", "many")], Config::from_env);
    assert!(matches!(
        result,
        Err(ConfigError::NumberParseError {
            name: "SIEVE_TOP_K",
            ..
        })
    ));
}

#[test]
#[serial]
fn test_zero_count_rejected() {
    clear_sieve_env();

    let result = with_env_vars(&[("SIEVE_BATCH_SIZE", "0")], Config::from_env);
    assert!(matches!(
        result,
        Err(ConfigError::InvalidValue {
            name: "SIEVE_BATCH_SIZE",
            ..
        })
    ));
}

#[test]
#[serial]
fn test_unknown_encode_field_and_metric() {
    clear_sieve_env();

    let result = with_env_vars(&[("SIEVE_ENCODE_FIELD", "summary")], Config::from_env);
    assert!(matches!(
        result,
        Err(ConfigError::InvalidValue {
            name: "SIEVE_ENCODE_FIELD",
            ..
        })
    ));

    let result = with_env_vars(&[("SIEVE_METRIC", "manhattan")], Config::from_env);
    assert!(matches!(
        result,
        Err(ConfigError::InvalidValue {
            name: "SIEVE_METRIC",
            ..
        })
    ));
}

#[test]
fn test_index_config() {
    let config = Config {
        encode_field: EncodeField::FirstQuestion,
        metric: Metric::L2,
        batch_size: 4,
        ..Default::default()
    };

    let index_config = config.index_config();
    assert_eq!(index_config.encode_field, EncodeField::FirstQuestion);
    assert_eq!(index_config.metric, Metric::L2);
    assert_eq!(index_config.batch_size, 4);
}

#[test]
fn test_validate_defaults() {
    let dir = TempDir::new().expect("tempdir");
    let config = Config {
        index_path: dir.path().join("not-yet-created"),
        ..Default::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_index_path_is_file() {
    let dir = TempDir::new().expect("tempdir");
    let file = dir.path().join("index");
    std::fs::write(&file, b"x").expect("write");

    let config = Config {
        index_path: file,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotADirectory { .. })
    ));
}

#[test]
fn test_validate_missing_model_dir() {
    let dir = TempDir::new().expect("tempdir");
    let config = Config {
        index_path: dir.path().to_path_buf(),
        model_path: Some(dir.path().join("missing-model")),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::PathNotFound { .. })
    ));
}

#[test]
fn test_validate_rerank_depth() {
    let dir = TempDir::new().expect("tempdir");
    let config = Config {
        index_path: dir.path().to_path_buf(),
        top_k: 3,
        rerank_top_k: 5,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { .. })
    ));
}

#[test]
#[serial]
fn test_rerank_min_score_from_env() {
    clear_sieve_env();

    let config = with_env_vars(&[(Config::ENV_RERANK_MIN_SCORE, " 0.25 ")], || {
        Config::from_env().expect("config")
    });
    assert_eq!(config.rerank_min_score, Some(0.25));
    assert_eq!(config.reranker_config().min_score, Some(0.25));

    let result = with_env_vars(&[(Config::ENV_RERANK_MIN_SCORE, "not-a-number")], Config::from_env);
    assert!(matches!(
        result,
        Err(ConfigError::InvalidValue {
            name: "SIEVE_RERANK_MIN_SCORE",
            ..
        })
    ));

    let result = with_env_vars(&[(Config::ENV_RERANK_MIN_SCORE, "NaN")], Config::from_env);
    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}
