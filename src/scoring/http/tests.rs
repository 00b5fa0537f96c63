use super::*;

#[test]
fn test_parse_restores_input_order() {
    let body = r#"[{"index": 2, "score": 0.9}, {"index": 0, "score": 0.5}, {"index": 1, "score": 0.1}]"#;
    let scores = parse_rerank_response(body, 3).expect("parse");
    assert_eq!(scores, vec![0.5, 0.1, 0.9]);
}

#[test]
fn test_parse_rejects_missing_entries() {
    let body = r#"[{"index": 0, "score": 0.5}]"#;
    assert!(matches!(
        parse_rerank_response(body, 2),
        Err(ScorerError::MalformedResponse { .. })
    ));
}

#[test]
fn test_parse_rejects_duplicate_index() {
    let body = r#"[{"index": 0, "score": 0.5}, {"index": 0, "score": 0.4}]"#;
    assert!(matches!(
        parse_rerank_response(body, 2),
        Err(ScorerError::MalformedResponse { .. })
    ));
}

#[test]
fn test_parse_rejects_out_of_range_index() {
    let body = r#"[{"index": 5, "score": 0.5}]"#;
    assert!(parse_rerank_response(body, 1).is_err());
}

#[test]
fn test_config_validation() {
    assert!(HttpScorerConfig::new("http://localhost:8081/").validate().is_ok());
    assert!(HttpScorerConfig::new("tcp://localhost").validate().is_err());
    assert!(
        HttpScorerConfig::new("http://localhost")
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err()
    );
}

#[test]
fn test_rerank_url() {
    let config = HttpScorerConfig::new("http://localhost:8081/");
    assert_eq!(config.rerank_url(), "http://localhost:8081/rerank");
}

#[tokio::test]
async fn test_empty_batch_skips_request() {
    let scorer = HttpCrossScorer::new(HttpScorerConfig::new("http://127.0.0.1:9")).expect("client");
    let scores = scorer.score_batch("q", &[]).await.expect("score batch");
    assert!(scores.is_empty());
}

#[tokio::test]
async fn test_unreachable_server_is_http_error() {
    let scorer = HttpCrossScorer::new(
        HttpScorerConfig::new("http://127.0.0.1:9").with_timeout(Duration::from_secs(2)),
    )
    .expect("client");
    let result = scorer.score("q", "text").await;
    assert!(matches!(result, Err(ScorerError::Http { .. })));
}
