use super::*;
use tempfile::TempDir;

#[test]
fn test_new_generates_unique_ids() {
    let a = Document::new("Student Visa Guide", "body");
    let b = Document::new("Student Visa Guide", "body");

    assert!(!a.id.is_empty());
    assert_ne!(a.id, b.id);
    assert!(uuid::Uuid::parse_str(&a.id).is_ok());
}

#[test]
fn test_encoding_text_selects_field() {
    let doc = Document::with_id("d1", "Title", "Body text")
        .with_questions(["How do I apply?", "Second question"]);

    assert_eq!(doc.encoding_text(EncodeField::Title), Some("Title"));
    assert_eq!(doc.encoding_text(EncodeField::Text), Some("Body text"));
    assert_eq!(
        doc.encoding_text(EncodeField::FirstQuestion),
        Some("How do I apply?")
    );
}

#[test]
fn test_encoding_text_blank_is_missing() {
    let doc = Document::with_id("d1", "   ", "");

    assert_eq!(doc.encoding_text(EncodeField::Title), None);
    assert_eq!(doc.encoding_text(EncodeField::Text), None);
    assert_eq!(doc.encoding_text(EncodeField::FirstQuestion), None);
}

#[test]
fn test_encoding_text_blank_first_question_is_missing() {
    let doc = Document::with_id("d1", "Title", "Body").with_questions(["", "later"]);

    assert_eq!(doc.encoding_text(EncodeField::FirstQuestion), None);
}

#[test]
fn test_summary_truncates_on_char_boundary() {
    let doc = Document::with_id("d1", "t", "héllo wörld");

    assert_eq!(doc.summary(5), "héllo...");
    assert_eq!(doc.summary(100), "héllo wörld");
    assert_eq!(doc.summary(11), "héllo wörld");
}

#[test]
fn test_encode_field_from_str() {
    assert_eq!("title".parse::<EncodeField>(), Ok(EncodeField::Title));
    assert_eq!(" TEXT ".parse::<EncodeField>(), Ok(EncodeField::Text));
    assert_eq!("raw_text".parse::<EncodeField>(), Ok(EncodeField::RawText));
    assert_eq!(
        "question".parse::<EncodeField>(),
        Ok(EncodeField::FirstQuestion)
    );
    assert!("body".parse::<EncodeField>().is_err());
}

#[test]
fn test_encode_field_display_roundtrips() {
    for field in [
        EncodeField::Title,
        EncodeField::Text,
        EncodeField::RawText,
        EncodeField::FirstQuestion,
    ] {
        assert_eq!(field.to_string().parse::<EncodeField>(), Ok(field));
    }
}

#[test]
fn test_json_is_flat_and_complete() {
    let doc = Document::with_id("d1", "Title", "Body").with_metadata(DocumentMetadata {
        source: Some("gov".to_string()),
        tags: vec!["visa".to_string()],
        ..Default::default()
    });

    let value = serde_json::to_value(&doc).expect("serialize");

    assert_eq!(value["id"], "d1");
    assert_eq!(value["source"], "gov");
    assert_eq!(value["tags"][0], "visa");
    assert!(value.get("metadata").is_none());
    assert!(value.get("author").is_some());
    assert!(value["link"].is_null());
}

#[test]
fn test_json_accepts_legacy_aliases() {
    let json = r#"{
        "id": "a-1",
        "title": "Tax Return Basics",
        "text": "Lodge before October.",
        "post_date": "2024-07-01",
        "created_at": "2024-07-02T10:00:00Z",
        "questions": ["When is tax due?"]
    }"#;

    let doc = Document::from_json_str(json).expect("parse");

    assert_eq!(doc.metadata.published_at.as_deref(), Some("2024-07-01"));
    assert_eq!(
        doc.metadata.ingested_at.map(|t| t.to_rfc3339()),
        Some("2024-07-02T10:00:00+00:00".to_string())
    );
    assert_eq!(doc.questions, vec!["When is tax due?".to_string()]);
}

#[test]
fn test_json_accepts_article_record_with_nulls() {
    let json = r#"{"id": null, "questions": null, "raw_text": "Apply online through ImmiAccount.", "text": null, "source": "homeaffairs.gov.au", "title": "How to apply for a student visa", "author": null, "post_date": "12 March 2024", "language": "en", "created_at": "2024-03-14 09:30:00", "tags": null, "link": "https://immi.homeaffairs.gov.au/"}"#;

    let doc = Document::from_json_str(json).expect("parse");

    assert!(uuid::Uuid::parse_str(&doc.id).is_ok());
    assert!(doc.questions.is_empty());
    assert!(doc.text.is_empty());
    assert!(doc.metadata.tags.is_empty());
    assert_eq!(doc.raw_text, "Apply online through ImmiAccount.");
    assert_eq!(doc.rerank_text(), "Apply online through ImmiAccount.");
    assert_eq!(
        doc.encoding_text(EncodeField::RawText),
        Some("Apply online through ImmiAccount.")
    );
    assert_eq!(doc.metadata.published_at.as_deref(), Some("12 March 2024"));
    assert_eq!(
        doc.metadata.ingested_at.map(|t| t.to_rfc3339()),
        Some("2024-03-14T09:30:00+00:00".to_string())
    );
}

#[test]
fn test_json_free_form_created_at_is_tolerated() {
    let year_only = Document::from_json_str(r#"{"title": "T", "created_at": "2024"}"#)
        .expect("parse year");
    assert_eq!(
        year_only.metadata.ingested_at.map(|t| t.to_rfc3339()),
        Some("2024-01-01T00:00:00+00:00".to_string())
    );

    let date_only = Document::from_json_str(r#"{"title": "T", "created_at": "2024-01-01"}"#)
        .expect("parse date");
    assert_eq!(date_only.metadata.ingested_at, year_only.metadata.ingested_at);

    let prose = Document::from_json_str(r#"{"title": "T", "created_at": "last Tuesday"}"#)
        .expect("parse prose");
    assert!(prose.metadata.ingested_at.is_none());
}

#[test]
fn test_rerank_text_falls_back_to_text() {
    let doc = Document::with_id("d1", "Title", "Body");
    assert_eq!(doc.rerank_text(), "Body");
    assert_eq!(doc.with_raw_text("  ").rerank_text(), "Body");
}

#[test]
fn test_json_missing_id_is_generated() {
    let doc = Document::from_json_str(r#"{"title": "No id"}"#).expect("parse");

    assert!(!doc.id.is_empty());
    assert!(doc.text.is_empty());
}

#[test]
fn test_from_json_file_and_load_corpus() {
    let dir = TempDir::new().expect("temp dir");
    let single = dir.path().join("doc.json");
    let corpus = dir.path().join("corpus.json");

    let doc = Document::with_id("d1", "Working Holiday Guide", "Body").ingested_now();
    std::fs::write(&single, serde_json::to_string(&doc).unwrap()).unwrap();
    std::fs::write(
        &corpus,
        serde_json::to_string(&vec![doc.clone(), Document::with_id("d2", "Other", "Body")])
            .unwrap(),
    )
    .unwrap();

    assert_eq!(Document::from_json_file(&single).expect("load"), doc);

    let loaded = load_corpus(&corpus).expect("load corpus");
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0], doc);
    assert_eq!(loaded[1].id, "d2");
}

#[test]
fn test_from_json_file_missing_reports_path() {
    let dir = TempDir::new().expect("temp dir");
    let missing = dir.path().join("missing.json");

    let err = Document::from_json_file(&missing).unwrap_err();

    assert!(matches!(err, DocumentError::Io { .. }));
    assert!(err.to_string().contains("missing.json"));
}

#[test]
fn test_load_corpus_rejects_malformed_json() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        load_corpus(&path),
        Err(DocumentError::Parse { .. })
    ));
}

#[test]
fn test_display_truncates_title() {
    let doc = Document::with_id("d9", "A very long title that keeps going", "");

    assert_eq!(doc.to_string(), "<Document id=d9, title=A very long title th...>");
}
