//! Tests for the sentiment client and response parsing

use super::parser::{clean_payload, parse_array, parse_object};
use super::*;
use crate::error::AnalysisError;
use crate::llm::{MockLlmBackend, ScriptedBackend};
use crate::types::Sentiment;
use tokio_test::{assert_err, assert_ok};

const OBJECT: &str = r#"{"sentiment": "Positive", "confidence": 0.92, "keywords": ["great", "product"], "explanation": "Strong praise."}"#;

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_parse_object() {
    let a = parse_object(OBJECT, ConfidencePolicy::Reject).unwrap();
    assert_eq!(a.sentiment, Sentiment::Positive);
    assert_eq!(a.confidence, 0.92);
    assert_eq!(a.keywords, vec!["great", "product"]);
    assert_eq!(a.explanation, "Strong praise.");
}

#[test]
fn test_parse_object_trims_whitespace_and_fences() {
    let padded = format!("\n\n   {}  \n", OBJECT);
    assert_ok!(parse_object(&padded, ConfidencePolicy::Reject));

    let fenced = format!("```json\n{}\n```", OBJECT);
    assert_eq!(clean_payload(&fenced), OBJECT);
    assert_ok!(parse_object(&fenced, ConfidencePolicy::Reject));
}

#[test]
fn test_parse_object_uppercase_label() {
    let raw = r#"{"sentiment": "NEGATIVE", "confidence": 0.7, "keywords": [], "explanation": "x"}"#;
    let a = parse_object(raw, ConfidencePolicy::Reject).unwrap();
    assert_eq!(a.sentiment, Sentiment::Negative);
}

#[test]
fn test_parse_object_not_json() {
    let err = parse_object("I think this is positive!", ConfidencePolicy::Reject).unwrap_err();
    assert!(matches!(err, AnalysisError::MalformedResponse(_)));
}

#[test]
fn test_parse_object_missing_fields() {
    for raw in [
        r#"{"confidence": 0.5, "keywords": [], "explanation": "x"}"#,
        r#"{"sentiment": "Neutral", "keywords": [], "explanation": "x"}"#,
        r#"{"sentiment": "Neutral", "confidence": 0.5, "keywords": []}"#,
        r#"{"sentiment": "Neutral", "confidence": "high", "explanation": "x"}"#,
        r#"["Neutral"]"#,
    ] {
        let err = parse_object(raw, ConfidencePolicy::Reject).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedResponse(_)), "{}", raw);
    }
}

#[test]
fn test_parse_object_keywords_coerced() {
    let missing = r#"{"sentiment": "Neutral", "confidence": 0.5, "explanation": "x"}"#;
    assert!(parse_object(missing, ConfidencePolicy::Reject).unwrap().keywords.is_empty());

    let null = r#"{"sentiment": "Neutral", "confidence": 0.5, "keywords": null, "explanation": "x"}"#;
    assert!(parse_object(null, ConfidencePolicy::Reject).unwrap().keywords.is_empty());

    let mixed = r#"{"sentiment": "Neutral", "confidence": 0.5, "keywords": ["  ", "ok", 3, " fine "], "explanation": "x"}"#;
    assert_eq!(parse_object(mixed, ConfidencePolicy::Reject).unwrap().keywords, vec!["ok", "fine"]);
}

#[test]
fn test_parse_object_unknown_label() {
    let raw = r#"{"sentiment": "Mixed", "confidence": 0.5, "keywords": [], "explanation": "x"}"#;
    let err = parse_object(raw, ConfidencePolicy::Reject).unwrap_err();
    assert!(matches!(err, AnalysisError::Validation(_)));
}

#[test]
fn test_confidence_policies() {
    let raw = r#"{"sentiment": "Positive", "confidence": 1.3, "keywords": [], "explanation": "x"}"#;

    let err = parse_object(raw, ConfidencePolicy::Reject).unwrap_err();
    assert!(matches!(err, AnalysisError::Validation(_)));

    assert_eq!(parse_object(raw, ConfidencePolicy::Clamp).unwrap().confidence, 1.0);
    assert_eq!(parse_object(raw, ConfidencePolicy::PassThrough).unwrap().confidence, 1.3);

    let negative = r#"{"sentiment": "Positive", "confidence": -0.2, "keywords": [], "explanation": "x"}"#;
    assert_eq!(parse_object(negative, ConfidencePolicy::Clamp).unwrap().confidence, 0.0);
}

#[test]
fn test_parse_is_repeatable() {
    let first = parse_object(OBJECT, ConfidencePolicy::Reject).unwrap();
    let second = parse_object(OBJECT, ConfidencePolicy::Reject).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_parse_array() {
    let raw = format!("[{}, {}]", OBJECT, r#"{"sentiment": "Neutral", "confidence": 0.4, "keywords": [], "explanation": "Flat."}"#);
    let items = parse_array(&raw, 2, ConfidencePolicy::Reject).unwrap();
    assert_eq!(items[0].sentiment, Sentiment::Positive);
    assert_eq!(items[1].sentiment, Sentiment::Neutral);
}

#[test]
fn test_parse_array_results_envelope() {
    let raw = format!(r#"{{"results": [{}]}}"#, OBJECT);
    assert_eq!(parse_array(&raw, 1, ConfidencePolicy::Reject).unwrap().len(), 1);
}

#[test]
fn test_parse_array_length_mismatch() {
    let raw = format!("[{}]", OBJECT);
    let err = parse_array(&raw, 2, ConfidencePolicy::Reject).unwrap_err();
    assert!(err.to_string().contains("expected 2 results, got 1"));
}

#[test]
fn test_parse_array_bad_element_rejects_group() {
    let raw = format!(r#"[{}, {{"sentiment": "Positive"}}]"#, OBJECT);
    let err = parse_array(&raw, 2, ConfidencePolicy::Reject).unwrap_err();
    assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    assert!(err.to_string().contains("item 2"));
}

#[test]
fn test_single_prompt_mentions_fields() {
    let p = prompt::single_prompt("great product");
    for field in ["sentiment", "confidence", "keywords", "explanation"] {
        assert!(p.contains(field));
    }
    assert!(p.ends_with("Text: \"great product\""));
}

#[test]
fn test_group_prompt_is_one_indexed() {
    let p = prompt::group_prompt(&texts(&["a", "b", "c"]));
    assert!(p.contains("these 3 texts"));
    assert!(p.contains("1. a\n2. b\n3. c"));
}

#[test]
fn test_group_prompt_keeps_multiline_text_on_its_entry() {
    let p = prompt::group_prompt(&texts(&["a\n2. b", "first\r\nsecond", "c"]));
    assert!(p.contains("1. a 2. b\n2. first second\n3. c"));
    assert_eq!(p.lines().filter(|l| l.starts_with("2. ")).count(), 1);
}

#[test]
fn test_schemas() {
    assert_eq!(prompt::item_schema()["type"], "OBJECT");
    assert_eq!(prompt::group_schema()["items"]["required"][0], "sentiment");
}

#[tokio::test]
async fn test_classify_one() {
    let mut backend = MockLlmBackend::new();
    backend
        .expect_generate()
        .withf(|req| req.expects_object() && req.inputs == vec!["great product".to_string()])
        .times(1)
        .returning(|_| Ok(OBJECT.to_string()));

    let client = SentimentClient::new(backend);
    let result = client.classify_one("great product", "Direct Entry").await.unwrap();

    assert_eq!(result.text, "great product");
    assert_eq!(result.source, "Direct Entry");
    assert_eq!(result.sentiment, Sentiment::Positive);
    assert!(!result.id.is_empty());
}

#[tokio::test]
async fn test_classify_one_malformed() {
    let client = SentimentClient::new(ScriptedBackend::fixed("Sure! The sentiment is positive."));
    let err = client.classify_one("great product", "Direct Entry").await.unwrap_err();
    assert!(matches!(err, AnalysisError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_classify_one_upstream_error() {
    let mut backend = MockLlmBackend::new();
    backend
        .expect_generate()
        .returning(|_| Err(AnalysisError::Upstream("HTTP 429 Too Many Requests".into())));

    let client = SentimentClient::new(backend);
    let err = assert_err!(client.classify_one("x", "Direct Entry").await);
    assert!(err.is_upstream());
}

#[tokio::test]
async fn test_classify_one_ids_differ_for_same_payload() {
    let client = SentimentClient::new(ScriptedBackend::fixed(OBJECT));
    let a = client.classify_one("great product", "s").await.unwrap();
    let b = client.classify_one("great product", "s").await.unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(a.assessment(), b.assessment());
}

#[tokio::test]
async fn test_classify_many_keeps_order() {
    let client = SentimentClient::new(ScriptedBackend::lexicon());
    let input = texts(&["great product", "terrible service", "it was fine"]);
    let results = client.classify_many(&input, "Batch Upload").await.unwrap();

    assert_eq!(results.len(), 3);
    for (result, text) in results.iter().zip(&input) {
        assert_eq!(&result.text, text);
        assert_eq!(result.source, "Batch Upload");
    }
    assert_eq!(results[0].sentiment, Sentiment::Positive);
    assert_eq!(results[1].sentiment, Sentiment::Negative);
    assert_eq!(results[2].sentiment, Sentiment::Neutral);
    assert_eq!(client.backend().call_count(), 1);
}

#[tokio::test]
async fn test_classify_many_empty_makes_no_call() {
    let mut backend = MockLlmBackend::new();
    backend.expect_generate().times(0);

    let client = SentimentClient::new(backend);
    let results = client.classify_many(&[], "Batch Upload").await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_classify_many_short_array_fails() {
    let client = SentimentClient::new(ScriptedBackend::fixed(format!("[{}]", OBJECT)));
    let err = client
        .classify_many(&texts(&["a", "b"]), "Batch Upload")
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_client_policy_applies() {
    let raw = r#"{"sentiment": "Positive", "confidence": 87, "keywords": [], "explanation": "x"}"#;
    let client = SentimentClient::new(ScriptedBackend::fixed(raw))
        .with_confidence_policy(ConfidencePolicy::Clamp);
    assert_eq!(client.confidence_policy(), ConfidencePolicy::Clamp);
    assert_eq!(client.classify_one("x", "s").await.unwrap().confidence, 1.0);
}
