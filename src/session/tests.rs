//! Tests for the session working set and summaries

use super::*;
use crate::types::{AnalysisResult, Assessment, Sentiment};

fn result(text: &str, sentiment: Sentiment, confidence: f64, keywords: &[&str]) -> AnalysisResult {
    AnalysisResult::new(
        text,
        "Batch Upload",
        Assessment {
            sentiment,
            confidence,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            explanation: String::new(),
        },
    )
}

#[test]
fn test_add_puts_newest_first() {
    let mut set = ResultSet::new();
    set.add(result("first", Sentiment::Neutral, 0.5, &[]));
    set.add(result("second", Sentiment::Neutral, 0.5, &[]));

    let texts: Vec<&str> = set.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["second", "first"]);
}

#[test]
fn test_add_batch_keeps_batch_order() {
    let mut set = ResultSet::new();
    set.add(result("old", Sentiment::Neutral, 0.5, &[]));
    set.add_batch(vec![
        result("b1", Sentiment::Positive, 0.9, &[]),
        result("b2", Sentiment::Negative, 0.8, &[]),
    ]);

    let texts: Vec<&str> = set.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["b1", "b2", "old"]);
}

#[test]
fn test_remove_and_clear() {
    let mut set = ResultSet::new();
    let keep = result("keep", Sentiment::Positive, 0.9, &[]);
    let drop = result("drop", Sentiment::Negative, 0.9, &[]);
    let drop_id = drop.id.clone();
    set.add_batch(vec![keep, drop]);

    let removed = set.remove(&drop_id).unwrap();
    assert_eq!(removed.text, "drop");
    assert!(set.get(&drop_id).is_none());
    assert!(set.remove(&drop_id).is_none());
    assert_eq!(set.len(), 1);

    set.clear();
    assert!(set.is_empty());
}

#[test]
fn test_distribution() {
    let results = vec![
        result("a", Sentiment::Positive, 0.9, &[]),
        result("b", Sentiment::Positive, 0.8, &[]),
        result("c", Sentiment::Negative, 0.7, &[]),
        result("d", Sentiment::Neutral, 0.6, &[]),
    ];
    let dist = SentimentDistribution::from_results(&results);

    assert_eq!(dist.total, 4);
    assert_eq!(dist.count(Sentiment::Positive), 2);
    assert_eq!(dist.percent(Sentiment::Positive), 50.0);
    assert_eq!(dist.percent(Sentiment::Negative), 25.0);
    assert_eq!(dist.dominant(), Some(Sentiment::Positive));

    let labels: Vec<Sentiment> = dist.entries.iter().map(|e| e.sentiment).collect();
    assert_eq!(labels, Sentiment::ALL.to_vec());
}

#[test]
fn test_distribution_empty() {
    let dist = ResultSet::new().distribution();
    assert_eq!(dist.total, 0);
    assert_eq!(dist.entries.len(), 3);
    assert!(dist.entries.iter().all(|e| e.count == 0 && e.percent == 0.0));
    assert_eq!(dist.dominant(), None);
}

#[test]
fn test_distribution_tie_prefers_canonical_order() {
    let results = vec![
        result("a", Sentiment::Neutral, 0.5, &[]),
        result("b", Sentiment::Negative, 0.5, &[]),
    ];
    let dist = SentimentDistribution::from_results(&results);
    assert_eq!(dist.dominant(), Some(Sentiment::Negative));
}

#[test]
fn test_confidence_trend_last_n() {
    let results: Vec<AnalysisResult> = (0..10)
        .map(|i| result("t", Sentiment::Neutral, i as f64 / 10.0, &[]))
        .collect();

    let trend = confidence_trend(&results, 8);
    assert_eq!(trend.len(), 8);
    assert_eq!(trend[0].label, "E3");
    assert_eq!(trend[0].confidence, 20);
    assert_eq!(trend[7].label, "E10");
    assert_eq!(trend[7].confidence, 90);

    let short = confidence_trend(&results[..2], 8);
    assert_eq!(short[0].label, "E1");
    assert_eq!(short.len(), 2);
}

#[test]
fn test_average_confidence() {
    assert_eq!(average_confidence(&[]), None);
    let results = vec![
        result("a", Sentiment::Positive, 0.8, &[]),
        result("b", Sentiment::Negative, 0.4, &[]),
    ];
    let avg = average_confidence(&results).unwrap();
    assert!((avg - 0.6).abs() < 1e-9);
}

#[test]
fn test_top_keywords() {
    let results = vec![
        result("a", Sentiment::Positive, 0.9, &["Service", "fast"]),
        result("b", Sentiment::Negative, 0.9, &["price", "service"]),
        result("c", Sentiment::Neutral, 0.9, &["fast", "SERVICE"]),
    ];

    let top = top_keywords(&results, 2);
    assert_eq!(top[0], KeywordCount { keyword: "service".to_string(), count: 3 });
    assert_eq!(top[1], KeywordCount { keyword: "fast".to_string(), count: 2 });
    assert_eq!(top.len(), 2);
}
