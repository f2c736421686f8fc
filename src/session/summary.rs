//! Aggregates over result lists

use crate::types::{AnalysisResult, Sentiment};
use serde::Serialize;
use std::collections::HashMap;

/// Share of one label in a result list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionEntry {
    pub sentiment: Sentiment,
    pub count: usize,
    /// Percentage of all results (0-100)
    pub percent: f64,
}

/// Counts per label, always listing all three labels in canonical order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentDistribution {
    pub total: usize,
    pub entries: Vec<DistributionEntry>,
}

impl SentimentDistribution {
    pub fn from_results(results: &[AnalysisResult]) -> Self {
        let mut counts = [0usize; 3];
        for r in results {
            counts[r.sentiment.index()] += 1;
        }

        let total = results.len();
        let entries = Sentiment::ALL
            .iter()
            .map(|&sentiment| {
                let count = counts[sentiment.index()];
                let percent = if total > 0 {
                    count as f64 / total as f64 * 100.0
                } else {
                    0.0
                };
                DistributionEntry { sentiment, count, percent }
            })
            .collect();

        Self { total, entries }
    }

    pub fn count(&self, sentiment: Sentiment) -> usize {
        self.entries[sentiment.index()].count
    }

    pub fn percent(&self, sentiment: Sentiment) -> f64 {
        self.entries[sentiment.index()].percent
    }

    /// Label with the highest count, None for an empty list
    pub fn dominant(&self) -> Option<Sentiment> {
        if self.total == 0 {
            return None;
        }
        // ties resolve to the earlier label
        self.entries
            .iter()
            .fold(None::<&DistributionEntry>, |best, e| match best {
                Some(b) if b.count >= e.count => Some(b),
                _ => Some(e),
            })
            .map(|e| e.sentiment)
    }
}

/// One bar of the confidence trend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidencePoint {
    pub label: String,
    /// Confidence as a rounded percentage
    pub confidence: u32,
}

/// Confidence of the last `n` results, labelled `E<k>` by 1-based position
pub fn confidence_trend(results: &[AnalysisResult], n: usize) -> Vec<ConfidencePoint> {
    let start = results.len().saturating_sub(n);
    results[start..]
        .iter()
        .enumerate()
        .map(|(i, r)| ConfidencePoint {
            label: format!("E{}", start + i + 1),
            confidence: (r.confidence.clamp(0.0, 1.0) * 100.0).round() as u32,
        })
        .collect()
}

pub fn average_confidence(results: &[AnalysisResult]) -> Option<f64> {
    if results.is_empty() {
        return None;
    }
    Some(results.iter().map(|r| r.confidence).sum::<f64>() / results.len() as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

/// Most frequent keywords, compared case-insensitively.
///
/// Ties keep the order in which keywords first appeared.
pub fn top_keywords(results: &[AnalysisResult], n: usize) -> Vec<KeywordCount> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<KeywordCount> = Vec::new();

    for keyword in results.iter().flat_map(|r| r.keywords.iter()) {
        let key = keyword.to_lowercase();
        match index.get(&key) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push(KeywordCount { keyword: key, count: 1 });
            }
        }
    }

    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(n);
    counts
}
