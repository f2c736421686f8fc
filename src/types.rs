//! Core types for sentiment analysis

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Provenance tag used for single entries typed in by a user
pub const DIRECT_ENTRY: &str = "Direct Entry";
/// Provenance tag used for batch runs without a more specific source
pub const BATCH_UPLOAD: &str = "Batch Upload";

/// Sentiment label.
///
/// Serialized as `Positive` / `Negative` / `Neutral`. Any casing is accepted
/// on input, so payloads using `POSITIVE` map onto the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// All labels in canonical display order
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }

    /// Position in [`Sentiment::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Sentiment::Positive => 0,
            Sentiment::Negative => 1,
            Sentiment::Neutral => 2,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(format!("unknown sentiment label: {:?}", other)),
        }
    }
}

impl TryFrom<String> for Sentiment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Validated classification returned by the model for one text
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub keywords: Vec<String>,
    pub explanation: String,
}

/// One classified text.
///
/// Built once after a successful parse and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: String,
    pub text: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub keywords: Vec<String>,
    pub explanation: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

impl AnalysisResult {
    /// Attach a fresh id and timestamp to a model assessment
    pub fn new(text: impl Into<String>, source: impl Into<String>, assessment: Assessment) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sentiment: assessment.sentiment,
            confidence: assessment.confidence,
            keywords: assessment.keywords,
            explanation: assessment.explanation,
            timestamp: Utc::now(),
            source: source.into(),
        }
    }

    /// The model-derived part of the record
    pub fn assessment(&self) -> Assessment {
        Assessment {
            sentiment: self.sentiment,
            confidence: self.confidence,
            keywords: self.keywords.clone(),
            explanation: self.explanation.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessment() -> Assessment {
        Assessment {
            sentiment: Sentiment::Positive,
            confidence: 0.9,
            keywords: vec!["great".to_string()],
            explanation: "Enthusiastic praise.".to_string(),
        }
    }

    #[test]
    fn test_sentiment_parse_any_casing() {
        assert_eq!("POSITIVE".parse::<Sentiment>().unwrap(), Sentiment::Positive);
        assert_eq!("negative".parse::<Sentiment>().unwrap(), Sentiment::Negative);
        assert_eq!(" Neutral ".parse::<Sentiment>().unwrap(), Sentiment::Neutral);
        assert!("Mixed".parse::<Sentiment>().is_err());
    }

    #[test]
    fn test_sentiment_serializes_canonical() {
        let json = serde_json::to_string(&Sentiment::Negative).unwrap();
        assert_eq!(json, "\"Negative\"");

        let parsed: Sentiment = serde_json::from_str("\"NEUTRAL\"").unwrap();
        assert_eq!(parsed, Sentiment::Neutral);
    }

    #[test]
    fn test_sentiment_index_matches_all() {
        for (i, s) in Sentiment::ALL.iter().enumerate() {
            assert_eq!(s.index(), i);
        }
    }

    #[test]
    fn test_result_ids_are_unique() {
        let a = AnalysisResult::new("great product", BATCH_UPLOAD, assessment());
        let b = AnalysisResult::new("great product", BATCH_UPLOAD, assessment());
        assert_ne!(a.id, b.id);
        assert_eq!(a.assessment(), b.assessment());
    }

    #[test]
    fn test_result_timestamp_is_iso8601() {
        let result = AnalysisResult::new("fine", DIRECT_ENTRY, assessment());
        let json = serde_json::to_value(&result).unwrap();
        let ts = json["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
        assert_eq!(json["sentiment"], "Positive");
        assert_eq!(json["source"], "Direct Entry");
    }
}
