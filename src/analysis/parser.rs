//! Response parsing and validation
//!
//! The model payload is checked field by field right after JSON parsing:
//! - `sentiment`, `confidence` and `explanation` are required
//! - `keywords` is coerced to an empty list when missing or not an array
//! - confidence outside [0, 1] is handled per [`ConfidencePolicy`]

use crate::error::{AnalysisError, Result};
use crate::types::{Assessment, Sentiment};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Treatment of confidence values outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfidencePolicy {
    /// Fail with a validation error
    #[default]
    Reject,
    /// Clamp into range
    Clamp,
    /// Keep the model's value as is
    PassThrough,
}

impl ConfidencePolicy {
    fn apply(&self, confidence: f64) -> Result<f64> {
        if confidence.is_nan() {
            return Err(AnalysisError::Validation("confidence is NaN".into()));
        }
        if (0.0..=1.0).contains(&confidence) {
            return Ok(confidence);
        }
        match self {
            ConfidencePolicy::Reject => Err(AnalysisError::Validation(format!(
                "confidence {} outside [0, 1]",
                confidence
            ))),
            ConfidencePolicy::Clamp => Ok(confidence.clamp(0.0, 1.0)),
            ConfidencePolicy::PassThrough => Ok(confidence),
        }
    }
}

/// Trim the payload and drop a surrounding Markdown code fence
pub fn clean_payload(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // optional language tag on the opening fence line
    match body.find('\n') {
        Some(newline) if !body[..newline].contains(['{', '[']) => body[newline + 1..].trim(),
        _ => body.trim(),
    }
}

/// Parse a single classification object
pub fn parse_object(raw: &str, policy: ConfidencePolicy) -> Result<Assessment> {
    let value: Value = serde_json::from_str(clean_payload(raw))?;
    match value {
        Value::Object(map) => assessment_from_map(&map, policy),
        other => Err(AnalysisError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            kind(&other)
        ))),
    }
}

/// Parse an array of classification objects, one per input in input order.
///
/// A `{"results": [...]}` envelope is accepted as well. Any length mismatch
/// or invalid element rejects the whole payload.
pub fn parse_array(raw: &str, expected: usize, policy: ConfidencePolicy) -> Result<Vec<Assessment>> {
    let value: Value = serde_json::from_str(clean_payload(raw))?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(AnalysisError::MalformedResponse(
                    "expected a JSON array of results".into(),
                ))
            }
        },
        other => {
            return Err(AnalysisError::MalformedResponse(format!(
                "expected a JSON array, got {}",
                kind(&other)
            )))
        }
    };

    if items.len() != expected {
        return Err(AnalysisError::MalformedResponse(format!(
            "expected {} results, got {}",
            expected,
            items.len()
        )));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => assessment_from_map(map, policy).map_err(|e| at_index(i, e)),
            other => Err(AnalysisError::MalformedResponse(format!(
                "item {}: expected a JSON object, got {}",
                i + 1,
                kind(other)
            ))),
        })
        .collect()
}

fn assessment_from_map(map: &Map<String, Value>, policy: ConfidencePolicy) -> Result<Assessment> {
    let sentiment = match map.get("sentiment") {
        Some(Value::String(label)) => label
            .parse::<Sentiment>()
            .map_err(AnalysisError::Validation)?,
        Some(other) => return Err(wrong_type("sentiment", "string", other)),
        None => return Err(missing("sentiment")),
    };

    let confidence = match map.get("confidence") {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| AnalysisError::MalformedResponse("confidence is not a finite number".into()))?,
        Some(other) => return Err(wrong_type("confidence", "number", other)),
        None => return Err(missing("confidence")),
    };
    let confidence = policy.apply(confidence)?;

    let explanation = match map.get("explanation") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => return Err(wrong_type("explanation", "string", other)),
        None => return Err(missing("explanation")),
    };

    let keywords = match map.get("keywords") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    };

    Ok(Assessment {
        sentiment,
        confidence,
        keywords,
        explanation,
    })
}

fn missing(field: &str) -> AnalysisError {
    AnalysisError::MalformedResponse(format!("missing required field `{}`", field))
}

fn wrong_type(field: &str, expected: &str, got: &Value) -> AnalysisError {
    AnalysisError::MalformedResponse(format!(
        "field `{}` should be a {}, got {}",
        field,
        expected,
        kind(got)
    ))
}

fn at_index(i: usize, err: AnalysisError) -> AnalysisError {
    match err {
        AnalysisError::MalformedResponse(msg) => AnalysisError::MalformedResponse(format!("item {}: {}", i + 1, msg)),
        AnalysisError::Validation(msg) => AnalysisError::Validation(format!("item {}: {}", i + 1, msg)),
        other => other,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
