//! Prompts and response schemas for sentiment classification

use serde_json::{json, Value};

/// Instruction for a single text; the model must answer with one object
pub fn single_prompt(text: &str) -> String {
    format!(
        r#"Analyze the sentiment of the following text and return a JSON object with:
- sentiment: strictly one of "Positive", "Negative", or "Neutral"
- confidence: a float between 0 and 1
- keywords: an array of strings representing the main sentiment drivers
- explanation: a brief one-sentence explanation of why this sentiment was chosen.

Text: "{}""#,
        text
    )
}

/// Instruction for an ordered group; texts are numbered from 1 so the model
/// can keep its answers aligned with the input
pub fn group_prompt(texts: &[String]) -> String {
    let numbered = texts
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}. {}", i + 1, single_line(t)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Analyze the sentiment of these {} texts separately. Return a JSON array of exactly {} objects, in the same order as the texts.
Each object must have: sentiment (strictly "Positive", "Negative", or "Neutral"), confidence (a float between 0 and 1), keywords (array of strings), and explanation (one sentence).

Texts:
{}"#,
        texts.len(),
        texts.len(),
        numbered
    )
}

/// Line breaks inside a text would split its numbered entry
fn single_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Schema of one classification object
pub fn item_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "sentiment": {
                "type": "STRING",
                "enum": ["Positive", "Negative", "Neutral"]
            },
            "confidence": { "type": "NUMBER" },
            "keywords": { "type": "ARRAY", "items": { "type": "STRING" } },
            "explanation": { "type": "STRING" }
        },
        "required": ["sentiment", "confidence", "keywords", "explanation"]
    })
}

/// Schema of an array of classification objects
pub fn group_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": item_schema()
    })
}
