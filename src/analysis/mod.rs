//! Sentiment client
//!
//! Turns texts into prompts for an [`LlmBackend`] and the model's JSON
//! replies back into validated [`AnalysisResult`] records.

pub mod parser;
pub mod prompt;
#[cfg(test)]
mod tests;

pub use parser::ConfidencePolicy;

use crate::error::Result;
use crate::llm::{GenerationRequest, LlmBackend};
use crate::types::AnalysisResult;

/// Classifies texts through one explicitly owned backend
pub struct SentimentClient<B> {
    backend: B,
    policy: ConfidencePolicy,
}

impl<B: LlmBackend> SentimentClient<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            policy: ConfidencePolicy::default(),
        }
    }

    pub fn with_confidence_policy(mut self, policy: ConfidencePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn confidence_policy(&self) -> ConfidencePolicy {
        self.policy
    }

    /// Classify a single text
    pub async fn classify_one(&self, text: &str, source: &str) -> Result<AnalysisResult> {
        let request = GenerationRequest::new(prompt::single_prompt(text))
            .with_schema(prompt::item_schema())
            .with_inputs(vec![text.to_string()]);

        let raw = self.backend.generate(&request).await?;
        let assessment = parser::parse_object(&raw, self.policy)?;
        Ok(AnalysisResult::new(text, source, assessment))
    }

    /// Classify an ordered group of texts with a single request.
    ///
    /// The reply must hold exactly one valid entry per text; otherwise the
    /// whole group fails and no records are produced.
    pub async fn classify_many(&self, texts: &[String], source: &str) -> Result<Vec<AnalysisResult>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = GenerationRequest::new(prompt::group_prompt(texts))
            .with_schema(prompt::group_schema())
            .with_inputs(texts.to_vec());

        let raw = self.backend.generate(&request).await?;
        let assessments = parser::parse_array(&raw, texts.len(), self.policy)?;

        Ok(texts
            .iter()
            .zip(assessments)
            .map(|(text, assessment)| AnalysisResult::new(text.as_str(), source, assessment))
            .collect())
    }
}
