//! Working set of analysis results and the aggregates derived from it

mod summary;
#[cfg(test)]
mod tests;

pub use summary::{
    average_confidence, confidence_trend, top_keywords, ConfidencePoint, DistributionEntry,
    KeywordCount, SentimentDistribution,
};

use crate::types::AnalysisResult;

/// Results held by a session, newest first.
///
/// Entries can be added and removed, never edited.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    results: Vec<AnalysisResult>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a single result at the front
    pub fn add(&mut self, result: AnalysisResult) {
        self.results.insert(0, result);
    }

    /// Put a batch at the front, keeping the batch's own order
    pub fn add_batch(&mut self, batch: Vec<AnalysisResult>) {
        self.results.splice(0..0, batch);
    }

    /// Drop the result with this id, returning it if present
    pub fn remove(&mut self, id: &str) -> Option<AnalysisResult> {
        let pos = self.results.iter().position(|r| r.id == id)?;
        Some(self.results.remove(pos))
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }

    pub fn get(&self, id: &str) -> Option<&AnalysisResult> {
        self.results.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.results.iter()
    }

    pub fn as_slice(&self) -> &[AnalysisResult] {
        &self.results
    }

    pub fn distribution(&self) -> SentimentDistribution {
        SentimentDistribution::from_results(&self.results)
    }
}
