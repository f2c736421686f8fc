//! Batch orchestration
//!
//! Drives the sentiment client over an arbitrarily long list of texts:
//! - contiguous chunks of at most `chunk_size` texts, run strictly one after another
//! - optional pause between chunks for rate limiting
//! - results concatenated in input order
//! - the whole batch stops at the first failed chunk

mod cancel;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};

use crate::analysis::SentimentClient;
use crate::error::{AnalysisError, Result};
use crate::llm::LlmBackend;
use crate::types::AnalysisResult;
use futures_util::future::try_join_all;
use serde::Deserialize;
use std::fmt;
use std::ops::Range;
use std::time::Duration;

/// How a chunk is sent to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchMode {
    /// One prompt enumerating every text of the chunk
    #[default]
    Grouped,
    /// One request per text, issued concurrently within the chunk
    PerItem,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    pub chunk_size: usize,
    pub inter_chunk_delay: Duration,
    pub mode: BatchMode,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            chunk_size: 5,
            inter_chunk_delay: Duration::ZERO,
            mode: BatchMode::Grouped,
        }
    }
}

impl BatchOptions {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.inter_chunk_delay = delay;
        self
    }

    pub fn with_mode(mut self, mode: BatchMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Lifecycle of a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Dispatching { chunk: usize },
    Waiting { next_chunk: usize },
    Done,
    Cancelled,
    Failed { chunk: usize },
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchState::Idle => write!(f, "idle"),
            BatchState::Dispatching { chunk } => write!(f, "dispatching chunk {}", chunk),
            BatchState::Waiting { next_chunk } => write!(f, "waiting before chunk {}", next_chunk),
            BatchState::Done => write!(f, "done"),
            BatchState::Cancelled => write!(f, "cancelled"),
            BatchState::Failed { chunk } => write!(f, "failed at chunk {}", chunk),
        }
    }
}

/// How a batch run ended
#[derive(Debug)]
pub enum BatchOutcome {
    Completed,
    Cancelled,
    Failed { chunk: usize, error: AnalysisError },
}

/// Results of every chunk that completed, plus how the run ended
#[derive(Debug)]
pub struct BatchReport {
    pub results: Vec<AnalysisResult>,
    pub chunks_total: usize,
    pub chunks_completed: usize,
    pub outcome: BatchOutcome,
}

impl BatchReport {
    pub fn state(&self) -> BatchState {
        match &self.outcome {
            BatchOutcome::Completed => BatchState::Done,
            BatchOutcome::Cancelled => BatchState::Cancelled,
            BatchOutcome::Failed { chunk, .. } => BatchState::Failed { chunk: *chunk },
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.outcome, BatchOutcome::Completed)
    }

    /// Completed and cancelled runs yield their results; a failed run yields
    /// the chunk's error
    pub fn into_result(self) -> Result<Vec<AnalysisResult>> {
        match self.outcome {
            BatchOutcome::Completed | BatchOutcome::Cancelled => Ok(self.results),
            BatchOutcome::Failed { error, .. } => Err(error),
        }
    }
}

/// Split `len` items into contiguous ranges of at most `chunk_size`
pub fn plan_chunks(len: usize, chunk_size: usize) -> Result<Vec<Range<usize>>> {
    if chunk_size == 0 {
        return Err(AnalysisError::Config("chunk_size must be positive".into()));
    }
    Ok((0..len)
        .step_by(chunk_size)
        .map(|start| start..(start + chunk_size).min(len))
        .collect())
}

/// Runs chunks of texts through an owned [`SentimentClient`]
pub struct BatchOrchestrator<B> {
    client: SentimentClient<B>,
    options: BatchOptions,
}

impl<B: LlmBackend> BatchOrchestrator<B> {
    pub fn new(client: SentimentClient<B>, options: BatchOptions) -> Self {
        Self { client, options }
    }

    pub fn client(&self) -> &SentimentClient<B> {
        &self.client
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Classify every text, aborting on the first failed chunk
    pub async fn run_batch(&self, texts: &[String], source: &str) -> Result<Vec<AnalysisResult>> {
        self.run(texts, source, &CancelToken::never()).await?.into_result()
    }

    /// Classify every text until done, cancelled, or a chunk fails.
    ///
    /// Only an invalid chunk size is returned as `Err`; chunk failures are
    /// reported in the [`BatchReport`] alongside the results gathered before it.
    pub async fn run(&self, texts: &[String], source: &str, cancel: &CancelToken) -> Result<BatchReport> {
        let chunks = plan_chunks(texts.len(), self.options.chunk_size)?;
        let chunks_total = chunks.len();
        let delay = self.options.inter_chunk_delay;
        let mut results = Vec::with_capacity(texts.len());

        tracing::info!(
            "Starting batch: {} texts in {} chunks (size {}, mode {:?}, delay {:?})",
            texts.len(),
            chunks_total,
            self.options.chunk_size,
            self.options.mode,
            delay
        );

        for (index, range) in chunks.into_iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok(self.cancelled(results, chunks_total, index));
            }

            tracing::debug!("Batch {}: texts {}..{}", BatchState::Dispatching { chunk: index }, range.start, range.end);

            match self.dispatch(&texts[range], source).await {
                Ok(chunk_results) => results.extend(chunk_results),
                Err(error) => {
                    tracing::error!("Batch {}: {}", BatchState::Failed { chunk: index }, error);
                    return Ok(BatchReport {
                        results,
                        chunks_total,
                        chunks_completed: index,
                        outcome: BatchOutcome::Failed { chunk: index, error },
                    });
                }
            }

            let next_chunk = index + 1;
            if next_chunk < chunks_total && !delay.is_zero() {
                tracing::debug!("Batch {} for {:?}", BatchState::Waiting { next_chunk }, delay);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel.cancelled() => {
                        return Ok(self.cancelled(results, chunks_total, next_chunk));
                    }
                }
            }
        }

        tracing::info!("Batch {}: {} results", BatchState::Done, results.len());

        Ok(BatchReport {
            results,
            chunks_total,
            chunks_completed: chunks_total,
            outcome: BatchOutcome::Completed,
        })
    }

    async fn dispatch(&self, chunk: &[String], source: &str) -> Result<Vec<AnalysisResult>> {
        match self.options.mode {
            BatchMode::Grouped => self.client.classify_many(chunk, source).await,
            // try_join_all yields in input order regardless of completion order
            BatchMode::PerItem => {
                try_join_all(chunk.iter().map(|text| self.client.classify_one(text, source))).await
            }
        }
    }

    fn cancelled(&self, results: Vec<AnalysisResult>, chunks_total: usize, chunks_completed: usize) -> BatchReport {
        tracing::warn!(
            "Batch {} after {}/{} chunks ({} results kept)",
            BatchState::Cancelled,
            chunks_completed,
            chunks_total,
            results.len()
        );
        BatchReport {
            results,
            chunks_total,
            chunks_completed,
            outcome: BatchOutcome::Cancelled,
        }
    }
}
