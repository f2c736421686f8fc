//! Sentiment Batch
//!
//! LLM-backed sentiment classification for single texts and long, chunked,
//! rate-limited batches.

pub mod analysis;
pub mod batch;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod llm;
pub mod session;
pub mod types;
