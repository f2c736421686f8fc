//! Scripted LLM backend
//!
//! Provides an in-process [`LlmBackend`] for:
//! - Unit tests without network calls
//! - Ordering and timing tests with controlled latency
//! - Dry runs of the CLI

use super::{GenerationRequest, LlmBackend};
use crate::error::{AnalysisError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::cmp::Ordering as CmpOrdering;
use std::time::{Duration, Instant};

type Responder = dyn Fn(&GenerationRequest) -> Result<String> + Send + Sync;
type LatencyFn = dyn Fn(&GenerationRequest) -> Duration + Send + Sync;

/// A call observed by the scripted backend
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub request: GenerationRequest,
    pub started: Instant,
    pub finished: Instant,
}

/// Backend answering from a closure instead of a model
pub struct ScriptedBackend {
    responder: Box<Responder>,
    latency: Option<Box<LatencyFn>>,
    fail_calls: Vec<usize>,
    next_call: AtomicUsize,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl ScriptedBackend {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&GenerationRequest) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            latency: None,
            fail_calls: Vec::new(),
            next_call: AtomicUsize::new(0),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always answer with the same text
    pub fn fixed(response: impl Into<String>) -> Self {
        let response = response.into();
        Self::new(move |_| Ok(response.clone()))
    }

    /// Answer every input with a well-formed record from a small keyword
    /// lexicon, as an object or an array depending on the requested schema.
    pub fn lexicon() -> Self {
        Self::new(|request| {
            let items: Vec<Value> = request.inputs.iter().map(|t| lexicon_item(t)).collect();
            let payload = if request.expects_object() {
                items.into_iter().next().unwrap_or_else(|| lexicon_item(""))
            } else {
                Value::Array(items)
            };
            Ok(payload.to_string())
        })
    }

    pub fn with_latency(mut self, ms: u64) -> Self {
        self.latency = Some(Box::new(move |_| Duration::from_millis(ms)));
        self
    }

    /// Latency chosen per request
    pub fn with_latency_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&GenerationRequest) -> Duration + Send + Sync + 'static,
    {
        self.latency = Some(Box::new(f));
        self
    }

    /// Fail the n-th call (0-based) with an upstream error
    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_calls.push(call);
        self
    }

    /// Completed calls, in completion order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls started so far
    pub fn call_count(&self) -> usize {
        self.next_call.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let started = Instant::now();
        let call_index = self.next_call.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = &self.latency {
            tokio::time::sleep(latency(request)).await;
        }

        let response = if self.fail_calls.contains(&call_index) {
            Err(AnalysisError::Upstream(format!("scripted failure on call {}", call_index)))
        } else {
            (self.responder)(request)
        };

        self.calls.lock().unwrap().push(RecordedCall {
            request: request.clone(),
            started,
            finished: Instant::now(),
        });

        response
    }
}

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "awesome", "love", "happy", "incredible",
    "transformative", "fantastic", "wonderful", "best",
];
const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "poor", "worst", "hate", "frustrated", "waste",
    "clunky", "inaccurate", "broken",
];

fn lexicon_item(text: &str) -> Value {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let positive: Vec<&str> = words.iter().copied().filter(|w| POSITIVE_WORDS.contains(w)).collect();
    let negative: Vec<&str> = words.iter().copied().filter(|w| NEGATIVE_WORDS.contains(w)).collect();

    let (sentiment, keywords) = match positive.len().cmp(&negative.len()) {
        CmpOrdering::Greater => ("Positive", positive),
        CmpOrdering::Less => ("Negative", negative),
        CmpOrdering::Equal => ("Neutral", Vec::new()),
    };
    let confidence = if keywords.is_empty() { 0.5 } else { (0.6 + 0.1 * keywords.len() as f64).min(0.95) };

    json!({
        "sentiment": sentiment,
        "confidence": confidence,
        "keywords": keywords,
        "explanation": format!("Keyword match found {} {} term(s).", keywords.len(), sentiment.to_lowercase()),
    })
}
