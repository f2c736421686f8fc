//! LLM backends
//!
//! The analysis layer talks to a model only through [`LlmBackend`], so the
//! hosted providers in [`provider`] and the scripted backend in [`mock`] are
//! interchangeable.

pub mod mock;
mod provider;

pub use mock::ScriptedBackend;
pub use provider::{LlmClient, LlmProvider};

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// One prompt plus an optional JSON-schema constraint on the reply.
///
/// `inputs` holds the texts embedded in the prompt, in prompt order. Hosted
/// backends only send `prompt`; it is kept for logging and offline backends.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub schema: Option<Value>,
    pub inputs: Vec<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            schema: None,
            inputs: Vec::new(),
        }
    }

    pub fn with_inputs(mut self, inputs: Vec<String>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Whether the schema asks for a single JSON object at the top level
    pub fn expects_object(&self) -> bool {
        self.schema
            .as_ref()
            .and_then(|s| s.get("type"))
            .and_then(Value::as_str)
            .map(|t| t.eq_ignore_ascii_case("object"))
            .unwrap_or(false)
    }
}

/// Text generation endpoint returning the raw model text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

#[async_trait]
impl<T: LlmBackend + ?Sized> LlmBackend for std::sync::Arc<T> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        (**self).generate(request).await
    }
}

#[async_trait]
impl<T: LlmBackend + ?Sized> LlmBackend for Box<T> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        (**self).generate(request).await
    }
}
