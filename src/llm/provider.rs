//! Hosted LLM providers
//!
//! Supports Gemini, Anthropic, OpenAI, and OpenAI-compatible APIs.

use super::{GenerationRequest, LlmBackend};
use crate::config::LlmConfig;
use crate::error::{AnalysisError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
const OPENAI_URL: &str = "https://api.openai.com";
const DEEPSEEK_URL: &str = "https://api.deepseek.com";
const ANTHROPIC_URL: &str = "https://api.anthropic.com";
const OLLAMA_URL: &str = "http://localhost:11434";

/// HTTP client for a hosted model
pub struct LlmClient {
    http: Client,
    provider: LlmProvider,
}

#[derive(Debug, Clone)]
pub enum LlmProvider {
    Gemini {
        api_key: String,
        model: String,
        base_url: String,
    },
    Anthropic {
        api_key: String,
        model: String,
        base_url: String,
    },
    OpenAI {
        api_key: String,
        model: String,
        base_url: String,
    },
    /// OpenAI-compatible API (DeepSeek, Ollama, vLLM, etc.)
    Compatible {
        api_key: Option<String>,
        model: String,
        base_url: String,
    },
}

// ============ Request/Response types ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: String,
}

impl LlmClient {
    pub fn new(provider: LlmProvider) -> Self {
        Self {
            http: Client::new(),
            provider,
        }
    }

    /// Create with a request timeout; timeouts surface as upstream errors
    pub fn with_timeout(provider: LlmProvider, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, provider })
    }

    /// Create from config
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let model = |default: &str| config.model.clone().unwrap_or_else(|| default.to_string());
        let base_url = |default: &str| config.base_url.clone().unwrap_or_else(|| default.to_string());

        let provider = match config.provider.to_lowercase().as_str() {
            "gemini" | "google" => LlmProvider::Gemini {
                api_key: require_key(config)?,
                model: model("gemini-2.5-flash"),
                base_url: base_url(GEMINI_URL),
            },
            "anthropic" | "claude" => LlmProvider::Anthropic {
                api_key: require_key(config)?,
                model: model("claude-sonnet-4-20250514"),
                base_url: base_url(ANTHROPIC_URL),
            },
            "openai" | "gpt" => LlmProvider::OpenAI {
                api_key: require_key(config)?,
                model: model("gpt-4o-mini"),
                base_url: base_url(OPENAI_URL),
            },
            "deepseek" => LlmProvider::Compatible {
                api_key: Some(require_key(config)?),
                model: model("deepseek-chat"),
                base_url: base_url(DEEPSEEK_URL),
            },
            "ollama" => LlmProvider::Compatible {
                api_key: None,
                model: model("qwen2.5:14b"),
                base_url: base_url(OLLAMA_URL),
            },
            "compatible" | "custom" => LlmProvider::Compatible {
                api_key: if config.api_key.is_empty() { None } else { Some(config.api_key.clone()) },
                model: config.model.clone().ok_or_else(|| AnalysisError::Config("model required for compatible provider".into()))?,
                base_url: config.base_url.clone().ok_or_else(|| AnalysisError::Config("base_url required for compatible provider".into()))?,
            },
            _ => return Err(AnalysisError::Config(format!("Unknown LLM provider: {}", config.provider))),
        };

        Self::with_timeout(provider, Duration::from_secs(config.timeout_secs))
    }

    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    pub fn name(&self) -> &str {
        match &self.provider {
            LlmProvider::Gemini { .. } => "Gemini",
            LlmProvider::Anthropic { .. } => "Claude",
            LlmProvider::OpenAI { .. } => "GPT",
            LlmProvider::Compatible { model, .. } => model,
        }
    }

    async fn call_gemini(
        &self,
        base_url: &str,
        api_key: &str,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: request.schema.clone(),
            },
        };

        let resp = self
            .http
            .post(format!("{}/v1beta/models/{}:generateContent", base_url, model))
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;
        let text = read_success(resp).await?;

        let response: GeminiResponse = serde_json::from_str(&text)
            .map_err(|e| AnalysisError::Upstream(format!("Unexpected Gemini envelope: {} - response: {}", e, truncate(&text, 200))))?;

        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AnalysisError::Upstream("Empty response from Gemini".into()))
    }

    async fn call_openai_compatible(
        &self,
        base_url: &str,
        api_key: Option<&str>,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String> {
        // json_object mode only admits a top-level object, so arrays rely on the prompt
        let response_format = if request.expects_object() {
            Some(ResponseFormat {
                r#type: "json_object".to_string(),
            })
        } else {
            None
        };

        let body = OpenAIRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            response_format,
        };

        let mut req = self
            .http
            .post(format!("{}/v1/chat/completions", base_url))
            .header("content-type", "application/json");

        if let Some(key) = api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let resp = req.json(&body).send().await?;
        let text = read_success(resp).await?;

        let response: OpenAIResponse = serde_json::from_str(&text)
            .map_err(|e| AnalysisError::Upstream(format!("Unexpected completion envelope: {} - response: {}", e, truncate(&text, 200))))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AnalysisError::Upstream("Empty response from LLM".into()))
    }

    async fn call_anthropic(
        &self,
        base_url: &str,
        api_key: &str,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String> {
        let body = AnthropicRequest {
            model: model.to_string(),
            max_tokens: 2048,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
        };

        let resp = self
            .http
            .post(format!("{}/v1/messages", base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;
        let text = read_success(resp).await?;

        let response: AnthropicResponse = serde_json::from_str(&text)
            .map_err(|e| AnalysisError::Upstream(format!("Unexpected Anthropic envelope: {} - response: {}", e, truncate(&text, 200))))?;

        response
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| AnalysisError::Upstream("Empty response from Anthropic".into()))
    }
}

#[async_trait]
impl LlmBackend for LlmClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let text = match &self.provider {
            LlmProvider::Gemini { api_key, model, base_url } => {
                self.call_gemini(base_url, api_key, model, request).await?
            }
            LlmProvider::Anthropic { api_key, model, base_url } => {
                self.call_anthropic(base_url, api_key, model, request).await?
            }
            LlmProvider::OpenAI { api_key, model, base_url } => {
                self.call_openai_compatible(base_url, Some(api_key), model, request)
                    .await?
            }
            LlmProvider::Compatible { api_key, model, base_url } => {
                self.call_openai_compatible(base_url, api_key.as_deref(), model, request)
                    .await?
            }
        };

        tracing::debug!("LLM raw response ({}): {}", self.name(), truncate(&text, 500));
        Ok(text)
    }
}

fn require_key(config: &LlmConfig) -> Result<String> {
    if config.api_key.is_empty() {
        return Err(AnalysisError::Config(format!(
            "api_key required for provider {}",
            config.provider
        )));
    }
    Ok(config.api_key.clone())
}

/// Body of a 2xx response; anything else is an upstream failure
async fn read_success(resp: Response) -> Result<String> {
    let status = resp.status();
    let text = resp.text().await?;
    if !status.is_success() {
        return Err(AnalysisError::Upstream(format!(
            "HTTP {} - {}",
            status,
            truncate(&text, 200)
        )));
    }
    Ok(text)
}

pub(crate) fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
