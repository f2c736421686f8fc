//! Configuration management

use crate::analysis::ConfidencePolicy;
use crate::batch::{BatchMode, BatchOptions};
use crate::types::BATCH_UPLOAD;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// LLM provider (gemini, openai, anthropic, deepseek, ollama, compatible)
    pub provider: String,
    /// API key
    #[serde(default)]
    pub api_key: String,
    /// Model name, provider default when absent
    pub model: Option<String>,
    /// Endpoint override
    pub base_url: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Texts per chunk
    pub chunk_size: usize,
    /// Pause between chunks in milliseconds
    pub inter_chunk_delay_ms: u64,
    /// One prompt per chunk or one request per text
    pub mode: BatchMode,
    /// Source tag when the caller gives none
    pub default_source: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// What to do with confidence values outside [0, 1]
    pub confidence_policy: ConfidencePolicy,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path
            .as_ref()
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Config path is not valid UTF-8"))?;

        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("SENTIMENT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    /// Load from default locations
    pub fn load_default() -> anyhow::Result<Self> {
        let paths = ["config.toml", "config.yaml", "~/.config/sentiment-batch/config.toml"];

        for path in paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                return Self::load(expanded.as_ref());
            }
        }

        anyhow::bail!("No configuration file found")
    }
}

impl BatchConfig {
    pub fn options(&self) -> BatchOptions {
        BatchOptions {
            chunk_size: self.chunk_size,
            inter_chunk_delay: Duration::from_millis(self.inter_chunk_delay_ms),
            mode: self.mode,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: 5,
            inter_chunk_delay_ms: 0,
            mode: BatchMode::Grouped,
            default_source: BATCH_UPLOAD.to_string(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            api_key: String::new(),
            model: None,
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}
