use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::vault::Secret;

pub const CLAUDE_API_KEY_VAR: &str = "LARDER_CLAUDE_API_KEY";
pub const OLLAMA_BASE_URL_VAR: &str = "LARDER_OLLAMA_BASE_URL";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(skip)]
    pub secrets: ResolvedSecrets,
}

/// LLM backend selector. `anthropic` is accepted as a spelling of `claude`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Ollama,
    #[serde(alias = "anthropic")]
    Claude,
}

impl ProviderKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::Claude => "claude",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "claude" | "anthropic" => Ok(Self::Claude),
            other => Err(GatewayError::Configuration(format!(
                "unknown LLM provider '{other}', expected ollama or claude"
            ))),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LlmConfig {
    /// Explicit backend override; auto-detected from the other settings when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub claude: ClaudeConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct OllamaConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_text_model")]
    pub text_model: String,
    #[serde(default = "default_vision_model")]
    pub vision_model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            text_model: default_text_model(),
            vision_model: default_vision_model(),
        }
    }
}

fn default_text_model() -> String {
    "qwen2.5:14b".into()
}

fn default_vision_model() -> String {
    "llama3.2-vision".into()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ClaudeConfig {
    #[serde(default = "default_claude_model")]
    pub model: String,
    #[serde(default = "default_claude_max_tokens")]
    pub max_tokens: u32,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            model: default_claude_model(),
            max_tokens: default_claude_max_tokens(),
        }
    }
}

fn default_claude_model() -> String {
    larder_llm::claude::DEFAULT_MODEL.into()
}

fn default_claude_max_tokens() -> u32 {
    larder_llm::claude::DEFAULT_MAX_TOKENS
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TimeoutConfig {
    /// Deadline the caller applies around each gateway call.
    #[serde(default = "default_llm_timeout")]
    pub llm_seconds: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            llm_seconds: default_llm_timeout(),
        }
    }
}

fn default_llm_timeout() -> u64 {
    300
}

#[derive(Debug, Default, Clone)]
pub struct ResolvedSecrets {
    pub claude_api_key: Option<Secret>,
}
