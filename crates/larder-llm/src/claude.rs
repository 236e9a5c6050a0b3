use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::http::default_client;
use crate::provider::{LlmProvider, Message, MessagePart, Role};

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Hosted backend speaking the Anthropic Messages API.
#[derive(Clone)]
pub struct ClaudeProvider {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
}

impl fmt::Debug for ClaudeProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaudeProvider")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl ClaudeProvider {
    #[must_use]
    pub fn new(api_key: String, model: String, max_tokens: u32) -> Self {
        Self {
            client: default_client(),
            api_key,
            api_url: DEFAULT_API_URL.to_owned(),
            model,
            max_tokens,
        }
    }

    /// Point the provider at a different API root (proxies, tests).
    #[must_use]
    pub fn with_api_url(mut self, url: &str) -> Self {
        url.trim_end_matches('/').clone_into(&mut self.api_url);
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, messages: &[Message]) -> reqwest::RequestBuilder {
        let (system, chat_messages) = split_messages(messages);

        let body = RequestBody {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: system.as_deref(),
            messages: &chat_messages,
        };

        self.client
            .post(format!("{}/v1/messages", self.api_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
    }
}

impl LlmProvider for ClaudeProvider {
    fn supports_vision(&self) -> bool {
        true
    }

    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        tracing::debug!(
            model = %self.model,
            messages = messages.len(),
            "sending Claude messages request"
        );

        let response = self.build_request(messages).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!("Claude API error {status}: {text}");
            return Err(LlmError::Status {
                provider: "claude",
                status: status.as_u16(),
                body: text,
            });
        }

        let resp: ApiResponse = serde_json::from_str(&text)?;

        if let Some(ref usage) = resp.usage {
            log_usage(usage);
        }

        match resp.content.into_iter().next() {
            Some(ResponseBlock::Text { text }) => Ok(text),
            Some(ResponseBlock::Other) => Ok(String::new()),
            None => Err(LlmError::EmptyResponse { provider: "claude" }),
        }
    }

    fn name(&self) -> &'static str {
        "claude"
    }
}

fn log_usage(usage: &ApiUsage) {
    tracing::debug!(
        input_tokens = usage.input_tokens,
        output_tokens = usage.output_tokens,
        "Claude API usage"
    );
}

fn split_messages(messages: &[Message]) -> (Option<String>, Vec<ApiMessage>) {
    let mut system_parts = Vec::new();
    let mut chat = Vec::new();

    for msg in messages {
        match msg.role {
            Role::System => system_parts.push(msg.to_llm_content()),
            Role::User | Role::Assistant => chat.push(ApiMessage {
                role: msg.role.as_str(),
                content: convert_content(msg),
            }),
        }
    }

    let system = if system_parts.is_empty() {
        None
    } else {
        Some(system_parts.join("\n\n"))
    };

    (system, chat)
}

/// Plain string content for text-only turns; image blocks first, then text, otherwise.
fn convert_content(msg: &Message) -> ApiContent {
    if !msg.has_images() {
        return ApiContent::Text(msg.to_llm_content().to_owned());
    }

    let mut blocks: Vec<ContentBlock> = msg
        .parts
        .iter()
        .filter_map(|p| match p {
            MessagePart::Image(img) => Some(ContentBlock::Image {
                source: ImageSource {
                    source_type: "base64",
                    media_type: img.mime_type.clone(),
                    data: STANDARD.encode(&img.data),
                },
            }),
            MessagePart::Text { .. } => None,
        })
        .collect();

    let text = msg.to_llm_content();
    if !text.is_empty() {
        blocks.push(ContentBlock::Text {
            text: text.to_owned(),
        });
    }

    ApiContent::Blocks(blocks)
}

#[derive(Serialize)]
struct RequestBody<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [ApiMessage],
}

#[derive(Serialize)]
struct ApiMessage {
    role: &'static str,
    content: ApiContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ApiContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Image { source: ImageSource },
    Text { text: String },
}

#[derive(Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: String,
    data: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ResponseBlock>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Debug)]
struct ApiUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}
