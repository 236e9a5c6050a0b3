use base64::{Engine, engine::general_purpose::STANDARD};
use ollama_rs::Ollama;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::http::default_client;
use crate::provider::{LlmProvider, Message, has_image_parts};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

const DEFAULT_PORT: u16 = 11434;

/// Local inference backend talking to an Ollama server.
///
/// Chat goes through a plain non-streaming `POST /api/chat` so that a non-2xx
/// reply surfaces with its status and body. Model listing for health checks
/// goes through `ollama-rs`.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    http: reqwest::Client,
    client: Ollama,
    base_url: String,
    text_model: String,
    vision_model: String,
}

impl OllamaProvider {
    /// # Errors
    ///
    /// Returns [`LlmError::InvalidUrl`] if `base_url` is not an absolute
    /// `http` or `https` URL with a host.
    pub fn new(
        base_url: &str,
        text_model: String,
        vision_model: String,
    ) -> Result<Self, LlmError> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        let (host, port) = parse_host_port(&base_url)?;
        Ok(Self {
            http: default_client(),
            client: Ollama::new(host, port),
            base_url,
            text_model,
            vision_model,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn text_model(&self) -> &str {
        &self.text_model
    }

    #[must_use]
    pub fn vision_model(&self) -> &str {
        &self.vision_model
    }

    fn select_model(&self, messages: &[Message]) -> &str {
        if has_image_parts(messages) {
            &self.vision_model
        } else {
            &self.text_model
        }
    }

    /// Check if Ollama is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection to Ollama fails.
    pub async fn health_check(&self) -> Result<(), LlmError> {
        self.client.list_local_models().await.map_err(|e| {
            LlmError::Other(format!("failed to connect to Ollama, is it running? {e}"))
        })?;
        Ok(())
    }

    /// Return the configured models (text, vision) that are not pulled locally.
    ///
    /// # Errors
    ///
    /// Returns an error if the model list cannot be fetched.
    pub async fn missing_models(&self) -> Result<Vec<String>, LlmError> {
        let local = self
            .client
            .list_local_models()
            .await
            .map_err(|e| LlmError::Other(format!("failed to list Ollama models: {e}")))?;
        let available: Vec<String> = local.into_iter().map(|m| m.name).collect();
        Ok(missing_from(
            &[self.text_model.as_str(), self.vision_model.as_str()],
            &available,
        ))
    }
}

impl LlmProvider for OllamaProvider {
    fn supports_vision(&self) -> bool {
        true
    }

    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        let model = self.select_model(messages);
        let body = ChatRequest {
            model,
            messages: messages.iter().map(convert_message).collect(),
            stream: false,
        };

        tracing::debug!(model, messages = messages.len(), "sending Ollama chat request");

        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!("Ollama error {status}: {text}");
            return Err(LlmError::Status {
                provider: "ollama",
                status: status.as_u16(),
                body: text,
            });
        }

        let resp: ChatResponse = serde_json::from_str(&text)?;
        Ok(resp.message.map(|m| m.content).unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

fn convert_message(msg: &Message) -> ApiMessage<'_> {
    ApiMessage {
        role: msg.role.as_str(),
        content: msg.to_llm_content(),
        images: msg.images().map(|img| STANDARD.encode(&img.data)).collect(),
    }
}

/// Names from `wanted` absent in `available`. A bare name matches its `:latest` tag.
fn missing_from(wanted: &[&str], available: &[String]) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for &name in wanted {
        let present = available
            .iter()
            .any(|a| a == name || (!name.contains(':') && *a == format!("{name}:latest")));
        if !present && !missing.iter().any(|m| m == name) {
            missing.push(name.to_owned());
        }
    }
    missing
}

/// Split a base URL into the `scheme://host` and port `ollama-rs` expects.
fn parse_host_port(base_url: &str) -> Result<(String, u16), LlmError> {
    let invalid = |reason: String| LlmError::InvalidUrl {
        url: base_url.to_owned(),
        reason,
    };
    let url = reqwest::Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "unsupported scheme '{}', expected http or https",
            url.scheme()
        )));
    }
    let host = url
        .host_str()
        .ok_or_else(|| invalid("missing host".to_owned()))?;
    let port = url.port_or_known_default().unwrap_or(DEFAULT_PORT);
    Ok((format!("{}://{host}", url.scheme()), port))
}
