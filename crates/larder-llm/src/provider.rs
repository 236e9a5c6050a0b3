use serde::{Deserialize, Serialize};

use crate::LlmError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Raw image payload attached to a message. Encoding happens in the provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl std::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageData")
            .field("data", &format_args!("<{} bytes>", self.data.len()))
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessagePart {
    Text { text: String },
    Image(Box<ImageData>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub parts: Vec<MessagePart>,
}

impl Message {
    #[must_use]
    pub fn from_legacy(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            parts: vec![],
        }
    }

    /// Build a message from parts; `content` becomes the concatenated text parts.
    #[must_use]
    pub fn from_parts(role: Role, parts: Vec<MessagePart>) -> Self {
        let content = parts
            .iter()
            .filter_map(|p| match p {
                MessagePart::Text { text } => Some(text.as_str()),
                MessagePart::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("");
        Self {
            role,
            content,
            parts,
        }
    }

    #[must_use]
    pub fn to_llm_content(&self) -> &str {
        &self.content
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageData> {
        self.parts.iter().filter_map(|p| match p {
            MessagePart::Image(img) => Some(img.as_ref()),
            MessagePart::Text { .. } => None,
        })
    }

    #[must_use]
    pub fn has_images(&self) -> bool {
        self.images().next().is_some()
    }
}

pub(crate) fn has_image_parts(messages: &[Message]) -> bool {
    messages.iter().any(Message::has_images)
}

/// A backend that answers a chat or vision prompt with plain text.
pub trait LlmProvider: Send + Sync {
    /// Send messages to the LLM and return the assistant response text.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or replies with a non-success status.
    fn chat(&self, messages: &[Message]) -> impl Future<Output = Result<String, LlmError>> + Send;

    fn name(&self) -> &'static str;

    /// Whether image parts are forwarded to the model rather than dropped.
    fn supports_vision(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_joins_text_and_skips_images() {
        let msg = Message::from_parts(
            Role::User,
            vec![
                MessagePart::Text {
                    text: "look at ".into(),
                },
                MessagePart::Image(Box::new(ImageData {
                    data: vec![1, 2, 3],
                    mime_type: "image/png".into(),
                })),
                MessagePart::Text {
                    text: "this".into(),
                },
            ],
        );
        assert_eq!(msg.to_llm_content(), "look at this");
        assert!(msg.has_images());
        assert_eq!(msg.images().count(), 1);
    }

    #[test]
    fn legacy_message_has_no_images() {
        let msg = Message::from_legacy(Role::User, "hi");
        assert!(!msg.has_images());
        assert!(!has_image_parts(&[msg]));
    }

    #[test]
    fn image_debug_hides_bytes() {
        let img = ImageData {
            data: vec![0xFF; 2048],
            mime_type: "image/jpeg".into(),
        };
        let debug = format!("{img:?}");
        assert!(debug.contains("<2048 bytes>"));
        assert!(debug.contains("image/jpeg"));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }
}
