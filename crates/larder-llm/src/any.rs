use crate::claude::ClaudeProvider;
#[cfg(feature = "mock")]
use crate::mock::MockProvider;
use crate::ollama::OllamaProvider;
use crate::provider::{LlmProvider, Message};

/// Generates a match over all `AnyProvider` variants, binding the inner provider
/// and evaluating the given closure for each arm.
macro_rules! delegate_provider {
    ($self:expr, |$p:ident| $expr:expr) => {
        match $self {
            AnyProvider::Ollama($p) => $expr,
            AnyProvider::Claude($p) => $expr,
            #[cfg(feature = "mock")]
            AnyProvider::Mock($p) => $expr,
        }
    };
}

/// The backend chosen at startup. Selection happens once; calls only delegate.
#[derive(Debug, Clone)]
pub enum AnyProvider {
    Ollama(OllamaProvider),
    Claude(ClaudeProvider),
    #[cfg(feature = "mock")]
    Mock(MockProvider),
}

impl LlmProvider for AnyProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, crate::LlmError> {
        delegate_provider!(self, |p| p.chat(messages).await)
    }

    fn name(&self) -> &'static str {
        delegate_provider!(self, |p| p.name())
    }

    fn supports_vision(&self) -> bool {
        delegate_provider!(self, |p| p.supports_vision())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Role;

    fn ollama(base_url: &str) -> AnyProvider {
        AnyProvider::Ollama(
            OllamaProvider::new(base_url, "text".into(), "vision".into()).unwrap(),
        )
    }

    fn claude() -> AnyProvider {
        AnyProvider::Claude(ClaudeProvider::new("key".into(), "model".into(), 1024))
    }

    #[test]
    fn any_names_delegate() {
        assert_eq!(ollama("http://localhost:11434").name(), "ollama");
        assert_eq!(claude().name(), "claude");
    }

    #[test]
    fn both_backends_support_vision() {
        assert!(ollama("http://localhost:11434").supports_vision());
        assert!(claude().supports_vision());
    }

    #[test]
    fn any_provider_debug_variants() {
        assert!(format!("{:?}", ollama("http://localhost:11434")).contains("Ollama"));
        let claude_debug = format!("{:?}", claude());
        assert!(claude_debug.contains("Claude"));
        assert!(!claude_debug.contains("\"key\""));
    }

    #[test]
    fn any_provider_clone() {
        let cloned = claude().clone();
        assert_eq!(cloned.name(), "claude");
    }

    #[tokio::test]
    async fn any_ollama_chat_unreachable_errors() {
        let provider = ollama("http://127.0.0.1:1");
        let result = provider
            .chat(&[Message::from_legacy(Role::User, "hello")])
            .await;
        assert!(result.is_err());
    }

    #[cfg(feature = "mock")]
    #[tokio::test]
    async fn chat_dispatches_to_mock() {
        let mock = MockProvider::with_responses(vec!["from_mock".into()]);
        let provider = AnyProvider::Mock(mock.clone());
        let reply = provider
            .chat(&[Message::from_legacy(Role::User, "test")])
            .await
            .unwrap();
        assert_eq!(reply, "from_mock");
        assert_eq!(mock.call_count(), 1);
        assert_eq!(provider.name(), "mock");
    }
}
