//! Test-only mock LLM provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::provider::{LlmProvider, Message};

#[derive(Debug, Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<String>>>,
    calls: Arc<Mutex<Vec<Vec<Message>>>>,
    instances: Arc<AtomicUsize>,
    pub default_response: String,
    pub fail_chat: bool,
    /// Milliseconds to sleep before returning a response.
    pub delay_ms: u64,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            instances: Arc::new(AtomicUsize::new(0)),
            default_response: "mock response".into(),
            fail_chat: false,
            delay_ms: 0,
        }
    }
}

impl MockProvider {
    #[must_use]
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_chat: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    /// Every message list passed to `chat`, in call order. Shared across clones.
    #[must_use]
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Record that a gateway built a backend from this mock; returns the new count.
    pub fn mark_constructed(&self) -> usize {
        self.instances.fetch_add(1, Ordering::SeqCst) + 1
    }

    #[must_use]
    pub fn constructed(&self) -> usize {
        self.instances.load(Ordering::SeqCst)
    }
}

impl LlmProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn supports_vision(&self) -> bool {
        true
    }

    async fn chat(&self, messages: &[Message]) -> Result<String, crate::LlmError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        if self.fail_chat {
            return Err(crate::LlmError::Status {
                provider: "mock",
                status: 500,
                body: "mock LLM error".into(),
            });
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(self.default_response.clone())
        } else {
            Ok(responses.remove(0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Role;

    #[tokio::test]
    async fn scripted_responses_then_default() {
        let mock = MockProvider::with_responses(vec!["first".into()]);
        let msg = [Message::from_legacy(Role::User, "hi")];
        assert_eq!(mock.chat(&msg).await.unwrap(), "first");
        assert_eq!(mock.chat(&msg).await.unwrap(), "mock response");
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn failing_mock_returns_status_error() {
        let mock = MockProvider::failing();
        let err = mock
            .chat(&[Message::from_legacy(Role::User, "hi")])
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn clones_share_call_log_and_counter() {
        let mock = MockProvider::default();
        let clone = mock.clone();
        clone.mark_constructed();
        assert_eq!(mock.constructed(), 1);
    }
}
