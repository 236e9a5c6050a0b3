//! LLM backend abstraction, Ollama and Claude providers, and JSON reply extraction.

pub mod any;
pub mod claude;
pub mod error;
pub mod extract;
pub mod http;
#[cfg(feature = "mock")]
pub mod mock;
pub mod ollama;
pub mod provider;

pub use error::LlmError;
pub use provider::LlmProvider;
