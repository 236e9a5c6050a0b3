use super::{Config, ProviderKind};

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Some(v) = non_empty_var("LARDER_LLM_PROVIDER") {
            match v.parse::<ProviderKind>() {
                Ok(kind) => self.llm.provider = Some(kind),
                Err(e) => tracing::warn!("ignoring LARDER_LLM_PROVIDER: {e}"),
            }
        }
        if let Some(v) = non_empty_var("LARDER_OLLAMA_TEXT_MODEL") {
            self.llm.ollama.text_model = v;
        }
        if let Some(v) = non_empty_var("LARDER_OLLAMA_VISION_MODEL") {
            self.llm.ollama.vision_model = v;
        }
        if let Some(v) = non_empty_var("LARDER_CLAUDE_MODEL") {
            self.llm.claude.model = v;
        }
        if let Some(v) = non_empty_var("LARDER_CLAUDE_MAX_TOKENS")
            && let Ok(n) = v.parse::<u32>()
        {
            self.llm.claude.max_tokens = n;
        }
        if let Some(v) = non_empty_var("LARDER_TIMEOUT_LLM")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.timeouts.llm_seconds = secs;
        }
    }
}
