mod env;
mod types;


pub use types::*;

use std::path::Path;

use anyhow::{Context, bail};

use crate::vault::{Credential, CredentialVault};

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Pull backend credentials from `vault`.
    ///
    /// A value found in the vault replaces the one from the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault backend fails.
    pub async fn resolve_secrets<V: CredentialVault>(&mut self, vault: &V) -> anyhow::Result<()> {
        for credential in Credential::ALL {
            let Some(value) = vault
                .fetch(credential)
                .await
                .with_context(|| format!("failed to fetch {credential}"))?
            else {
                continue;
            };
            tracing::debug!(%credential, provider = %credential.provider(), "credential resolved");
            match credential {
                Credential::OllamaBaseUrl => {
                    self.llm.ollama.base_url = Some(value.expose().to_owned());
                }
                Credential::ClaudeApiKey => self.secrets.claude_api_key = Some(value),
            }
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if a numeric limit is zero or a model name is blank.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.llm.claude.max_tokens == 0 {
            bail!("llm.claude.max_tokens must be greater than 0");
        }
        if self.timeouts.llm_seconds == 0 {
            bail!("timeouts.llm_seconds must be greater than 0");
        }
        if self.llm.ollama.text_model.trim().is_empty()
            || self.llm.ollama.vision_model.trim().is_empty()
        {
            bail!("llm.ollama model names must not be empty");
        }
        if self.llm.claude.model.trim().is_empty() {
            bail!("llm.claude.model must not be empty");
        }
        Ok(())
    }
}
