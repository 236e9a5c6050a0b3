//! Provider resolution and the two food operations built on top of it.

use std::fmt;

use larder_llm::any::AnyProvider;
use larder_llm::claude::{self, ClaudeProvider};
use larder_llm::extract::{Delimiter, Extraction, ExtractionOutcome, extract_json};
use larder_llm::ollama::{self, OllamaProvider};
use larder_llm::provider::{ImageData, LlmProvider, Message, MessagePart, Role};
use serde::Serialize;
use tokio::sync::OnceCell;

use crate::config::{CLAUDE_API_KEY_VAR, Config, OLLAMA_BASE_URL_VAR, ProviderKind};
use crate::error::GatewayError;
use crate::food::{DetectedItem, ImageMime, InventoryLine, Location};
use crate::plan::MealPlan;
use crate::prompt;
use crate::vault::Secret;

const PREVIEW_CHARS: usize = 200;

/// Backend settings, resolved once from configuration and never changed afterwards.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub ollama_base_url: String,
    pub text_model: String,
    pub vision_model: String,
    pub claude_api_url: String,
    pub claude_model: String,
    pub claude_max_tokens: u32,
    pub claude_api_key: Option<Secret>,
}

/// Pick the active backend.
///
/// An explicit provider wins; otherwise a configured Ollama base URL selects
/// Ollama, then a Claude API key selects Claude. Ollama is preferred when both
/// are present.
///
/// # Errors
///
/// Returns [`GatewayError::Configuration`] when neither backend is configured.
pub fn resolve_provider(config: &Config) -> Result<ProviderSettings, GatewayError> {
    let llm = &config.llm;
    let api_key = config.secrets.claude_api_key.clone();

    let kind = match llm.provider {
        Some(kind) => kind,
        None if llm.ollama.base_url.is_some() => ProviderKind::Ollama,
        None if api_key.is_some() => ProviderKind::Claude,
        None => {
            return Err(GatewayError::Configuration(format!(
                "no LLM provider configured, set {OLLAMA_BASE_URL_VAR} or {CLAUDE_API_KEY_VAR}"
            )));
        }
    };

    let settings = ProviderSettings {
        kind,
        ollama_base_url: llm
            .ollama
            .base_url
            .clone()
            .unwrap_or_else(|| ollama::DEFAULT_BASE_URL.to_owned()),
        text_model: llm.ollama.text_model.clone(),
        vision_model: llm.ollama.vision_model.clone(),
        claude_api_url: claude::DEFAULT_API_URL.to_owned(),
        claude_model: llm.claude.model.clone(),
        claude_max_tokens: llm.claude.max_tokens,
        claude_api_key: api_key,
    };
    tracing::debug!(provider = %settings.kind, "resolved LLM provider");
    Ok(settings)
}

/// Construct the client for the resolved backend.
///
/// # Errors
///
/// Returns [`GatewayError::Configuration`] when the Ollama base URL is not a
/// usable `http(s)` URL or Claude is selected without an API key.
pub fn build_backend(settings: &ProviderSettings) -> Result<AnyProvider, GatewayError> {
    match settings.kind {
        ProviderKind::Ollama => OllamaProvider::new(
            &settings.ollama_base_url,
            settings.text_model.clone(),
            settings.vision_model.clone(),
        )
        .map(AnyProvider::Ollama)
        .map_err(|e| GatewayError::Configuration(format!("{OLLAMA_BASE_URL_VAR}: {e}"))),
        ProviderKind::Claude => {
            let key = settings.claude_api_key.as_ref().ok_or_else(|| {
                GatewayError::Configuration(format!("{CLAUDE_API_KEY_VAR} is not set"))
            })?;
            Ok(AnyProvider::Claude(
                ClaudeProvider::new(
                    key.expose().to_owned(),
                    settings.claude_model.clone(),
                    settings.claude_max_tokens,
                )
                .with_api_url(&settings.claude_api_url),
            ))
        }
    }
}

type BackendFactory =
    Box<dyn Fn(&ProviderSettings) -> Result<AnyProvider, GatewayError> + Send + Sync>;

/// Items found in one photo.
///
/// An empty `items` list is ambiguous on its own; `outcome` records whether
/// the reply held an array at all and whether it parsed.
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub location: Location,
    pub items: Vec<DetectedItem>,
    pub raw_response: String,
    pub outcome: ExtractionOutcome,
}

impl Detection {
    #[must_use]
    pub fn summary(&self) -> String {
        format!("Detected {} items in your {}", self.items.len(), self.location)
    }
}

/// A generated plan plus the reply it came from. An empty plan means no usable output.
#[derive(Debug, Clone, Serialize)]
pub struct PlanGeneration {
    pub plan: MealPlan,
    pub raw_response: String,
    pub outcome: ExtractionOutcome,
}

/// Entry point for item detection and meal planning.
///
/// The backend client is built on first use and shared by every later call,
/// including concurrent ones.
pub struct FoodGateway {
    settings: ProviderSettings,
    factory: BackendFactory,
    backend: OnceCell<AnyProvider>,
}

impl fmt::Debug for FoodGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FoodGateway")
            .field("settings", &self.settings)
            .field("backend", &self.backend.get())
            .finish_non_exhaustive()
    }
}

impl FoodGateway {
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] when no provider can be resolved.
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        Ok(Self::from_settings(resolve_provider(config)?))
    }

    #[must_use]
    pub fn from_settings(settings: ProviderSettings) -> Self {
        Self::with_factory(settings, build_backend)
    }

    /// Use `factory` instead of [`build_backend`] when the backend is first needed.
    #[must_use]
    pub fn with_factory<F>(settings: ProviderSettings, factory: F) -> Self
    where
        F: Fn(&ProviderSettings) -> Result<AnyProvider, GatewayError> + Send + Sync + 'static,
    {
        Self {
            settings,
            factory: Box::new(factory),
            backend: OnceCell::new(),
        }
    }

    /// Wrap an already constructed backend.
    #[must_use]
    pub fn with_provider(settings: ProviderSettings, provider: AnyProvider) -> Self {
        Self {
            settings,
            factory: Box::new(build_backend),
            backend: OnceCell::new_with(Some(provider)),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.backend.initialized()
    }

    /// The backend client, constructing it on first call.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if the client cannot be built.
    /// Nothing is cached in that case.
    pub async fn backend(&self) -> Result<&AnyProvider, GatewayError> {
        self.backend
            .get_or_try_init(|| async {
                let provider = (self.factory)(&self.settings)?;
                tracing::info!(provider = provider.name(), "LLM backend initialized");
                Ok::<_, GatewayError>(provider)
            })
            .await
    }

    /// Ask the vision model which food items are visible in `image`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] for an empty image,
    /// [`GatewayError::Configuration`] if the backend cannot be built, and
    /// [`GatewayError::Backend`] if the request fails. A reply without a
    /// parseable item array is not an error.
    pub async fn detect_items(
        &self,
        image: &[u8],
        mime: ImageMime,
        location: Location,
    ) -> Result<Detection, GatewayError> {
        if image.is_empty() {
            return Err(GatewayError::InvalidInput("image is empty".into()));
        }
        let backend = self.backend().await?;

        let message = Message::from_parts(
            Role::User,
            vec![
                MessagePart::Text {
                    text: prompt::detection_prompt(location),
                },
                MessagePart::Image(Box::new(ImageData {
                    data: image.to_vec(),
                    mime_type: mime.as_str().to_owned(),
                })),
            ],
        );
        tracing::debug!(
            provider = backend.name(),
            %location,
            %mime,
            bytes = image.len(),
            "detecting food items"
        );
        let raw_response = backend.chat(&[message]).await?;

        let extraction = extract_json::<Vec<DetectedItem>>(&raw_response, Delimiter::Array);
        let outcome = extraction.outcome();
        let items = degrade_to_empty(extraction, &raw_response, "detected items");

        Ok(Detection {
            location,
            items,
            raw_response,
            outcome,
        })
    }

    /// Ask the text model for a 7-day plan built from `inventory`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EmptyInventory`] before touching any backend
    /// when `inventory` is empty; otherwise as [`Self::detect_items`].
    pub async fn generate_meal_plan(
        &self,
        inventory: &[InventoryLine],
    ) -> Result<PlanGeneration, GatewayError> {
        if inventory.is_empty() {
            return Err(GatewayError::EmptyInventory);
        }
        let backend = self.backend().await?;

        let message = Message::from_legacy(Role::User, prompt::meal_plan_prompt(inventory));
        tracing::debug!(
            provider = backend.name(),
            items = inventory.len(),
            "generating meal plan"
        );
        let raw_response = backend.chat(&[message]).await?;

        let extraction = extract_json::<MealPlan>(&raw_response, Delimiter::Object);
        let outcome = extraction.outcome();
        let mut plan = degrade_to_empty(extraction, &raw_response, "meal plan");
        let dropped = plan.truncate_to_week();
        if dropped > 0 {
            tracing::warn!(dropped, "meal plan had more than 7 days, extra days dropped");
        }

        Ok(PlanGeneration {
            plan,
            raw_response,
            outcome,
        })
    }
}

/// Unusable replies become `T::default()`; malformed ones are logged first.
fn degrade_to_empty<T: Default>(extraction: Extraction<T>, raw: &str, what: &str) -> T {
    match &extraction {
        Extraction::Parsed(_) => {}
        Extraction::NotFound => tracing::debug!("no JSON found in LLM reply for {what}"),
        Extraction::Malformed { reason } => tracing::warn!(
            %reason,
            preview = preview(raw),
            "failed to parse {what} from LLM reply"
        ),
    }
    extraction.into_value_or_empty()
}

fn preview(raw: &str) -> &str {
    match raw.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}
