use larder_llm::LlmError;

/// Failures surfaced by [`FoodGateway`](crate::FoodGateway) operations.
///
/// A reply that contains no usable JSON is not an error: the operation
/// returns an empty result with an [`ExtractionOutcome`](larder_llm::extract::ExtractionOutcome)
/// describing why.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No backend could be resolved, or its credential is missing. Raised before any network call.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Transport failure or non-success response from the active backend. Not retried.
    #[error("backend error: {0}")]
    Backend(#[from] LlmError),

    #[error("no inventory items, upload pantry or fridge photos first")]
    EmptyInventory,

    /// Unknown location or unsupported image type.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl GatewayError {
    /// Whether the caller, rather than configuration or the backend, is at fault.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::EmptyInventory | Self::InvalidInput(_))
    }

    /// Upstream HTTP status when the backend answered with a non-success code.
    #[must_use]
    pub fn backend_status(&self) -> Option<u16> {
        match self {
            Self::Backend(e) => e.status(),
            _ => None,
        }
    }
}
