#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{provider} returned status {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("empty response from {provider}")]
    EmptyResponse { provider: &'static str },

    #[error("{0}")]
    Other(String),
}

impl LlmError {
    /// HTTP status reported by the backend, if the failure came from a non-2xx reply.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display_carries_body() {
        let err = LlmError::Status {
            provider: "ollama",
            status: 404,
            body: "model 'llava' not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "ollama returned status 404: model 'llava' not found"
        );
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn non_status_errors_have_no_status() {
        assert!(LlmError::Other("boom".into()).status().is_none());
        assert!(
            LlmError::EmptyResponse { provider: "claude" }
                .status()
                .is_none()
        );
    }
}
