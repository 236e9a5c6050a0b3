//! Shared HTTP client construction for consistent TLS and connection settings.

use std::time::Duration;

/// Create a shared HTTP client with standard larder configuration.
///
/// Config: 30s connect timeout, rustls TLS, `larder/{version}` user-agent,
/// redirect limit 10. No overall request timeout: local vision models can
/// take minutes, so callers wrap each call in their own deadline.
///
/// # Panics
///
/// Panics if the TLS backend cannot be initialized (should never happen with rustls).
#[must_use]
pub fn default_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .user_agent(concat!("larder/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .expect("default HTTP client construction must not fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_successfully() {
        let _client = default_client();
    }
}
