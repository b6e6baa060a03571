//! Connection settings shared by every remote port client.

use std::time::Duration;

/// Configuration for one collaborator service endpoint.
///
/// Each client gets its own instance, so transcription and evaluation can
/// point at different hosts with different timeouts.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use viva_remote::RemoteConfig;
///
/// let config = RemoteConfig::new()
///     .with_base_url("http://evaluator.internal:4010")
///     .with_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the service, without a trailing path.
    pub(crate) base_url: String,
    /// Bearer token sent as `Authorization` when set.
    pub(crate) api_key: Option<String>,
    /// Per-request timeout.
    pub(crate) timeout: Duration,
    /// Maximum number of retry attempts for transient errors.
    pub(crate) max_retries: u8,
    /// Base delay for exponential backoff.
    pub(crate) retry_base_delay: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(200),
        }
    }
}

impl RemoteConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL of the service.
    ///
    /// A trailing slash is stripped so endpoint paths join cleanly.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Set the API key sent as a bearer token.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set an optional API key.
    #[must_use]
    pub fn with_optional_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    /// Set the per-request timeout.
    ///
    /// Defaults to 10 seconds. The interview engine applies its own,
    /// tighter deadlines on top for latency-sensitive calls.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retry attempts for transient errors.
    ///
    /// Defaults to 2 retries. Zero disables retrying entirely.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base delay for exponential backoff retries.
    ///
    /// Defaults to 200ms.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = RemoteConfig::new();
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.retry_base_delay, Duration::from_millis(200));
    }

    #[test]
    fn builder_pattern() {
        let config = RemoteConfig::new()
            .with_base_url("https://speech.internal:4001")
            .with_api_key("secret")
            .with_timeout(Duration::from_secs(3))
            .with_max_retries(5)
            .with_retry_delay(Duration::from_millis(50));

        assert_eq!(config.base_url, "https://speech.internal:4001");
        assert_eq!(config.api_key, Some("secret".to_string()));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_base_delay, Duration::from_millis(50));
    }

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let config = RemoteConfig::new().with_base_url("http://host:9000/");
        assert_eq!(config.base_url, "http://host:9000");
    }

    #[test]
    fn optional_api_key() {
        let with_key = RemoteConfig::new().with_optional_api_key(Some("key".to_string()));
        assert_eq!(with_key.api_key, Some("key".to_string()));

        let without_key = RemoteConfig::new().with_optional_api_key(None);
        assert!(without_key.api_key.is_none());
    }
}
