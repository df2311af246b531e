//! Client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Configuration for an HTTP model client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API key for authentication.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Base URL for the API.
    pub base_url: Option<Url>,
    /// Organization ID (if applicable).
    pub organization: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            organization: None,
            timeout_seconds: 120,
        }
    }
}

impl ClientConfig {
    /// Create a config with an API key.
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Set the base URL.
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Set the organization.
    #[must_use]
    pub fn organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_seconds = timeout.as_secs();
        self
    }

    /// The configured timeout as a [`Duration`].
    #[must_use]
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Load configuration from `{PREFIX}_API_KEY`, `{PREFIX}_BASE_URL`,
    /// and `{PREFIX}_ORGANIZATION` environment variables.
    ///
    /// Unset or malformed variables leave the corresponding field at its
    /// default.
    #[must_use]
    pub fn from_env(prefix: &str) -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var(format!("{prefix}_API_KEY")) {
            config.api_key = Some(key);
        }
        if let Ok(raw) = std::env::var(format!("{prefix}_BASE_URL")) {
            config.base_url = Url::parse(&raw).ok();
        }
        if let Ok(org) = std::env::var(format!("{prefix}_ORGANIZATION")) {
            config.organization = Some(org);
        }
        config
    }

    /// Check whether an API key is present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ClientConfig::with_api_key("sk-test")
            .organization("org-1")
            .timeout(Duration::from_secs(30));

        assert!(config.is_configured());
        assert_eq!(config.organization.as_deref(), Some("org-1"));
        assert_eq!(config.timeout_duration(), Duration::from_secs(30));
    }

    #[test]
    fn test_default_is_unconfigured() {
        let config = ClientConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.timeout_seconds, 120);
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = ClientConfig::with_api_key("sk-secret");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}
