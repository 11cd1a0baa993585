//! Reqwest client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default timeout for HTTP requests: 30 seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default base URL of the transfer API.
pub const DEFAULT_TRANSFER_API_URL: &str = "https://transfer.api.globus.org/v0.10/";

/// Default data-plane URL template; `{endpoint}` is replaced by the endpoint id.
pub const DEFAULT_DATA_PLANE_URL_TEMPLATE: &str = "https://{endpoint}.e.globus.org";

/// Default maximum number of endpoints returned by a search.
pub const DEFAULT_ENDPOINT_SEARCH_LIMIT: u32 = 100;

/// Placeholder substituted in the data-plane URL template.
pub const ENDPOINT_PLACEHOLDER: &str = "{endpoint}";

/// Configuration for the reqwest HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ReqwestConfig {
    /// HTTP request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "http-timeout", env = "HTTP_TIMEOUT", default_value = "30")
    )]
    #[serde(default = "default_timeout_secs")]
    pub http_timeout: u64,

    /// User-Agent header to send with requests
    #[cfg_attr(
        feature = "config",
        arg(long = "http-user-agent", env = "HTTP_USER_AGENT")
    )]
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Base URL of the transfer API
    #[cfg_attr(
        feature = "config",
        arg(long = "transfer-api-url", env = "TRANSFER_API_URL", default_value = DEFAULT_TRANSFER_API_URL)
    )]
    #[serde(default = "default_transfer_api_url")]
    pub transfer_api_url: String,

    /// Data-plane URL template containing an `{endpoint}` placeholder
    #[cfg_attr(
        feature = "config",
        arg(
            long = "data-plane-url-template",
            env = "DATA_PLANE_URL_TEMPLATE",
            default_value = DEFAULT_DATA_PLANE_URL_TEMPLATE
        )
    )]
    #[serde(default = "default_data_plane_url_template")]
    pub data_plane_url_template: String,

    /// Maximum number of endpoints returned by a search
    #[cfg_attr(
        feature = "config",
        arg(long = "endpoint-search-limit", env = "ENDPOINT_SEARCH_LIMIT", default_value = "100")
    )]
    #[serde(default = "default_endpoint_search_limit")]
    pub endpoint_search_limit: u32,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_transfer_api_url() -> String {
    DEFAULT_TRANSFER_API_URL.to_owned()
}

fn default_data_plane_url_template() -> String {
    DEFAULT_DATA_PLANE_URL_TEMPLATE.to_owned()
}

fn default_endpoint_search_limit() -> u32 {
    DEFAULT_ENDPOINT_SEARCH_LIMIT
}

impl Default for ReqwestConfig {
    fn default() -> Self {
        Self {
            http_timeout: default_timeout_secs(),
            user_agent: None,
            transfer_api_url: default_transfer_api_url(),
            data_plane_url_template: default_data_plane_url_template(),
            endpoint_search_limit: default_endpoint_search_limit(),
        }
    }
}

impl ReqwestConfig {
    /// Returns the effective timeout, using default if zero.
    ///
    /// Applies to the whole exchange of listing calls and to connection
    /// setup of downloads; download bodies are not bounded.
    pub fn effective_timeout(&self) -> Duration {
        if self.http_timeout == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.http_timeout)
        }
    }

    /// Returns the effective user agent, using default if not set.
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(Self::default_user_agent)
    }

    /// Returns the default user agent string.
    fn default_user_agent() -> String {
        format!("tether/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Set the timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.http_timeout = timeout_secs;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the transfer API base URL.
    #[must_use]
    pub fn with_transfer_api_url(mut self, url: impl Into<String>) -> Self {
        self.transfer_api_url = url.into();
        self
    }

    /// Set the data-plane URL template.
    #[must_use]
    pub fn with_data_plane_url_template(mut self, template: impl Into<String>) -> Self {
        self.data_plane_url_template = template.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReqwestConfig::default();
        assert_eq!(config.http_timeout, 30);
        assert!(config.user_agent.is_none());
        assert_eq!(config.transfer_api_url, DEFAULT_TRANSFER_API_URL);
        assert!(config.data_plane_url_template.contains(ENDPOINT_PLACEHOLDER));
        assert_eq!(config.endpoint_search_limit, 100);
    }

    #[test]
    fn test_effective_timeout_uses_default_when_zero() {
        let config = ReqwestConfig::default().with_timeout(0);
        assert_eq!(config.effective_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_effective_user_agent() {
        let config = ReqwestConfig::default();
        assert!(config.effective_user_agent().starts_with("tether/"));

        let config = config.with_user_agent("custom/1.0");
        assert_eq!(config.effective_user_agent(), "custom/1.0");
    }
}
