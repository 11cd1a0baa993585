//! Reqwest-based HTTP client for the remote store.

use std::sync::Arc;

use reqwest::Client;
use tether_core::{DataPlaneService, TransferService};
use url::Url;

use super::ReqwestConfig;
use super::config::ENDPOINT_PLACEHOLDER;
use crate::error::{Error, Result};

/// Tracing target for reqwest client operations.
pub const TRACING_TARGET: &str = "tether_reqwest::client";

/// Inner client that holds the HTTP client and configuration.
struct ReqwestClientInner {
    http: Client,
    config: ReqwestConfig,
    transfer_base: Url,
}

/// Reqwest-based HTTP client for the transfer API and the data plane.
///
/// This client implements both [`TransferProvider`] and
/// [`DataPlaneProvider`]. Clones share one connection pool.
///
/// [`TransferProvider`]: tether_core::TransferProvider
/// [`DataPlaneProvider`]: tether_core::DataPlaneProvider
#[derive(Clone)]
pub struct ReqwestClient {
    inner: Arc<ReqwestClientInner>,
}

impl std::fmt::Debug for ReqwestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestClient {
    /// Creates a new reqwest client with the given configuration.
    ///
    /// # Errors
    ///
    /// Fails if the transfer API URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(config: ReqwestConfig) -> Result<Self> {
        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET,
            timeout_ms = timeout.as_millis(),
            transfer_api_url = %config.transfer_api_url,
            "Creating reqwest client"
        );

        let mut transfer_base = Url::parse(&config.transfer_api_url)?;
        if !transfer_base.path().ends_with('/') {
            let path = format!("{}/", transfer_base.path());
            transfer_base.set_path(&path);
        }

        // Download bodies may outlive any fixed deadline, so only connection
        // setup is bounded here. Listing calls set a per-request timeout.
        let http = Client::builder()
            .connect_timeout(timeout)
            .user_agent(&user_agent)
            .build()?;

        let inner = ReqwestClientInner {
            http,
            config,
            transfer_base,
        };

        tracing::info!(
            target: TRACING_TARGET,
            "Reqwest client created successfully"
        );

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the underlying HTTP client.
    pub(crate) fn http(&self) -> &Client {
        &self.inner.http
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &ReqwestConfig {
        &self.inner.config
    }

    /// Builds a transfer API URL from percent-encoded path segments.
    pub(crate) fn transfer_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.inner.transfer_base.clone();
        url.path_segments_mut()
            .map_err(|()| Error::CannotBeBase(self.inner.config.transfer_api_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Builds the data-plane URL of a file relative to the endpoint's home
    /// directory.
    ///
    /// Every path segment is percent-encoded separately.
    pub(crate) fn data_plane_url(&self, endpoint_id: &str, relative_path: &str) -> Result<Url> {
        if !is_host_label(endpoint_id) {
            return Err(Error::EndpointId(endpoint_id.to_owned()));
        }

        let template = &self.inner.config.data_plane_url_template;
        let mut url = Url::parse(&template.replace(ENDPOINT_PLACEHOLDER, endpoint_id))?;
        url.path_segments_mut()
            .map_err(|()| Error::CannotBeBase(template.clone()))?
            .pop_if_empty()
            .extend(relative_path.split('/'));
        Ok(url)
    }

    /// Converts this client into a [`TransferService`].
    pub fn into_transfer_service(self) -> TransferService {
        TransferService::new(self)
    }

    /// Converts this client into a [`DataPlaneService`].
    pub fn into_data_plane_service(self) -> DataPlaneService {
        DataPlaneService::new(self)
    }
}

/// Returns `true` if `value` is a valid DNS label.
fn is_host_label(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 63
        && !value.starts_with('-')
        && !value.ends_with('-')
        && value.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}
