//! Directory listing and endpoint discovery against the transfer API.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "config")]
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::Result;

/// Tracing target for transfer API operations.
pub const TRACING_TARGET: &str = "tether_core::transfer";

/// Kind of a directory entry as reported by the transfer API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dir,
    File,
    /// Symbolic links and anything else the bridge does not expose.
    #[serde(other)]
    Other,
}

/// One entry of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub size: u64,
}

impl RemoteEntry {
    /// Creates a directory entry.
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Dir,
            size: 0,
        }
    }

    /// Creates a file entry.
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            size,
        }
    }
}

/// An endpoint visible to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSummary {
    pub id: String,
    pub display_name: String,
}

impl EndpointSummary {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Filter applied when searching for endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EndpointScope {
    /// Endpoints other users have shared with the caller.
    #[default]
    SharedWithMe,
    /// Endpoints owned by the caller.
    MyEndpoints,
    /// Endpoints the caller used recently.
    RecentlyUsed,
    /// Every endpoint the caller can see.
    All,
}

/// Core trait for transfer API operations.
///
/// Implement this trait to plug in a transfer API client.
#[async_trait::async_trait]
pub trait TransferProvider: Send + Sync {
    /// Lists the entries of a directory on an endpoint.
    async fn list_children(
        &self,
        token: &str,
        endpoint_id: &str,
        path: &str,
    ) -> Result<Vec<RemoteEntry>>;

    /// Lists the endpoints matching a scope.
    async fn list_endpoints(
        &self,
        token: &str,
        scope: EndpointScope,
    ) -> Result<Vec<EndpointSummary>>;
}

/// Transfer service wrapper with observability.
///
/// The inner provider is wrapped in `Arc` for cheap cloning.
#[derive(Clone)]
pub struct TransferService {
    inner: Arc<dyn TransferProvider>,
}

impl fmt::Debug for TransferService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferService").finish_non_exhaustive()
    }
}

impl TransferService {
    /// Creates a new transfer service wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: TransferProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Lists the entries of a directory on an endpoint.
    pub async fn list_children(
        &self,
        token: &str,
        endpoint_id: &str,
        path: &str,
    ) -> Result<Vec<RemoteEntry>> {
        let started_at = Instant::now();
        let result = self.inner.list_children(token, endpoint_id, path).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(entries) => tracing::debug!(
                target: TRACING_TARGET,
                endpoint_id,
                path,
                entries = entries.len(),
                elapsed_ms = elapsed.as_millis(),
                "Listed remote directory"
            ),
            Err(error) => tracing::warn!(
                target: TRACING_TARGET,
                endpoint_id,
                path,
                status = ?error.status,
                error = %error,
                elapsed_ms = elapsed.as_millis(),
                "Remote directory listing failed"
            ),
        }

        result
    }

    /// Lists the endpoints matching a scope.
    pub async fn list_endpoints(
        &self,
        token: &str,
        scope: EndpointScope,
    ) -> Result<Vec<EndpointSummary>> {
        let started_at = Instant::now();
        let result = self.inner.list_endpoints(token, scope).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(endpoints) => tracing::debug!(
                target: TRACING_TARGET,
                scope = %scope,
                endpoints = endpoints.len(),
                elapsed_ms = elapsed.as_millis(),
                "Searched endpoints"
            ),
            Err(error) => tracing::warn!(
                target: TRACING_TARGET,
                scope = %scope,
                status = ?error.status,
                error = %error,
                elapsed_ms = elapsed.as_millis(),
                "Endpoint search failed"
            ),
        }

        result
    }
}
