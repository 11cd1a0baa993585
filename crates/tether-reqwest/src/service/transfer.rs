//! Transfer API implementation.
//!
//! This module implements the [`TransferProvider`] trait for [`ReqwestClient`].

use reqwest::Response;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tether_core::transfer::{EndpointScope, EndpointSummary, RemoteEntry, TransferProvider};

use crate::connect::{ReqwestClient, TRACING_TARGET};
use crate::error::Error;

/// Envelope of transfer API list responses.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "DATA")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct EndpointRecord {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    canonical_name: Option<String>,
}

impl From<EndpointRecord> for EndpointSummary {
    fn from(record: EndpointRecord) -> Self {
        let display_name = record
            .display_name
            .filter(|name| !name.is_empty())
            .or(record.canonical_name.filter(|name| !name.is_empty()))
            .unwrap_or_else(|| record.id.clone());

        EndpointSummary::new(record.id, display_name)
    }
}

/// Error body of the transfer API.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ReqwestClient {
    /// Checks the status and decodes the `DATA` array of a response.
    async fn read_envelope<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> crate::Result<Vec<T>> {
        let status = response.status();

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let error: ErrorBody = serde_json::from_slice(&body).unwrap_or_default();
            let message = match (error.code, error.message) {
                (Some(code), Some(message)) => format!("{code}: {message}"),
                (Some(text), None) | (None, Some(text)) => text,
                (None, None) => status.to_string(),
            };

            return Err(Error::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let envelope: Envelope<T> = serde_json::from_slice(&body)?;
        Ok(envelope.data)
    }
}

#[async_trait::async_trait]
impl TransferProvider for ReqwestClient {
    async fn list_children(
        &self,
        token: &str,
        endpoint_id: &str,
        path: &str,
    ) -> tether_core::Result<Vec<RemoteEntry>> {
        let url = self.transfer_url(&["operation", "endpoint", endpoint_id, "ls"])?;

        tracing::debug!(
            target: TRACING_TARGET,
            endpoint_id,
            path,
            "Listing remote directory"
        );

        let response = self
            .http()
            .get(url)
            .query(&[("path", path)])
            .bearer_auth(token)
            .timeout(self.config().effective_timeout())
            .send()
            .await
            .map_err(Error::from)?;

        Ok(self.read_envelope(response).await?)
    }

    async fn list_endpoints(
        &self,
        token: &str,
        scope: EndpointScope,
    ) -> tether_core::Result<Vec<EndpointSummary>> {
        let url = self.transfer_url(&["endpoint_search"])?;
        let limit = self.config().endpoint_search_limit.to_string();

        tracing::debug!(
            target: TRACING_TARGET,
            scope = %scope,
            limit = %limit,
            "Searching endpoints"
        );

        let response = self
            .http()
            .get(url)
            .query(&[("filter_scope", scope.as_ref()), ("limit", limit.as_str())])
            .bearer_auth(token)
            .timeout(self.config().effective_timeout())
            .send()
            .await
            .map_err(Error::from)?;

        let records: Vec<EndpointRecord> = self.read_envelope(response).await?;
        Ok(records.into_iter().map(EndpointSummary::from).collect())
    }
}
