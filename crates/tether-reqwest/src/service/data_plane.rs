//! HTTPS data-plane implementation.
//!
//! This module implements the [`DataPlaneProvider`] trait for [`ReqwestClient`].

use futures::{StreamExt, TryStreamExt};
use reqwest::header::CONTENT_TYPE;
use tether_core::download::{DataPlaneProvider, DataPlaneResponse};

use crate::connect::{ReqwestClient, TRACING_TARGET};
use crate::error::Error;

#[async_trait::async_trait]
impl DataPlaneProvider for ReqwestClient {
    async fn fetch(
        &self,
        token: &str,
        endpoint_id: &str,
        relative_path: &str,
    ) -> tether_core::Result<DataPlaneResponse> {
        let url = self.data_plane_url(endpoint_id, relative_path)?;

        tracing::debug!(
            target: TRACING_TARGET,
            endpoint_id,
            url = %url,
            "Requesting file from data plane"
        );

        let response = self
            .http()
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(Error::from)?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        Ok(DataPlaneResponse {
            status: response.status().as_u16(),
            content_length: response.content_length(),
            content_type,
            body: response.bytes_stream().map_err(std::io::Error::other).boxed(),
        })
    }
}
