//! Byte streaming from the HTTPS data plane.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Tracing target for data-plane operations.
pub const TRACING_TARGET: &str = "tether_core::download";

/// Upper bound on the size of a chunk relayed to the caller.
pub const DOWNLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Forward-only stream of body chunks.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Response of the data plane, before the body is consumed.
pub struct DataPlaneResponse {
    /// HTTP status code.
    pub status: u16,
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    /// Body stream. Dropping it closes the upstream connection.
    pub body: ByteStream,
}

impl DataPlaneResponse {
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl fmt::Debug for DataPlaneResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataPlaneResponse")
            .field("status", &self.status)
            .field("content_length", &self.content_length)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Core trait for data-plane fetches.
#[async_trait::async_trait]
pub trait DataPlaneProvider: Send + Sync {
    /// Issues a `GET` for a file relative to the endpoint's home directory.
    ///
    /// Non-success statuses are returned as responses, not errors, so the
    /// caller decides what to forward.
    async fn fetch(
        &self,
        token: &str,
        endpoint_id: &str,
        relative_path: &str,
    ) -> Result<DataPlaneResponse>;
}

/// Data-plane service wrapper with observability.
#[derive(Clone)]
pub struct DataPlaneService {
    inner: Arc<dyn DataPlaneProvider>,
}

impl fmt::Debug for DataPlaneService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataPlaneService").finish_non_exhaustive()
    }
}

impl DataPlaneService {
    /// Creates a new data-plane service wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: DataPlaneProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Issues a `GET` for a file relative to the endpoint's home directory.
    pub async fn fetch(
        &self,
        token: &str,
        endpoint_id: &str,
        relative_path: &str,
    ) -> Result<DataPlaneResponse> {
        let started_at = Instant::now();
        let result = self.inner.fetch(token, endpoint_id, relative_path).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(response) => tracing::debug!(
                target: TRACING_TARGET,
                endpoint_id,
                path = relative_path,
                status = response.status,
                content_length = ?response.content_length,
                elapsed_ms = elapsed.as_millis(),
                "Data plane responded"
            ),
            Err(error) => tracing::warn!(
                target: TRACING_TARGET,
                endpoint_id,
                path = relative_path,
                error = %error,
                elapsed_ms = elapsed.as_millis(),
                "Data plane request failed"
            ),
        }

        result
    }
}

/// How the caller wants the browser to present a download.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Inline,
    #[default]
    Attachment,
}

impl Disposition {
    /// Parses the `contentDisposition` query value.
    ///
    /// Only `inline` selects inline mode; anything else is an attachment.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("inline") => Self::Inline,
            _ => Self::Attachment,
        }
    }

    /// Renders the `Content-Disposition` header value for a file name.
    pub fn header_value(&self, filename: &str) -> String {
        match self {
            Self::Inline => "inline".to_owned(),
            Self::Attachment => {
                let mut value = String::with_capacity(filename.len() + 24);
                value.push_str("attachment; filename=\"");
                for c in filename.chars() {
                    if matches!(c, '"' | '\\') {
                        value.push('\\');
                    }
                    value.push(c);
                }
                value.push('"');
                value
            }
        }
    }
}

/// A download ready to be relayed to the caller.
pub struct Download {
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    pub content_disposition: String,
    /// Body chunks, none larger than [`DOWNLOAD_CHUNK_SIZE`].
    pub body: ByteStream,
}

impl fmt::Debug for Download {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Download")
            .field("content_length", &self.content_length)
            .field("content_type", &self.content_type)
            .field("content_disposition", &self.content_disposition)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_from_query() {
        assert_eq!(Disposition::from_query(Some("inline")), Disposition::Inline);
        assert_eq!(Disposition::from_query(Some("attachment")), Disposition::Attachment);
        assert_eq!(Disposition::from_query(Some("INLINE")), Disposition::Attachment);
        assert_eq!(Disposition::from_query(None), Disposition::Attachment);
    }

    #[test]
    fn disposition_header_values() {
        assert_eq!(Disposition::Inline.header_value("a.txt"), "inline");
        assert_eq!(
            Disposition::Attachment.header_value("a.txt"),
            "attachment; filename=\"a.txt\""
        );
        assert_eq!(
            Disposition::Attachment.header_value("say \"hi\"\\.txt"),
            "attachment; filename=\"say \\\"hi\\\"\\\\.txt\""
        );
    }
}
