//! In-memory providers for tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use futures::stream;

use crate::download::{DataPlaneProvider, DataPlaneResponse};
use crate::transfer::{EndpointScope, EndpointSummary, RemoteEntry, TransferProvider};
use crate::{Error, Result};

/// Transfer API backed by fixed listings.
///
/// Directories without a listing answer like a missing path on the
/// remote store.
#[derive(Debug, Clone, Default)]
pub struct MockTransfer {
    listings: HashMap<(String, String), Vec<RemoteEntry>>,
    endpoints: Vec<EndpointSummary>,
    calls: Arc<AtomicUsize>,
}

impl MockTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the listing of a directory.
    pub fn with_listing(
        mut self,
        endpoint_id: impl Into<String>,
        path: impl Into<String>,
        entries: Vec<RemoteEntry>,
    ) -> Self {
        self.listings
            .insert((endpoint_id.into(), path.into()), entries);
        self
    }

    /// Sets the endpoints returned by every search.
    pub fn with_endpoints(mut self, endpoints: Vec<EndpointSummary>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Number of remote calls served so far, shared between clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TransferProvider for MockTransfer {
    async fn list_children(
        &self,
        _token: &str,
        endpoint_id: &str,
        path: &str,
    ) -> Result<Vec<RemoteEntry>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.listings
            .get(&(endpoint_id.to_owned(), path.to_owned()))
            .cloned()
            .ok_or_else(|| {
                Error::remote_unavailable()
                    .with_status(404)
                    .with_message("Directory not found")
            })
    }

    async fn list_endpoints(
        &self,
        _token: &str,
        _scope: EndpointScope,
    ) -> Result<Vec<EndpointSummary>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.endpoints.clone())
    }
}

#[derive(Debug, Clone)]
struct MockFile {
    content: Bytes,
    content_type: Option<String>,
}

/// Data plane backed by in-memory files.
///
/// Unknown files answer `404` with a short body.
#[derive(Debug, Clone, Default)]
pub struct MockDataPlane {
    files: HashMap<(String, String), MockFile>,
    tokens: Arc<std::sync::Mutex<Vec<String>>>,
}

impl MockDataPlane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file relative to the endpoint's home directory.
    pub fn with_file(
        mut self,
        endpoint_id: impl Into<String>,
        relative_path: impl Into<String>,
        content: impl Into<Bytes>,
        content_type: Option<&str>,
    ) -> Self {
        let file = MockFile {
            content: content.into(),
            content_type: content_type.map(str::to_owned),
        };
        self.files
            .insert((endpoint_id.into(), relative_path.into()), file);
        self
    }

    /// Bearer tokens presented so far, shared between clones.
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl DataPlaneProvider for MockDataPlane {
    async fn fetch(
        &self,
        token: &str,
        endpoint_id: &str,
        relative_path: &str,
    ) -> Result<DataPlaneResponse> {
        if let Ok(mut tokens) = self.tokens.lock() {
            tokens.push(token.to_owned());
        }

        let key = (endpoint_id.to_owned(), relative_path.to_owned());
        let response = match self.files.get(&key) {
            Some(file) => DataPlaneResponse {
                status: 200,
                content_length: Some(file.content.len() as u64),
                content_type: file.content_type.clone(),
                body: Box::pin(stream::iter([Ok::<_, std::io::Error>(file.content.clone())])),
            },
            None => DataPlaneResponse {
                status: 404,
                content_length: Some(9),
                content_type: Some("text/plain".to_owned()),
                body: Box::pin(stream::iter([Ok::<_, std::io::Error>(Bytes::from_static(b"not found"))])),
            },
        };

        Ok(response)
    }
}
