//! Streaming relay of item bytes from the HTTPS data plane.

use futures::StreamExt;
use tokio_util::io::{ReaderStream, StreamReader};

use super::TRACING_TARGET;
use crate::download::{DOWNLOAD_CHUNK_SIZE, DataPlaneService, Disposition, Download};
use crate::id::{VirtualId, data_plane_relative};
use crate::{Error, Result};

/// Relays item content from the data plane to the caller.
#[derive(Debug, Clone)]
pub struct DownloadProxy {
    data_plane: DataPlaneService,
}

impl DownloadProxy {
    pub fn new(data_plane: DataPlaneService) -> Self {
        Self { data_plane }
    }

    /// Opens the data-plane stream for an item.
    ///
    /// Nothing is read from the body before the status is checked, so a
    /// failed upstream request never yields bytes.
    ///
    /// # Errors
    ///
    /// - [`MalformedIdentifier`] if `id` is not an item.
    /// - [`UnsupportedPath`] if the item path is not below `~/`.
    /// - [`UpstreamDownload`] if the data plane answers with a non-2xx status.
    ///
    /// [`MalformedIdentifier`]: crate::ErrorKind::MalformedIdentifier
    /// [`UnsupportedPath`]: crate::ErrorKind::UnsupportedPath
    /// [`UpstreamDownload`]: crate::ErrorKind::UpstreamDownload
    pub async fn stream_item(
        &self,
        id: &VirtualId,
        token: &str,
        disposition: Disposition,
    ) -> Result<Download> {
        if !id.is_item() {
            return Err(Error::malformed_identifier()
                .with_message("Only items can be downloaded")
                .with_context(format!("path: {}", id.path())));
        }

        let relative_path = data_plane_relative(id.path())?;
        let response = self
            .data_plane
            .fetch(token, id.endpoint_id(), relative_path)
            .await?;

        if !response.is_success() {
            tracing::warn!(
                target: TRACING_TARGET,
                endpoint_id = id.endpoint_id(),
                path = id.path(),
                status = response.status,
                "Data plane rejected download"
            );

            return Err(Error::upstream_download(response.status)
                .with_message("Remote store refused the download")
                .with_context(format!("path: {}", id.path())));
        }

        let reader = StreamReader::new(response.body);
        let body = ReaderStream::with_capacity(reader, DOWNLOAD_CHUNK_SIZE).boxed();

        Ok(Download {
            content_length: response.content_length,
            content_type: response.content_type,
            content_disposition: disposition.header_value(id.name()),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use bytes::Bytes;
    use futures::{TryStreamExt, stream};

    use super::*;
    use crate::ErrorKind;
    use crate::download::{DataPlaneProvider, DataPlaneResponse};
    use crate::mock::MockDataPlane;

    /// Sets the flag when the upstream body is dropped.
    struct DropGuard(Arc<AtomicBool>);

    impl Drop for DropGuard {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    /// Data plane answering with an endless body.
    struct EndlessDataPlane {
        dropped: Arc<AtomicBool>,
    }

    #[async_trait::async_trait]
    impl DataPlaneProvider for EndlessDataPlane {
        async fn fetch(&self, _: &str, _: &str, _: &str) -> Result<DataPlaneResponse> {
            let guard = DropGuard(self.dropped.clone());
            let body = stream::repeat_with(move || {
                let _held = &guard;
                Ok::<_, std::io::Error>(Bytes::from_static(&[1u8; 1024]))
            });

            Ok(DataPlaneResponse {
                status: 200,
                content_length: None,
                content_type: None,
                body: body.boxed(),
            })
        }
    }

    fn proxy(data_plane: MockDataPlane) -> DownloadProxy {
        DownloadProxy::new(DataPlaneService::new(data_plane))
    }

    #[tokio::test]
    async fn streams_in_bounded_chunks() {
        let content = vec![7u8; 3 * DOWNLOAD_CHUNK_SIZE + 10];
        let data_plane = MockDataPlane::new().with_file(
            "ep-1",
            "data/big.bin",
            content.clone(),
            Some("application/octet-stream"),
        );
        let id = VirtualId::item("ep-1", "~/data/big.bin", content.len() as u64);

        let download = proxy(data_plane.clone())
            .stream_item(&id, "dp-token", Disposition::Attachment)
            .await
            .unwrap();

        assert_eq!(download.content_length, Some(content.len() as u64));
        assert_eq!(download.content_type.as_deref(), Some("application/octet-stream"));
        assert_eq!(download.content_disposition, "attachment; filename=\"big.bin\"");

        let chunks: Vec<Bytes> = download.body.try_collect().await.unwrap();
        assert!(chunks.iter().all(|chunk| chunk.len() <= DOWNLOAD_CHUNK_SIZE));
        assert_eq!(chunks.concat(), content);
        assert_eq!(data_plane.tokens(), ["dp-token"]);
    }

    #[tokio::test]
    async fn inline_disposition() {
        let data_plane =
            MockDataPlane::new().with_file("ep-1", "a.txt", "hello", Some("text/plain"));
        let download = proxy(data_plane)
            .stream_item(&VirtualId::item("ep-1", "~/a.txt", 5), "t", Disposition::Inline)
            .await
            .unwrap();
        assert_eq!(download.content_disposition, "inline");
    }

    #[tokio::test]
    async fn upstream_failure_carries_status() {
        let id = VirtualId::item("ep-1", "~/missing.txt", 1);
        let error = proxy(MockDataPlane::new())
            .stream_item(&id, "t", Disposition::Attachment)
            .await
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::UpstreamDownload);
        assert_eq!(error.status, Some(404));
    }

    #[tokio::test]
    async fn rejects_folders_and_foreign_paths() {
        let data_plane = MockDataPlane::new();

        let error = proxy(data_plane.clone())
            .stream_item(&VirtualId::folder("ep-1", "~/data"), "t", Disposition::Attachment)
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::MalformedIdentifier);

        let error = proxy(data_plane.clone())
            .stream_item(&VirtualId::item("ep-1", "/etc/passwd", 1), "t", Disposition::Attachment)
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::UnsupportedPath);

        assert!(data_plane.tokens().is_empty());
    }

    #[tokio::test]
    async fn dropping_the_body_releases_upstream() {
        let dropped = Arc::new(AtomicBool::new(false));
        let proxy = DownloadProxy::new(DataPlaneService::new(EndlessDataPlane {
            dropped: dropped.clone(),
        }));

        let mut download = proxy
            .stream_item(
                &VirtualId::item("ep-1", "~/endless.bin", 0),
                "t",
                Disposition::Attachment,
            )
            .await
            .unwrap();

        let chunk = download.body.try_next().await.unwrap().unwrap();
        assert!(!chunk.is_empty());
        assert!(!dropped.load(Ordering::SeqCst));

        drop(download);
        assert!(dropped.load(Ordering::SeqCst));
    }
}
