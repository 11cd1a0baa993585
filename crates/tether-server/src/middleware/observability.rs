//! Observability middleware: request ids, trace spans and request timing.

use std::time::Instant;

use axum::Router;
use axum::extract::Request;
use axum::http::{HeaderMap, header};
use axum::middleware::{Next, from_fn};
use axum::response::Response;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

/// Tracing target for request metrics.
const TRACING_TARGET_METRICS: &str = "tether_server::metrics";

/// Header carrying the request id.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Coarse grouping of routes for metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteCategory {
    Folder,
    Item,
    File,
    OAuth,
    Other,
}

impl RouteCategory {
    /// Categorizes a request path by its first segment.
    pub fn from_path(path: &str) -> Self {
        match path.trim_start_matches('/').split('/').next() {
            Some("folder") => Self::Folder,
            Some("item") => Self::Item,
            Some("file") => Self::File,
            Some("oauth") => Self::OAuth,
            _ => Self::Other,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Item => "item",
            Self::File => "file",
            Self::OAuth => "oauth",
            Self::Other => "other",
        }
    }
}

/// Extension trait for `axum::`[`Router`] to apply observability middleware.
pub trait RouterObservabilityExt<S> {
    /// Layers request ids, trace spans and sensitive header redaction.
    fn with_observability(self) -> Self;

    /// Layers request timing at trace level.
    fn with_metrics(self) -> Self;
}

impl<S> RouterObservabilityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_observability(self) -> Self {
        self.layer(PropagateRequestIdLayer::new(
            header::HeaderName::from_static(REQUEST_ID_HEADER),
        ))
        .layer(SetSensitiveRequestHeadersLayer::new([
            header::AUTHORIZATION,
            header::COOKIE,
        ]))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            header::HeaderName::from_static(REQUEST_ID_HEADER),
            MakeRequestUuid,
        ))
    }

    fn with_metrics(self) -> Self {
        self.layer(from_fn(track_categorized_metrics))
    }
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
}

/// Request metrics middleware with categorization and timing.
///
/// For streamed downloads the duration covers the time to response
/// headers only.
pub async fn track_categorized_metrics(request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let category = RouteCategory::from_path(&path);

    tracing::trace!(
        target: TRACING_TARGET_METRICS,
        method = %method,
        path = %path,
        category = category.as_str(),
        "request started"
    );

    let response = next.run(request).await;

    tracing::trace!(
        target: TRACING_TARGET_METRICS,
        method = %method,
        path = %path,
        category = category.as_str(),
        status = %response.status(),
        duration_ms = start_time.elapsed().as_millis() as u64,
        response_size = content_length(response.headers()),
        "request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use axum_test::TestServer;

    use super::*;

    #[test]
    fn route_categories() {
        assert_eq!(RouteCategory::from_path("/folder/abc"), RouteCategory::Folder);
        assert_eq!(RouteCategory::from_path("/item"), RouteCategory::Item);
        assert_eq!(RouteCategory::from_path("/oauth/globus/scopes"), RouteCategory::OAuth);
        assert_eq!(RouteCategory::from_path("/"), RouteCategory::Other);
    }

    #[tokio::test]
    async fn request_id_is_propagated() -> anyhow::Result<()> {
        let router = Router::new()
            .route("/", get(|| async { "ok" }))
            .with_metrics()
            .with_observability();
        let server = TestServer::new(router)?;

        let response = server.get("/").await;
        response.assert_status_ok();
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));

        Ok(())
    }
}
