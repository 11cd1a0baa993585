//! Item listing, detail, file and download handlers.

use axum::Router;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures::{StreamExt, stream};
use tether_core::download::Download;
use tether_core::view::{FileView, ItemDetail, ItemView};

use crate::extract::{HostUser, Json, Query};
use crate::handler::request::{DownloadQuery, ItemListQuery, ResourcePath};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{Dispatch, HookRegistry, NativeService, ServiceState};

/// Tracing target for item operations.
const TRACING_TARGET: &str = "tether_server::handler::items";

/// Lists the items of a folder.
#[tracing::instrument(skip_all, fields(folder_id = %query.folder_id))]
async fn list_items(
    State(hooks): State<HookRegistry>,
    State(native): State<NativeService>,
    HostUser(ctx): HostUser,
    Query(query): Query<ItemListQuery>,
) -> Result<Json<Vec<ItemView>>> {
    let items = match hooks.list_item_children(&ctx, &query.folder_id).await? {
        Dispatch::Claimed(items) => items,
        Dispatch::Unclaimed(extensions) => {
            let mut items = native.list_items(&query.folder_id).await?;
            items.extend(extensions.into_iter().flatten());
            items
        }
    };

    tracing::debug!(target: TRACING_TARGET, count = items.len(), "items listed");
    Ok(Json(items))
}

/// Returns a single item with its parent folder.
#[tracing::instrument(skip_all, fields(item_id = %path.id))]
async fn read_item(
    State(hooks): State<HookRegistry>,
    State(native): State<NativeService>,
    HostUser(ctx): HostUser,
    Path(path): Path<ResourcePath>,
) -> Result<Json<ItemDetail>> {
    if let Some(item) = hooks.item_detail(&ctx, &path.id).await?.claimed() {
        return Ok(Json(item));
    }

    let item = native
        .item(&path.id)
        .await?
        .ok_or_else(item_not_found)?;

    Ok(Json(item))
}

/// Lists the files of an item.
#[tracing::instrument(skip_all, fields(item_id = %path.id))]
async fn item_files(
    State(hooks): State<HookRegistry>,
    State(native): State<NativeService>,
    HostUser(ctx): HostUser,
    Path(path): Path<ResourcePath>,
) -> Result<Json<Vec<FileView>>> {
    if let Some(files) = hooks.item_files(&ctx, &path.id).await?.claimed() {
        return Ok(Json(files));
    }

    let files = native
        .item_files(&path.id)
        .await?
        .ok_or_else(item_not_found)?;

    Ok(Json(files))
}

/// Streams the content of an item.
///
/// Remote content is relayed chunk by chunk as the client reads it;
/// a refused upstream request answers with an error before any bytes.
#[tracing::instrument(skip_all, fields(item_id = %path.id))]
async fn download_item(
    State(hooks): State<HookRegistry>,
    State(native): State<NativeService>,
    HostUser(ctx): HostUser,
    Path(path): Path<ResourcePath>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response> {
    let disposition = query.disposition();

    if let Some(download) = hooks.download(&ctx, &path.id, disposition).await?.claimed() {
        tracing::debug!(
            target: TRACING_TARGET,
            content_length = download.content_length,
            "relaying remote download"
        );
        return Ok(stream_response(download));
    }

    let file = native
        .file(&path.id)
        .await?
        .ok_or_else(item_not_found)?;

    let download = Download {
        content_length: Some(file.content.len() as u64),
        content_type: file.content_type,
        content_disposition: disposition.header_value(&file.name),
        body: stream::iter([Ok::<_, std::io::Error>(file.content)]).boxed(),
    };

    Ok(stream_response(download))
}

fn item_not_found() -> Error<'static> {
    ErrorKind::NotFound
        .with_message("Item not found")
        .with_resource("item")
}

/// Builds the streamed response of a download.
///
/// A filename that cannot be carried in a header falls back to a bare
/// `attachment`.
fn stream_response(download: Download) -> Response {
    let mut headers = HeaderMap::new();

    if let Some(length) = download.content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }

    let content_type = download
        .content_type
        .as_deref()
        .and_then(|value| HeaderValue::from_str(value).ok())
        .unwrap_or(HeaderValue::from_static("application/octet-stream"));
    headers.insert(header::CONTENT_TYPE, content_type);

    let disposition = HeaderValue::from_bytes(download.content_disposition.as_bytes())
        .unwrap_or(HeaderValue::from_static("attachment"));
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    (StatusCode::OK, headers, Body::from_stream(download.body)).into_response()
}

/// Returns a [`Router`] with all item routes.
///
/// Every item has exactly one file sharing its identifier, so file
/// downloads resolve through the item download.
pub fn routes() -> Router<ServiceState> {
    use axum::routing::*;

    Router::new()
        .route("/item", get(list_items))
        .route("/item/{id}", get(read_item))
        .route("/item/{id}/files", get(item_files))
        .route("/item/{id}/download", get(download_item))
        .route("/file/{id}/download", get(download_item))
}
