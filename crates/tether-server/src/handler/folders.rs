//! Folder listing, detail and aggregate handlers.

use axum::Router;
use axum::extract::{Path, State};
use tether_core::view::{FolderDetails, FolderView};

use crate::extract::{HostUser, Json, Query};
use crate::handler::request::{FolderListQuery, ResourcePath};
use crate::handler::{ErrorKind, Result};
use crate::service::{Dispatch, HookRegistry, NativeService, ServiceState};

/// Tracing target for folder operations.
const TRACING_TARGET: &str = "tether_server::handler::folders";

/// Lists the folders below a folder, user or collection.
///
/// Hooks claiming the parent answer alone; otherwise the native folders
/// come first, followed by anything the hooks contribute.
#[tracing::instrument(
    skip_all,
    fields(parent_id = %query.parent_id, parent_type = %query.parent_type)
)]
async fn list_folders(
    State(hooks): State<HookRegistry>,
    State(native): State<NativeService>,
    HostUser(ctx): HostUser,
    Query(query): Query<FolderListQuery>,
) -> Result<Json<Vec<FolderView>>> {
    let dispatch = hooks
        .list_folder_children(&ctx, &query.parent_id, query.parent_type)
        .await?;

    let folders = match dispatch {
        Dispatch::Claimed(folders) => folders,
        Dispatch::Unclaimed(extensions) => {
            let mut folders = native
                .list_folders(&query.parent_id, query.parent_type)
                .await?;
            folders.extend(extensions.into_iter().flatten());
            folders
        }
    };

    tracing::debug!(target: TRACING_TARGET, count = folders.len(), "folders listed");
    Ok(Json(folders))
}

/// Returns a single folder.
#[tracing::instrument(skip_all, fields(folder_id = %path.id))]
async fn read_folder(
    State(hooks): State<HookRegistry>,
    State(native): State<NativeService>,
    HostUser(ctx): HostUser,
    Path(path): Path<ResourcePath>,
) -> Result<Json<FolderView>> {
    if let Some(folder) = hooks.folder_detail(&ctx, &path.id).await?.claimed() {
        return Ok(Json(folder));
    }

    let folder = native.folder(&path.id).await?.ok_or_else(|| {
        ErrorKind::NotFound
            .with_message("Folder not found")
            .with_resource("folder")
    })?;

    Ok(Json(folder))
}

/// Returns the child counts of a folder.
///
/// Remote folders report unknown counts.
#[tracing::instrument(skip_all, fields(folder_id = %path.id))]
async fn folder_details(
    State(hooks): State<HookRegistry>,
    State(native): State<NativeService>,
    HostUser(ctx): HostUser,
    Path(path): Path<ResourcePath>,
) -> Result<Json<FolderDetails>> {
    if let Some(details) = hooks.folder_aggregate(&ctx, &path.id).await?.claimed() {
        return Ok(Json(details));
    }

    let details = native.folder_details(&path.id).await?.ok_or_else(|| {
        ErrorKind::NotFound
            .with_message("Folder not found")
            .with_resource("folder")
    })?;

    Ok(Json(details))
}

/// Returns a [`Router`] with all folder routes.
pub fn routes() -> Router<ServiceState> {
    use axum::routing::*;

    Router::new()
        .route("/folder", get(list_folders))
        .route("/folder/{id}", get(read_folder))
        .route("/folder/{id}/details", get(folder_details))
}
