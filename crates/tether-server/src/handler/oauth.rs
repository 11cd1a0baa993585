//! OAuth completion and scope discovery handlers.

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tether_core::BridgeConfig;
use tether_core::hooks::AuthCompleted;

use crate::extract::{HostUser, Json};
use crate::handler::response::OAuthScopes;
use crate::handler::{ErrorKind, Result};
use crate::service::{HookRegistry, ServiceState};

/// Tracing target for OAuth operations.
const TRACING_TARGET: &str = "tether_server::handler::oauth";

/// Receives the token set of a completed OAuth flow.
///
/// Only the user the event belongs to may deliver it. Events no hook
/// recognizes are acknowledged and dropped.
#[tracing::instrument(skip_all, fields(provider = %event.provider, user = %event.user))]
async fn auth_completed(
    State(hooks): State<HookRegistry>,
    HostUser(ctx): HostUser,
    Json(event): Json<AuthCompleted>,
) -> Result<StatusCode> {
    if ctx.user.as_ref() != Some(&event.user) {
        tracing::warn!(
            target: TRACING_TARGET,
            caller = ?ctx.user,
            "rejected oauth event for another user"
        );

        return Err(ErrorKind::Forbidden
            .with_message("OAuth events may only be delivered by the user they belong to")
            .with_resource("oauth_event"));
    }

    let handled = hooks.auth_completed(&event).await?.claimed().is_some();

    tracing::info!(target: TRACING_TARGET, handled, "oauth flow completed");
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the scopes the host's provider must request.
#[tracing::instrument(skip(config))]
async fn provider_scopes(
    State(config): State<BridgeConfig>,
    Path(provider): Path<String>,
) -> Result<Json<OAuthScopes>> {
    if provider != config.auth_provider {
        return Err(ErrorKind::NotFound
            .with_message("No scopes are registered for this provider")
            .with_resource("oauth_provider"));
    }

    Ok(Json(OAuthScopes {
        scopes: config.oauth_scopes(),
        provider,
    }))
}

/// Returns a [`Router`] with all OAuth routes.
pub fn routes() -> Router<ServiceState> {
    use axum::routing::*;

    Router::new()
        .route("/oauth/callback", post(auth_completed))
        .route("/oauth/{provider}/scopes", get(provider_scopes))
}
